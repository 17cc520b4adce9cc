//! Phone bill line-item extraction.
//!
//! The pipeline runs fragments through row clustering, section scanning and
//! per-row extraction, merges in whole-text fallback matches, then reconciles
//! the bill total.

mod fallback;
mod fragments;
mod layout;
mod merge;
mod parser;
mod reconcile;
mod rows;
mod section;
pub mod rules;

pub use fallback::FallbackExtractor;
pub use fragments::{Fragment, FragmentStream, RawFragment};
pub use layout::{cluster_rows, flatten_rows, Row, DEFAULT_ROW_TOLERANCE};
pub use merge::LineItemSet;
pub use parser::{parse_bill, BillParser, ParseOutcome, ParseStats};
pub use reconcile::{Reconciler, Reconciliation, TotalSource};
pub use rows::{collect_candidates, CandidateToken, LargestReasonable, RowExtractor, TotalSelector};
pub use section::{Section, SectionScanner};
