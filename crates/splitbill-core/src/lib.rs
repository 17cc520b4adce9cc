//! Core library for phone bill line-item extraction.
//!
//! This crate provides:
//! - Layout reconstruction from positioned PDF text fragments (rows, sections)
//! - Per-line charge extraction with a swappable total-selection heuristic
//! - Whole-text fallback patterns and document-total reconciliation
//! - A `lopdf`-backed reader for the PDF text layer (feature `pdf`)

pub mod error;
pub mod models;
#[cfg(feature = "pdf")]
pub mod pdf;
pub mod bill;

pub use error::{ParseError, PdfError, Result, SplitbillError};
pub use models::bill::{LineItem, ParsedBill};
pub use models::config::SplitbillConfig;
#[cfg(feature = "pdf")]
pub use pdf::{check_upload, parse_pdf, PdfExtractor, PdfProcessor};
pub use bill::{
    parse_bill, BillParser, Fragment, FragmentStream, ParseOutcome, ParseStats, RawFragment, Row,
    TotalSource,
};
