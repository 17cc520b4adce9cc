//! Bill parser combining row-based and whole-text extraction.

use std::time::Instant;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info};

use super::fallback::FallbackExtractor;
use super::fragments::{Fragment, FragmentStream, RawFragment};
use super::layout::{cluster_rows, flatten_rows};
use super::merge::LineItemSet;
use super::reconcile::{Reconciler, TotalSource};
use super::rows::RowExtractor;
use super::rules::FieldExtractor;
use super::section::SectionScanner;
use crate::error::ParseError;
use crate::models::bill::ParsedBill;
use crate::models::config::{ExtractionConfig, LayoutConfig, SplitbillConfig};

/// Counters describing one parse.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseStats {
    /// Positioned fragments fed to the clusterer.
    pub fragments: usize,
    /// Rows reconstructed across all pages.
    pub rows: usize,
    /// Rows inside the line-item section.
    pub section_rows: usize,
    /// Line items contributed by the row pass.
    pub row_items: usize,
    /// Line items contributed only by the fallback pattern.
    pub fallback_items: usize,
    /// Channel that produced the bill total.
    pub total_source: TotalSource,
}

/// Result of parsing a bill.
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    /// Extracted bill.
    pub bill: ParsedBill,
    /// Flattened document text, one row per line.
    pub raw_text: String,
    /// Non-fatal extraction warnings.
    pub warnings: Vec<String>,
    /// Extraction counters.
    pub stats: ParseStats,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Parses phone bills from positioned text fragments.
///
/// Each call is independent; the parser holds configuration only.
#[derive(Debug, Clone, Default)]
pub struct BillParser {
    layout: LayoutConfig,
    extraction: ExtractionConfig,
}

impl BillParser {
    /// Create a parser with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &SplitbillConfig) -> Self {
        Self {
            layout: config.layout.clone(),
            extraction: config.extraction.clone(),
        }
    }

    /// Set the vertical row clustering tolerance.
    pub fn with_row_tolerance(mut self, tolerance: f64) -> Self {
        self.layout.row_tolerance = tolerance;
        self
    }

    /// Set the text that opens the line-item section.
    pub fn with_start_marker(mut self, marker: impl Into<String>) -> Self {
        self.layout.start_marker = marker.into();
        self
    }

    /// Set the texts that close the line-item section.
    pub fn with_stop_markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.layout.stop_markers = markers.into_iter().map(Into::into).collect();
        self
    }

    /// Set the band of absolute values accepted as line totals.
    pub fn with_line_total_band(mut self, min: Decimal, max: Decimal) -> Self {
        self.extraction.min_line_total = min;
        self.extraction.max_line_total = max;
        self
    }

    /// Set the exclusive upper bound for document totals.
    pub fn with_max_document_total(mut self, max: Decimal) -> Self {
        self.extraction.max_document_total = max;
        self
    }

    /// Enable or disable line holder names.
    pub fn with_line_names(mut self, extract: bool) -> Self {
        self.extraction.extract_line_names = extract;
        self
    }

    /// Parse per-page raw text items, in page order.
    pub fn parse_pages(&self, pages: Vec<Vec<RawFragment>>) -> Result<ParseOutcome, ParseError> {
        let stream = FragmentStream::from_pages(pages);
        if stream.dropped() > 0 {
            debug!("Dropped {} degenerate fragments", stream.dropped());
        }
        self.parse(stream.fragments())
    }

    /// Parse a document's fragments.
    pub fn parse(&self, fragments: &[Fragment]) -> Result<ParseOutcome, ParseError> {
        let start = Instant::now();
        let mut warnings = Vec::new();

        let positioned = fragments.iter().filter(|f| f.is_positioned()).count();
        if positioned == 0 {
            return Err(ParseError::EmptyInput);
        }

        let rows = cluster_rows(fragments, self.layout.row_tolerance);
        let raw_text = flatten_rows(&rows);

        let section = SectionScanner::from_config(&self.layout).scan(&rows);
        if !section.start_seen {
            warnings.push(format!(
                "Section start \"{}\" not found",
                self.layout.start_marker
            ));
        }

        let row_items = RowExtractor::from_config(&self.extraction)
            .extract_rows(section.rows.iter().copied());
        let fallback_items = FallbackExtractor::new().extract_all(&raw_text);

        let mut items = LineItemSet::new();
        let from_rows = items.extend(row_items);
        let from_fallback = items.extend(fallback_items);

        if items.is_empty() {
            return Err(ParseError::NoLineItems);
        }

        let lines = items.into_items();
        let reconciliation = Reconciler::from_config(&self.extraction).reconcile(&raw_text, &lines);

        if reconciliation.total_amount <= Decimal::ZERO {
            return Err(ParseError::NoPlausibleTotal);
        }
        if reconciliation.source == TotalSource::LineSum {
            warnings.push("No document total found, using sum of line totals".to_string());
        }

        let bill = ParsedBill {
            lines,
            total_amount: reconciliation.total_amount,
            billing_period: reconciliation.billing_period,
        };
        warnings.extend(bill.validate());

        let stats = ParseStats {
            fragments: positioned,
            rows: rows.len(),
            section_rows: section.rows.len(),
            row_items: from_rows,
            fallback_items: from_fallback,
            total_source: reconciliation.source,
        };

        info!(
            "Parsed {} lines ({} from rows, {} from fallback) from {} rows, total {} via {}",
            bill.lines.len(),
            stats.row_items,
            stats.fallback_items,
            stats.rows,
            bill.total_amount,
            stats.total_source
        );

        Ok(ParseOutcome {
            bill,
            raw_text,
            warnings,
            stats,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }
}

/// Parse a bill with the default configuration.
pub fn parse_bill(fragments: &[Fragment]) -> Result<ParsedBill, ParseError> {
    BillParser::new().parse(fragments).map(|outcome| outcome.bill)
}
