//! Section scanning between textual landmarks.

use tracing::debug;

use super::layout::Row;
use crate::models::config::LayoutConfig;

/// Selects the rows of the line-item table.
///
/// A row containing the start marker opens the section and is itself
/// skipped. A row containing any stop marker closes the section and is
/// excluded. The section may open and close more than once (multi-page
/// tables repeat their header).
#[derive(Debug, Clone)]
pub struct SectionScanner {
    start_marker: String,
    stop_markers: Vec<String>,
}

/// Rows selected by a scan.
#[derive(Debug, Clone, Default)]
pub struct Section<'a> {
    /// Rows inside the section, in document order.
    pub rows: Vec<&'a Row>,
    /// Whether the start marker was seen at all.
    pub start_seen: bool,
}

impl SectionScanner {
    pub fn new(start_marker: impl Into<String>, stop_markers: Vec<String>) -> Self {
        Self {
            start_marker: start_marker.into(),
            stop_markers,
        }
    }

    pub fn from_config(config: &LayoutConfig) -> Self {
        Self::new(config.start_marker.clone(), config.stop_markers.clone())
    }

    fn is_start(&self, row: &Row) -> bool {
        !self.start_marker.is_empty() && row.contains(&self.start_marker)
    }

    fn is_stop(&self, row: &Row) -> bool {
        self.stop_markers
            .iter()
            .any(|m| !m.is_empty() && row.contains(m))
    }

    /// Walk rows and keep those inside the section.
    pub fn scan<'a>(&self, rows: &'a [Row]) -> Section<'a> {
        let mut section = Section::default();
        let mut inside = false;

        for row in rows {
            if self.is_start(row) {
                debug!("Found section start on page {}", row.page + 1);
                section.start_seen = true;
                inside = true;
                continue;
            }

            if self.is_stop(row) {
                if inside {
                    debug!("Section stops at: {}", truncate(&row.flat_text, 50));
                }
                inside = false;
            }

            if inside {
                section.rows.push(row);
            }
        }

        section
    }
}

impl Default for SectionScanner {
    fn default() -> Self {
        Self::from_config(&LayoutConfig::default())
    }
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
