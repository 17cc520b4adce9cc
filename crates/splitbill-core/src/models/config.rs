//! Configuration structures for the extraction pipeline.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Main configuration for the splitbill pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitbillConfig {
    /// Row clustering and section landmarks.
    pub layout: LayoutConfig,

    /// Line and document total extraction.
    pub extraction: ExtractionConfig,

    /// PDF input handling.
    pub pdf: PdfConfig,
}

/// Layout reconstruction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Vertical distance (PDF units) within which fragments share a row.
    pub row_tolerance: f64,

    /// Row text marking the start of the line-item table.
    pub start_marker: String,

    /// Row texts marking the end of the line-item table.
    pub stop_markers: Vec<String>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            row_tolerance: 2.0,
            start_marker: "Monthly charges".to_string(),
            stop_markers: vec![
                "Subtotal for Group".to_string(),
                "Total for Wireless".to_string(),
                "Detailed usage".to_string(),
            ],
        }
    }
}

/// Amount extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Smallest absolute value accepted as a line total.
    #[serde(with = "rust_decimal::serde::float")]
    pub min_line_total: Decimal,

    /// Largest absolute value accepted as a line total.
    #[serde(with = "rust_decimal::serde::float")]
    pub max_line_total: Decimal,

    /// Document totals must lie strictly below this value.
    #[serde(with = "rust_decimal::serde::float")]
    pub max_document_total: Decimal,

    /// Capture the line holder name from row text.
    pub extract_line_names: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_line_total: Decimal::ONE,
            max_line_total: Decimal::new(500, 0),
            max_document_total: Decimal::new(10_000, 0),
            extract_line_names: true,
        }
    }
}

/// PDF input configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Maximum accepted file size in bytes.
    pub max_file_size: u64,

    /// Maximum pages to read (0 = unlimited).
    pub max_pages: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            max_file_size: 10 * 1024 * 1024,
            max_pages: 0,
        }
    }
}

impl SplitbillConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: SplitbillConfig =
            serde_json::from_str(r#"{"layout": {"start_marker": "Line charges"}}"#).unwrap();

        assert_eq!(config.layout.start_marker, "Line charges");
        assert_eq!(config.layout.row_tolerance, 2.0);
        assert_eq!(config.layout.stop_markers.len(), 3);
        assert_eq!(config.extraction.max_line_total, Decimal::new(500, 0));
        assert_eq!(config.pdf.max_file_size, 10 * 1024 * 1024);
    }

    #[test]
    fn test_amounts_serialize_as_numbers() {
        let json = serde_json::to_value(SplitbillConfig::default()).unwrap();
        assert_eq!(json["extraction"]["max_line_total"], serde_json::json!(500.0));
        assert_eq!(json["extraction"]["min_line_total"], serde_json::json!(1.0));
    }
}
