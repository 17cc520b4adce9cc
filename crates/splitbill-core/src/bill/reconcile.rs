//! Bill-level total and billing period.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::rules::amounts::DocumentTotalExtractor;
use super::rules::period::extract_billing_period;
use super::rules::FieldExtractor;
use crate::models::bill::LineItem;
use crate::models::config::ExtractionConfig;

/// Where the bill total came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum TotalSource {
    /// A labelled amount printed in the document.
    Document { label: String },
    /// Sum of the extracted line totals.
    LineSum,
}

impl std::fmt::Display for TotalSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Document { label } => write!(f, "document ({})", label),
            Self::LineSum => write!(f, "line sum"),
        }
    }
}

/// Result of reconciling the document text with extracted lines.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub total_amount: Decimal,
    pub source: TotalSource,
    pub billing_period: Option<String>,
}

/// Picks the bill total and billing period.
///
/// Document totals are tried in priority order ("Total due", "Total Amount
/// Due", "AutoPay"). The first one strictly between zero and the upper bound
/// is used; otherwise the total is the sum of the line totals.
#[derive(Debug, Clone)]
pub struct Reconciler {
    max_document_total: Decimal,
    totals: DocumentTotalExtractor,
}

impl Reconciler {
    pub fn new(max_document_total: Decimal) -> Self {
        Self {
            max_document_total,
            totals: DocumentTotalExtractor::new(),
        }
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new(config.max_document_total)
    }

    fn is_plausible(&self, amount: Decimal) -> bool {
        amount > Decimal::ZERO && amount < self.max_document_total
    }

    pub fn reconcile(&self, text: &str, lines: &[LineItem]) -> Reconciliation {
        let document_total = self.totals.extract_all(text).into_iter().find(|m| {
            let plausible = self.is_plausible(m.value);
            if !plausible {
                warn!("Ignoring implausible {} amount {}", m.source, m.value);
            }
            plausible
        });

        let (total_amount, source) = match document_total {
            Some(m) => {
                debug!("Using {} amount {}", m.source, m.value);
                (m.value, TotalSource::Document { label: m.source })
            }
            None => {
                let sum: Decimal = lines.iter().map(|l| l.total).sum();
                debug!("No document total, using line sum {}", sum);
                (sum, TotalSource::LineSum)
            }
        };

        Reconciliation {
            total_amount,
            source,
            billing_period: extract_billing_period(text),
        }
    }
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lines() -> Vec<LineItem> {
        vec![
            LineItem::new("214.957.3190", Decimal::new(6543, 2)),
            LineItem::new("302.310.7589", Decimal::new(5821, 2)),
            LineItem::new("555-101-2001", Decimal::new(7189, 2)),
        ]
    }

    #[test]
    fn test_priority_total_wins() {
        let text = "AutoPay amount $99,999.00\nTotal due $120.00\n";
        let result = Reconciler::default().reconcile(text, &lines());
        assert_eq!(result.total_amount, Decimal::new(12000, 2));
        assert_eq!(
            result.source,
            TotalSource::Document {
                label: "Total due".to_string()
            }
        );
    }

    #[test]
    fn test_implausible_total_skipped() {
        let text = "Total due $0.00\nTotal Amount Due $187.23\n";
        let result = Reconciler::default().reconcile(text, &lines());
        assert_eq!(result.total_amount, Decimal::new(18723, 2));
    }

    #[test]
    fn test_line_sum_fallback() {
        let text = "AutoPay scheduled $99,999.00\n";
        let result = Reconciler::default().reconcile(text, &lines());
        assert_eq!(result.total_amount, Decimal::new(19553, 2));
        assert_eq!(result.source, TotalSource::LineSum);
        assert_eq!(result.source.to_string(), "line sum");
    }

    #[test]
    fn test_billing_period() {
        let text = "Bill period Dec 15, 2025 - Jan 14, 2026\nTotal due $120.00\n";
        let result = Reconciler::default().reconcile(text, &[]);
        assert_eq!(
            result.billing_period.as_deref(),
            Some("Dec 15, 2025 - Jan 14, 2026")
        );
    }

    #[test]
    fn test_no_lines_no_total() {
        let result = Reconciler::default().reconcile("nothing here", &[]);
        assert_eq!(result.total_amount, Decimal::ZERO);
        assert_eq!(result.billing_period, None);
    }
}
