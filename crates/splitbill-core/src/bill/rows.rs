//! Per-row line item extraction.
//!
//! A row yields a line item when it carries a phone number and at least one
//! currency token whose absolute value falls in the reasonable band. Which
//! token is the line total is decided by a [`TotalSelector`]; the default
//! [`LargestReasonable`] bets that the total column is the sum of plan,
//! equipment, add-ons, fees and taxes, hence the largest charge in the row.
//! On layouts where some other figure is numerically largest this picks the
//! wrong column; that is a known limitation of the heuristic.

use rust_decimal::Decimal;
use tracing::debug;

use super::layout::Row;
use super::rules::amounts::{is_currency_token, parse_amount};
use super::rules::patterns::PHONE_NUMBER;
use crate::models::bill::LineItem;
use crate::models::config::ExtractionConfig;

/// Glyphs rendered as a standalone minus before a credit amount.
const MINUS_GLYPHS: [&str; 2] = ["-", "\u{2212}"];

/// A currency-shaped fragment in a row.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateToken {
    /// Fragment text as printed.
    pub raw_text: String,
    /// Horizontal position of the fragment.
    pub x: f64,
    /// Absolute amount.
    pub value: Decimal,
    /// Index of the fragment within the row.
    pub index: usize,
}

/// Collect currency tokens from a row, left to right.
pub fn collect_candidates(row: &Row) -> Vec<CandidateToken> {
    row.fragments
        .iter()
        .enumerate()
        .filter(|(_, f)| is_currency_token(f.text.trim()))
        .filter_map(|(index, f)| {
            let value = parse_amount(&f.text)?.abs();
            Some(CandidateToken {
                raw_text: f.text.clone(),
                x: f.x,
                value,
                index,
            })
        })
        .collect()
}

/// Decides which currency token of a row is the line total.
pub trait TotalSelector {
    fn select<'a>(&self, candidates: &'a [CandidateToken]) -> Option<&'a CandidateToken>;
}

/// Picks the largest candidate inside `[min, max]`; ties go to the left-most.
#[derive(Debug, Clone, Copy)]
pub struct LargestReasonable {
    min: Decimal,
    max: Decimal,
}

impl LargestReasonable {
    pub fn new(min: Decimal, max: Decimal) -> Self {
        Self { min, max }
    }

    pub fn is_reasonable(&self, value: Decimal) -> bool {
        let value = value.abs();
        value >= self.min && value <= self.max
    }
}

impl Default for LargestReasonable {
    fn default() -> Self {
        let config = ExtractionConfig::default();
        Self::new(config.min_line_total, config.max_line_total)
    }
}

impl TotalSelector for LargestReasonable {
    fn select<'a>(&self, candidates: &'a [CandidateToken]) -> Option<&'a CandidateToken> {
        candidates
            .iter()
            .filter(|c| self.is_reasonable(c.value))
            .fold(None, |best: Option<&CandidateToken>, c| match best {
                Some(b) if b.value.abs() >= c.value.abs() => Some(b),
                _ => Some(c),
            })
    }
}

/// Extracts at most one line item per row.
#[derive(Debug, Clone)]
pub struct RowExtractor<S = LargestReasonable> {
    selector: S,
    extract_names: bool,
}

impl RowExtractor<LargestReasonable> {
    pub fn new() -> Self {
        Self::with_selector(LargestReasonable::default())
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::with_selector(LargestReasonable::new(
            config.min_line_total,
            config.max_line_total,
        ))
        .with_names(config.extract_line_names)
    }
}

impl Default for RowExtractor<LargestReasonable> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: TotalSelector> RowExtractor<S> {
    /// Use a different total-selection rule.
    pub fn with_selector(selector: S) -> Self {
        Self {
            selector,
            extract_names: true,
        }
    }

    /// Enable or disable line holder names.
    pub fn with_names(mut self, extract: bool) -> Self {
        self.extract_names = extract;
        self
    }

    /// Try to read one line item from a row.
    pub fn extract(&self, row: &Row) -> Option<LineItem> {
        let phone = PHONE_NUMBER.find(&row.flat_text)?;
        let line_number = phone.as_str();

        let candidates = collect_candidates(row);
        if candidates.is_empty() {
            debug!("Skipping {}: no prices in row", line_number);
            return None;
        }

        let Some(chosen) = self.selector.select(&candidates) else {
            debug!(
                "Skipping {}: no reasonable prices among {}",
                line_number,
                candidates.len()
            );
            return None;
        };

        let mut total = chosen.value;
        if preceded_by_minus(row, chosen.index) {
            debug!("Detected negative sign before {}", chosen.raw_text);
            total = -total;
        }

        debug!(
            "Row {} -> {} (largest of {} prices)",
            line_number,
            total,
            candidates.len()
        );

        let mut item = LineItem::new(line_number, total);
        if self.extract_names {
            item.line_name = holder_name(&row.flat_text, phone.end());
        }
        Some(item)
    }

    /// Extract items from rows in order. Duplicates are left to the merge.
    pub fn extract_rows<'a, I>(&self, rows: I) -> Vec<LineItem>
    where
        I: IntoIterator<Item = &'a Row>,
    {
        rows.into_iter().filter_map(|row| self.extract(row)).collect()
    }
}

fn preceded_by_minus(row: &Row, index: usize) -> bool {
    index
        .checked_sub(1)
        .and_then(|i| row.fragments.get(i))
        .is_some_and(|f| MINUS_GLYPHS.contains(&f.text.trim()))
}

/// Text between the phone number and the first currency token.
fn holder_name(flat_text: &str, phone_end: usize) -> Option<String> {
    let rest = &flat_text[phone_end..];
    let cut = rest.find('$').unwrap_or(rest.len());
    let name = rest[..cut]
        .trim()
        .trim_end_matches(|c| c == '-' || c == '\u{2212}')
        .trim();

    name.chars()
        .any(char::is_alphabetic)
        .then(|| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bill::fragments::Fragment;
    use crate::bill::layout::cluster_rows;
    use pretty_assertions::assert_eq;

    /// One row from fragments laid out left to right.
    fn row(texts: &[&str]) -> Row {
        let fragments: Vec<Fragment> = texts
            .iter()
            .enumerate()
            .map(|(i, t)| Fragment::new(*t, 40.0 + 60.0 * i as f64, 600.0, 0))
            .collect();
        cluster_rows(&fragments, 2.0).remove(0)
    }

    #[test]
    fn test_largest_reasonable_total() {
        let r = row(&["214.957.3190", "$12.00", "$45.67", "$300.00", "$9,999.00"]);
        let item = RowExtractor::new().extract(&r).unwrap();
        assert_eq!(item.line_number, "214.957.3190");
        assert_eq!(item.total, Decimal::new(30000, 2));
    }

    #[test]
    fn test_holder_name_and_total() {
        let r = row(&["214.957.3190", "John", "Smith", "$40.00", "$12.50", "$65.43"]);
        let item = RowExtractor::new().extract(&r).unwrap();
        assert_eq!(
            item,
            LineItem::new("214.957.3190", Decimal::new(6543, 2)).with_name("John Smith")
        );
    }

    #[test]
    fn test_names_disabled() {
        let r = row(&["214.957.3190", "John Smith", "$65.43"]);
        let item = RowExtractor::new().with_names(false).extract(&r).unwrap();
        assert_eq!(item.line_name, None);
    }

    #[test]
    fn test_sign_correction() {
        let r = row(&["302.310.7589", "Jane Doe", "$5.00", "-", "$15.00"]);
        let item = RowExtractor::new().extract(&r).unwrap();
        assert_eq!(item.total, Decimal::new(-1500, 2));
        assert_eq!(item.line_name.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn test_minus_before_other_token_ignored() {
        let r = row(&["302.310.7589", "-", "$5.00", "$15.00"]);
        let item = RowExtractor::new().extract(&r).unwrap();
        assert_eq!(item.total, Decimal::new(1500, 2));
    }

    #[test]
    fn test_no_phone_no_item() {
        let r = row(&["Plan", "$40.00", "$65.43"]);
        assert!(RowExtractor::new().extract(&r).is_none());
    }

    #[test]
    fn test_no_reasonable_price_no_item() {
        let r = row(&["214.957.3190", "$0.50", "$750.00"]);
        assert!(RowExtractor::new().extract(&r).is_none());
    }

    #[test]
    fn test_malformed_amount_discarded() {
        let r = row(&["214.957.3190", "$", "$4O.00", "$22.10"]);
        let candidates = collect_candidates(&r);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].index, 3);

        let item = RowExtractor::new().extract(&r).unwrap();
        assert_eq!(item.total, Decimal::new(2210, 2));
    }

    #[test]
    fn test_tie_goes_to_leftmost() {
        let candidates = vec![
            CandidateToken {
                raw_text: "$20.00".into(),
                x: 100.0,
                value: Decimal::new(2000, 2),
                index: 1,
            },
            CandidateToken {
                raw_text: "$20.00".into(),
                x: 200.0,
                value: Decimal::new(2000, 2),
                index: 3,
            },
        ];
        let chosen = LargestReasonable::default().select(&candidates).unwrap();
        assert_eq!(chosen.index, 1);
    }

    struct RightmostSelector;

    impl TotalSelector for RightmostSelector {
        fn select<'a>(&self, candidates: &'a [CandidateToken]) -> Option<&'a CandidateToken> {
            candidates.last()
        }
    }

    #[test]
    fn test_custom_selector() {
        let r = row(&["214.957.3190", "$65.43", "$12.50"]);
        let item = RowExtractor::with_selector(RightmostSelector)
            .extract(&r)
            .unwrap();
        assert_eq!(item.total, Decimal::new(1250, 2));
    }

    #[test]
    fn test_extract_rows_keeps_duplicates_in_order() {
        let rows = vec![
            row(&["214.957.3190", "$65.43"]),
            row(&["no phone", "$1.00"]),
            row(&["214.957.3190", "$70.00"]),
        ];
        let items = RowExtractor::new().extract_rows(&rows);
        let totals: Vec<Decimal> = items.iter().map(|i| i.total).collect();
        assert_eq!(totals, vec![Decimal::new(6543, 2), Decimal::new(7000, 2)]);
    }
}
