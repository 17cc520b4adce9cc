//! Amount parsing for US-formatted currency.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::document_total_patterns;
use super::{ExtractionMatch, FieldExtractor};

/// Currency marker that starts a charge-like fragment.
pub const CURRENCY_MARKER: char = '$';

/// Check whether a fragment reads as a currency amount ("$65.43").
pub fn is_currency_token(s: &str) -> bool {
    s.starts_with(CURRENCY_MARKER)
}

/// Parse a US-formatted amount (e.g., "$1,234.56" or "1234.56").
///
/// Strips the currency marker and thousands separators. The sign, if any,
/// is kept.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .trim()
        .chars()
        .filter(|c| *c != CURRENCY_MARKER && *c != ',')
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    Decimal::from_str(&cleaned).ok()
}

/// Format amount in US style ($1,234.56).
pub fn format_amount(amount: Decimal) -> String {
    let s = format!("{:.2}", amount.abs());
    let (integer_part, decimal_part) = s.split_once('.').unwrap_or((s.as_str(), "00"));

    let chars: Vec<char> = integer_part.chars().collect();
    let mut formatted = String::new();

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            formatted.push(',');
        }
        formatted.push(*c);
    }

    let sign = if amount.is_sign_negative() && !amount.is_zero() { "-" } else { "" };
    format!("{}${}.{}", sign, formatted, decimal_part)
}

/// Document-level total extractor ("Total due", "Total Amount Due", "AutoPay").
///
/// Each pattern contributes at most its first match, in priority order.
#[derive(Debug, Clone, Copy)]
pub struct DocumentTotalExtractor;

impl DocumentTotalExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DocumentTotalExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DocumentTotalExtractor {
    type Output = ExtractionMatch<Decimal>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();

        for (label, pattern) in document_total_patterns() {
            let Some(caps) = pattern.captures(text) else {
                continue;
            };
            let (Some(full_match), Some(amount)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if let Some(value) = parse_amount(amount.as_str()) {
                results.push(
                    ExtractionMatch::new(value, label)
                        .with_position(full_match.start(), full_match.end()),
                );
            }
        }

        results
    }
}
