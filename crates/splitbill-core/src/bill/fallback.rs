//! Whole-text fallback for "Total for <phone> $<amount>" sentences.

use tracing::debug;

use super::rules::amounts::parse_amount;
use super::rules::patterns::TOTAL_FOR_LINE;
use super::rules::FieldExtractor;
use crate::models::bill::LineItem;

/// Finds line totals written as sentences anywhere in the document text.
///
/// Amounts are always positive here; the sign of a credit is only visible in
/// the table layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackExtractor;

impl FallbackExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl FieldExtractor for FallbackExtractor {
    type Output = LineItem;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        TOTAL_FOR_LINE
            .captures_iter(text)
            .filter_map(|caps| {
                let phone = caps.get(1)?.as_str();
                let total = parse_amount(caps.get(2)?.as_str())?;
                debug!("Fallback match: {} -> {}", phone, total);
                Some(LineItem::new(phone, total))
            })
            .collect()
    }
}
