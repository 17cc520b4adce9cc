//! Billing period extraction.

use super::patterns::BILLING_PERIOD;
use super::{ExtractionMatch, FieldExtractor};

/// Billing period extractor ("Dec 15, 2025 - Jan 14, 2026").
pub struct BillingPeriodExtractor;

impl BillingPeriodExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for BillingPeriodExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for BillingPeriodExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        BILLING_PERIOD.find(text).map(|m| {
            ExtractionMatch::new(m.as_str().to_string(), m.as_str()).with_position(m.start(), m.end())
        })
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        BILLING_PERIOD
            .find_iter(text)
            .map(|m| {
                ExtractionMatch::new(m.as_str().to_string(), m.as_str())
                    .with_position(m.start(), m.end())
            })
            .collect()
    }
}

/// Extract the first billing period label from text.
pub fn extract_billing_period(text: &str) -> Option<String> {
    BillingPeriodExtractor::new().extract(text).map(|m| m.value)
}
