//! Common regex patterns for phone bill extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Phone number: three digit groups separated by dots or dashes
    pub static ref PHONE_NUMBER: Regex = Regex::new(
        r"\d{3}[.\-]\d{3}[.\-]\d{4}"
    ).unwrap();

    // "Total for 214.957.3190 $65.43" sentence form of a line total
    pub static ref TOTAL_FOR_LINE: Regex = Regex::new(
        r"(?i)Total for\s+(\d{3}[.\-]\d{3}[.\-]\d{4})\s+\$(\d{1,3}(?:,\d{3})*\.\d{2})"
    ).unwrap();

    // Document totals, in priority order
    pub static ref TOTAL_DUE: Regex = Regex::new(
        r"(?i)Total due\s*\$?([\d,]+\.\d{2})"
    ).unwrap();

    pub static ref TOTAL_AMOUNT_DUE: Regex = Regex::new(
        r"(?i)Total Amount Due\s*\$?([\d,]+\.\d{2})"
    ).unwrap();

    pub static ref AUTOPAY_AMOUNT: Regex = Regex::new(
        r"(?i)AutoPay.*?\$?([\d,]+\.\d{2})"
    ).unwrap();

    // "Dec 15, 2025 - Jan 14, 2026"
    pub static ref BILLING_PERIOD: Regex = Regex::new(
        r"(?i)(\w{3}\s+\d{1,2},?\s+\d{4})\s*-\s*(\w{3}\s+\d{1,2},?\s+\d{4})"
    ).unwrap();
}

/// Document total patterns with their labels, highest priority first.
pub fn document_total_patterns() -> [(&'static str, &'static Regex); 3] {
    [
        ("Total due", &*TOTAL_DUE),
        ("Total Amount Due", &*TOTAL_AMOUNT_DUE),
        ("AutoPay", &*AUTOPAY_AMOUNT),
    ]
}
