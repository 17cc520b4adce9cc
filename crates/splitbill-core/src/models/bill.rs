//! Bill data models shared with the web front end.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::bill::rules::patterns::BILLING_PERIOD;

/// A single phone line on the bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Phone number as printed, e.g. "214.957.3190".
    pub line_number: String,

    /// Name of the line holder, when the row carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_name: Option<String>,

    /// Total charge for this line. Negative for credits.
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

impl LineItem {
    pub fn new(line_number: impl Into<String>, total: Decimal) -> Self {
        Self {
            line_number: line_number.into(),
            line_name: None,
            total,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.line_name = Some(name.into());
        self
    }
}

/// The parsed bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedBill {
    /// Line items in table order.
    pub lines: Vec<LineItem>,

    /// Final bill total (document "Total Amount Due", or the line sum).
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,

    /// Billing period label, e.g. "Dec 15, 2025 - Jan 14, 2026".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_period: Option<String>,
}

impl ParsedBill {
    /// Sum of all line totals.
    pub fn line_sum(&self) -> Decimal {
        self.lines.iter().map(|l| l.total).sum()
    }

    /// Look up a line by its phone number.
    pub fn line(&self, line_number: &str) -> Option<&LineItem> {
        self.lines.iter().find(|l| l.line_number == line_number)
    }

    /// Parse both ends of the billing period label.
    pub fn billing_dates(&self) -> Option<(NaiveDate, NaiveDate)> {
        let label = self.billing_period.as_deref()?;
        let caps = BILLING_PERIOD.captures(label)?;
        Some((parse_period_date(&caps[1])?, parse_period_date(&caps[2])?))
    }

    /// Validate the bill data and return any issues found.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.lines.is_empty() {
            issues.push("No line items".to_string());
        }

        if self.total_amount <= Decimal::ZERO {
            issues.push("Total amount is not positive".to_string());
        }

        for line in self.lines.iter().filter(|l| l.total.is_sign_negative()) {
            issues.push(format!(
                "Line {} has a credit total ({})",
                line.line_number, line.total
            ));
        }

        let line_sum = self.line_sum();
        if !self.lines.is_empty() && (line_sum - self.total_amount).abs() > Decimal::new(1, 2) {
            issues.push(format!(
                "Line item total ({}) differs from bill total ({})",
                line_sum, self.total_amount
            ));
        }

        if let Some(label) = &self.billing_period {
            match self.billing_dates() {
                Some((start, end)) if end < start => {
                    issues.push(format!("Billing period ends before it starts: {}", label));
                }
                Some(_) => {}
                None => issues.push(format!("Unrecognized billing period dates: {}", label)),
            }
        }

        issues
    }
}

/// Parse "Dec 15, 2025" or "Dec 15 2025".
fn parse_period_date(s: &str) -> Option<NaiveDate> {
    let cleaned = s.replace(',', " ");
    let normalized = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    NaiveDate::parse_from_str(&normalized, "%b %d %Y").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_bill() -> ParsedBill {
        ParsedBill {
            lines: vec![
                LineItem::new("555-101-2001", Decimal::new(6543, 2)).with_name("Alex Johnson"),
                LineItem::new("555-101-2002", Decimal::new(5821, 2)),
            ],
            total_amount: Decimal::new(12364, 2),
            billing_period: Some("Dec 15, 2025 - Jan 14, 2026".to_string()),
        }
    }

    #[test]
    fn test_serialize_camel_case() {
        let json = serde_json::to_value(sample_bill()).unwrap();

        assert_eq!(json["totalAmount"], serde_json::json!(123.64));
        assert_eq!(json["lines"][0]["lineNumber"], "555-101-2001");
        assert_eq!(json["lines"][0]["lineName"], "Alex Johnson");
        assert_eq!(json["lines"][0]["total"], serde_json::json!(65.43));
        assert!(json["lines"][1].get("lineName").is_none());
        assert_eq!(json["billingPeriod"], "Dec 15, 2025 - Jan 14, 2026");
    }

    #[test]
    fn test_billing_dates() {
        let (start, end) = sample_bill().billing_dates().unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2025, 12, 15).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2026, 1, 14).unwrap());
    }

    #[test]
    fn test_billing_dates_without_commas() {
        let mut bill = sample_bill();
        bill.billing_period = Some("Mar 3 2025 - Apr 2 2025".to_string());
        let (start, end) = bill.billing_dates().unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2025, 3, 3).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2025, 4, 2).unwrap());
    }

    #[test]
    fn test_validate_consistent_bill() {
        assert!(sample_bill().validate().is_empty());
    }

    #[test]
    fn test_validate_reports_mismatch_and_credit() {
        let mut bill = sample_bill();
        bill.lines.push(LineItem::new("555-101-2003", Decimal::new(-1500, 2)));
        bill.total_amount = Decimal::new(20000, 2);

        let issues = bill.validate();
        assert_eq!(issues.len(), 2);
        assert!(issues[0].contains("555-101-2003"));
        assert!(issues[1].contains("differs from bill total"));
    }
}
