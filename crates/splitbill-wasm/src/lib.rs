//! WASM bindings for phone bill line-item extraction.
//!
//! The browser reads the PDF text layer (pdf.js `getTextContent`) and hands
//! the per-page items to this crate, which returns the parsed bill.

use rust_decimal::Decimal;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use splitbill_core::bill::rules::{extract_billing_period, format_amount as format_decimal};
use splitbill_core::models::bill::ParsedBill;
use splitbill_core::{BillParser, ParseOutcome, ParseStats, RawFragment};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn read_pages(pages: JsValue) -> Result<Vec<Vec<RawFragment>>, JsValue> {
    serde_wasm_bindgen::from_value(pages).map_err(to_js_error)
}

/// Parse a bill from pdf.js text items.
///
/// `pages` is an array with one array of `{str, transform, width, height}`
/// items per page, in page order.
#[wasm_bindgen]
pub fn parse_bill(pages: JsValue) -> Result<JsValue, JsValue> {
    let outcome = BillParser::new()
        .parse_pages(read_pages(pages)?)
        .map_err(to_js_error)?;

    serde_wasm_bindgen::to_value(&outcome.bill).map_err(to_js_error)
}

/// Find the billing period label in flattened bill text.
#[wasm_bindgen]
pub fn billing_period(text: &str) -> Option<String> {
    extract_billing_period(text)
}

/// Format an amount for display, e.g. `-$15.00`.
#[wasm_bindgen]
pub fn format_amount(amount: f64) -> String {
    Decimal::try_from(amount)
        .map(|d| format_decimal(d.round_dp(2)))
        .unwrap_or_default()
}

/// Configurable bill parser for browser use.
#[wasm_bindgen]
pub struct BillParserJs {
    parser: BillParser,
}

#[wasm_bindgen]
impl BillParserJs {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            parser: BillParser::new(),
        }
    }

    #[wasm_bindgen]
    pub fn set_start_marker(&mut self, marker: &str) {
        self.parser = std::mem::take(&mut self.parser).with_start_marker(marker);
    }

    #[wasm_bindgen]
    pub fn set_stop_markers(&mut self, markers: Vec<String>) {
        self.parser = std::mem::take(&mut self.parser).with_stop_markers(markers);
    }

    #[wasm_bindgen]
    pub fn set_row_tolerance(&mut self, tolerance: f64) {
        self.parser = std::mem::take(&mut self.parser).with_row_tolerance(tolerance);
    }

    #[wasm_bindgen]
    pub fn set_line_names(&mut self, extract: bool) {
        self.parser = std::mem::take(&mut self.parser).with_line_names(extract);
    }

    /// Parse pdf.js pages into a bill.
    #[wasm_bindgen]
    pub fn parse(&self, pages: JsValue) -> Result<JsValue, JsValue> {
        let outcome = self.run(pages)?;
        serde_wasm_bindgen::to_value(&outcome.bill).map_err(to_js_error)
    }

    /// Parse pdf.js pages and include the flattened text, warnings and counters.
    #[wasm_bindgen]
    pub fn parse_with_metadata(&self, pages: JsValue) -> Result<JsValue, JsValue> {
        let outcome = self.run(pages)?;

        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct ParseResult {
            bill: ParsedBill,
            raw_text: String,
            warnings: Vec<String>,
            stats: ParseStats,
            processing_time_ms: u64,
        }

        let output = ParseResult {
            bill: outcome.bill,
            raw_text: outcome.raw_text,
            warnings: outcome.warnings,
            stats: outcome.stats,
            processing_time_ms: outcome.processing_time_ms,
        };

        serde_wasm_bindgen::to_value(&output).map_err(to_js_error)
    }
}

impl BillParserJs {
    fn run(&self, pages: JsValue) -> Result<ParseOutcome, JsValue> {
        self.parser
            .parse_pages(read_pages(pages)?)
            .map_err(to_js_error)
    }
}

impl Default for BillParserJs {
    fn default() -> Self {
        Self::new()
    }
}
