//! Subcommands and the helpers they share.

pub mod batch;
pub mod config;
pub mod parse;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::debug;

use splitbill_core::models::bill::ParsedBill;
use splitbill_core::models::config::SplitbillConfig;
use splitbill_core::pdf::{check_upload, parse_pdf};
use splitbill_core::bill::rules::format_amount;
use splitbill_core::ParseOutcome;

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

/// Default configuration file location.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("splitbill")
        .join("config.json")
}

/// Load configuration from `--config`, else the default file, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<SplitbillConfig> {
    if let Some(path) = config_path {
        return SplitbillConfig::from_file(Path::new(path))
            .with_context(|| format!("Failed to load config from {}", path));
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Using config at {}", default_path.display());
        return Ok(SplitbillConfig::from_file(&default_path)?);
    }

    Ok(SplitbillConfig::default())
}

/// Read a bill PDF from disk and parse it.
pub fn read_bill(path: &Path, config: &SplitbillConfig) -> anyhow::Result<ParseOutcome> {
    let size = fs::metadata(path)
        .with_context(|| format!("Input file not found: {}", path.display()))?
        .len();
    check_upload(path, size, &config.pdf)?;

    let data = fs::read(path)?;
    let outcome = parse_pdf(&data, config)
        .with_context(|| format!("Could not read this bill: {}", path.display()))?;

    Ok(outcome)
}

pub fn format_bill(bill: &ParsedBill, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(bill)?),
        OutputFormat::Csv => format_csv(bill),
        OutputFormat::Text => Ok(format_text(bill)),
    }
}

fn format_csv(bill: &ParsedBill) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["line_number", "line_name", "total"])?;

    for line in &bill.lines {
        let total = format!("{:.2}", line.total);
        wtr.write_record([
            line.line_number.as_str(),
            line.line_name.as_deref().unwrap_or(""),
            total.as_str(),
        ])?;
    }

    let total = format!("{:.2}", bill.total_amount);
    wtr.write_record(["TOTAL", "", total.as_str()])?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(bill: &ParsedBill) -> String {
    let mut output = String::new();

    if let Some(period) = &bill.billing_period {
        output.push_str(&format!("Billing period: {}\n\n", period));
    }

    output.push_str(&format!("{:<14} {:<24} {:>12}\n", "Line", "Name", "Total"));
    for line in &bill.lines {
        output.push_str(&format!(
            "{:<14} {:<24} {:>12}\n",
            line.line_number,
            line.line_name.as_deref().unwrap_or("-"),
            format_amount(line.total)
        ));
    }

    output.push('\n');
    output.push_str(&format!(
        "{:<39} {:>12}\n",
        "Total amount due",
        format_amount(bill.total_amount)
    ));

    output
}
