//! Batch command - parse many bills concurrently.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use futures_util::stream::{self, StreamExt};
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{debug, error, warn};

use splitbill_core::models::config::SplitbillConfig;
use splitbill_core::ParseOutcome;

use super::{format_bill, load_config, read_bill, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern matching input PDFs
    #[arg(required = true)]
    input: String,

    /// Output directory (default: next to each input)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of files parsed concurrently
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single file.
struct FileResult {
    path: PathBuf,
    outcome: Option<ParseOutcome>,
    error: Option<String>,
    processing_time_ms: u64,
}

/// One row of `summary.csv`.
#[derive(Serialize)]
struct SummaryRow<'a> {
    filename: &'a str,
    status: &'a str,
    line_count: Option<usize>,
    total_amount: Option<String>,
    billing_period: Option<&'a str>,
    processing_time_ms: u64,
    error: Option<&'a str>,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    // Expand glob pattern
    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching PDF files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    // Blocking parses run on the blocking pool; `buffered` keeps input order
    let mut pending = stream::iter(files.into_iter().map(|path| {
        let config = config.clone();
        async move { process_file(path, config).await }
    }))
    .buffered(args.jobs.max(1));

    let mut results = Vec::new();
    while let Some(result) = pending.next().await {
        overall_pb.inc(1);

        if let Some(error_msg) = &result.error {
            if args.continue_on_error {
                warn!("Failed to process {}: {}", result.path.display(), error_msg);
            } else {
                error!("Failed to process {}: {}", result.path.display(), error_msg);
                overall_pb.abandon();
                anyhow::bail!("Processing failed: {}", error_msg);
            }
        }

        results.push(result);
    }

    overall_pb.finish_and_clear();

    for result in &results {
        if let Some(outcome) = &result.outcome {
            let output_path = output_path_for(&result.path, args.output_dir.as_deref(), args.format);
            fs::write(&output_path, format_bill(&outcome.bill, args.format)?)?;
            debug!("Wrote output to {}", output_path.display());
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let failed: Vec<&FileResult> = results.iter().filter(|r| r.error.is_some()).collect();
    let successful = results.len() - failed.len();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(successful).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

async fn process_file(path: PathBuf, config: SplitbillConfig) -> FileResult {
    let file_start = Instant::now();
    let task_path = path.clone();

    let result = tokio::task::spawn_blocking(move || read_bill(&task_path, &config)).await;
    let processing_time_ms = file_start.elapsed().as_millis() as u64;

    let (outcome, error) = match result {
        Ok(Ok(outcome)) => (Some(outcome), None),
        Ok(Err(e)) => (None, Some(format!("{:#}", e))),
        Err(e) => (None, Some(format!("worker failed: {}", e))),
    };

    FileResult {
        path,
        outcome,
        error,
        processing_time_ms,
    }
}

fn output_path_for(input: &Path, output_dir: Option<&Path>, format: OutputFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("bill");
    let name = format!("{}.{}", stem, format.extension());

    match output_dir {
        Some(dir) => dir.join(name),
        None => input.with_file_name(name),
    }
}

fn write_summary(path: &Path, results: &[FileResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");
        let bill = result.outcome.as_ref().map(|o| &o.bill);

        wtr.serialize(SummaryRow {
            filename,
            status: if bill.is_some() { "success" } else { "error" },
            line_count: bill.map(|b| b.lines.len()),
            total_amount: bill.map(|b| format!("{:.2}", b.total_amount)),
            billing_period: bill.and_then(|b| b.billing_period.as_deref()),
            processing_time_ms: result.processing_time_ms,
            error: result.error.as_deref(),
        })?;
    }

    wtr.flush()?;
    Ok(())
}
