//! Parse command - extract line charges from a single bill.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use super::{format_bill, load_config, read_bill, OutputFormat};

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Input bill (PDF)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Validate extracted data
    #[arg(long)]
    validate: bool,

    /// Show extraction statistics
    #[arg(long)]
    show_stats: bool,
}

pub async fn run(args: ParseArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!("Reading {}...", args.input.display()));

    let result = read_bill(&args.input, &config);
    pb.finish_and_clear();
    let outcome = result?;

    for warning in &outcome.warnings {
        info!("{}", warning);
    }

    // Validate if requested
    if args.validate {
        let issues = outcome.bill.validate();
        if issues.is_empty() {
            eprintln!("{} No validation issues", style("✓").green());
        } else {
            eprintln!("{}", style("Validation issues:").yellow());
            for issue in &issues {
                eprintln!("  - {}", issue);
            }
        }
    }

    let output = format_bill(&outcome.bill, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output.trim_end());
    }

    if args.show_stats {
        let stats = &outcome.stats;
        eprintln!();
        eprintln!(
            "{} {} fragments, {} rows, {} in section",
            style("ℹ").blue(),
            stats.fragments,
            stats.rows,
            stats.section_rows
        );
        eprintln!(
            "{} {} lines from rows, {} from fallback",
            style("ℹ").blue(),
            stats.row_items,
            stats.fallback_items
        );
        eprintln!(
            "{} Total from {}",
            style("ℹ").blue(),
            stats.total_source
        );
        eprintln!(
            "{} Processing time: {}ms",
            style("ℹ").blue(),
            outcome.processing_time_ms
        );
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}
