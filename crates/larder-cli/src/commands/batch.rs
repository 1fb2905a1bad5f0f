//! Batch processing command for multiple receipt files.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

use larder_core::{ReceiptExtractor, ReceiptParser};

use super::extract::{ExpiryOptions, OutputFormat, ReceiptReport, expiry_options, format_report};
use super::{ClassifierArgs, build_extractor, load_config};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    #[command(flatten)]
    classifier: ClassifierArgs,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Add predicted expiry dates using the configured storage location
    #[arg(long)]
    expiry: bool,

    /// Number of parallel workers
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    report: Option<ReceiptReport>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    // Load configuration
    let config = load_config(config_path)?;

    // Expand glob pattern
    let mut files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            matches!(ext.to_lowercase().as_str(), "txt" | "text")
        })
        .collect();
    files.sort();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    // Create output directory if specified
    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let extractor = Arc::new(build_extractor(&config, &args.classifier)?);
    let expiry = expiry_options(&config, args.expiry, None, None);

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    // Process files on blocking worker threads, at most `jobs` at a time
    let semaphore = Arc::new(Semaphore::new(args.jobs.max(1)));
    let mut tasks = JoinSet::new();

    for (idx, path) in files.into_iter().enumerate() {
        let permit = semaphore.clone().acquire_owned().await?;
        let extractor = Arc::clone(&extractor);

        tasks.spawn_blocking(move || {
            let file_start = Instant::now();
            let result = process_single_file(&path, &extractor, expiry);
            let processing_time_ms = file_start.elapsed().as_millis() as u64;
            drop(permit);

            let result = match result {
                Ok(mut report) => {
                    report.processing_time_ms = processing_time_ms;
                    ProcessResult {
                        path,
                        report: Some(report),
                        error: None,
                        processing_time_ms,
                    }
                }
                Err(e) => ProcessResult {
                    path,
                    report: None,
                    error: Some(e.to_string()),
                    processing_time_ms,
                },
            };
            (idx, result)
        });
    }

    let mut results = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        let (idx, result) = joined?;

        if let Some(error_msg) = &result.error {
            if args.continue_on_error {
                warn!("Failed to process {}: {}", result.path.display(), error_msg);
            } else {
                error!("Failed to process {}: {}", result.path.display(), error_msg);
                tasks.abort_all();
                anyhow::bail!("Processing failed: {}", error_msg);
            }
        }

        results.push((idx, result));
        overall_pb.inc(1);
    }

    overall_pb.finish_with_message("Complete");

    results.sort_by_key(|(idx, _)| *idx);
    let results: Vec<ProcessResult> = results.into_iter().map(|(_, r)| r).collect();

    // Write outputs
    let successful: Vec<_> = results.iter().filter(|r| r.report.is_some()).collect();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    if let Some(output_dir) = &args.output_dir {
        for result in &successful {
            if let Some(report) = &result.report {
                let output_name = result
                    .path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("receipt");

                let output_path =
                    output_dir.join(format!("{}.{}", output_name, args.format.extension()));

                fs::write(&output_path, format_report(report, args.format, true)?)?;
                debug!("Wrote output to {}", output_path.display());
            }
        }
    }

    // Generate summary if requested
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

    let total_items: usize = successful
        .iter()
        .filter_map(|r| r.report.as_ref())
        .map(|r| r.items.len())
        .sum();

    // Print summary
    println!();
    println!(
        "{} Processed {} files ({} items) in {:?}",
        style("✓").green(),
        results.len(),
        total_items,
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(successful.len()).green(),
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

fn process_single_file(
    path: &Path,
    extractor: &ReceiptExtractor,
    expiry: Option<ExpiryOptions>,
) -> anyhow::Result<ReceiptReport> {
    let text = fs::read_to_string(path)?;
    let result = extractor.parse(&text);
    Ok(ReceiptReport::new(path.display().to_string(), result, expiry, 0))
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "tier",
        "items",
        "rejected_lines",
        "unmatched_lines",
        "warnings",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result.path.file_name().and_then(|s| s.to_str()).unwrap_or("");

        if let Some(report) = &result.report {
            wtr.write_record([
                filename,
                "success",
                &report.tier.to_string(),
                &report.items.len().to_string(),
                &report.stats.rejected.to_string(),
                &report.stats.unmatched.to_string(),
                &report.warnings.join("; "),
                &result.processing_time_ms.to_string(),
                "",
            ])?;
        } else {
            wtr.write_record([
                filename,
                "error",
                "",
                "",
                "",
                "",
                "",
                &result.processing_time_ms.to_string(),
                result.error.as_deref().unwrap_or(""),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
