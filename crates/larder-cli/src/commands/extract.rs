//! Extract command - extract items from a single receipt text file.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{Local, NaiveDate};
use clap::Args;
use console::style;
use serde::Serialize;
use tracing::{debug, info};

use larder_core::models::config::LarderConfig;
use larder_core::{
    CategoryPrediction, ExtractedItem, ExtractionResult, LineStats, ReceiptParser,
    StorageLocation, Tier, is_expiring_soon,
};

use super::{ClassifierArgs, build_extractor, load_config};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Receipt text file ("-" reads standard input)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    #[command(flatten)]
    classifier: ClassifierArgs,

    /// Show extraction confidence scores
    #[arg(long)]
    show_confidence: bool,

    /// Add predicted expiry dates using the configured storage location
    #[arg(long)]
    expiry: bool,

    /// Storage location for expiry prediction (implies --expiry)
    #[arg(long, value_parser = parse_storage)]
    storage: Option<StorageLocation>,

    /// Purchase date for expiry prediction (default: today)
    #[arg(long)]
    purchased: Option<NaiveDate>,
}

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
    /// File extension for outputs in this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

fn parse_storage(s: &str) -> Result<StorageLocation, String> {
    StorageLocation::from_str(s)
        .ok_or_else(|| format!("unknown storage location '{}' (fridge, freezer, pantry)", s))
}

/// Expiry settings applied to a report.
#[derive(Debug, Clone, Copy)]
pub struct ExpiryOptions {
    pub storage: StorageLocation,
    pub purchased: NaiveDate,
    pub today: NaiveDate,
    pub notification_days: u32,
}

/// An extracted item, with its predicted expiry when requested.
#[derive(Debug, Serialize)]
pub struct ReportItem {
    #[serde(flatten)]
    pub item: ExtractedItem,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiring_soon: Option<bool>,
}

/// Extraction output for one receipt.
#[derive(Debug, Serialize)]
pub struct ReceiptReport {
    pub source: String,
    pub tier: Tier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prediction: Option<CategoryPrediction>,
    pub items: Vec<ReportItem>,
    pub warnings: Vec<String>,
    pub stats: LineStats,
    pub processing_time_ms: u64,
}

impl ReceiptReport {
    pub fn new(
        source: impl Into<String>,
        result: ExtractionResult,
        expiry: Option<ExpiryOptions>,
        processing_time_ms: u64,
    ) -> Self {
        let items = result
            .items
            .into_iter()
            .map(|item| {
                let expires = expiry.map(|e| item.predicted_expiry(e.storage, e.purchased));
                let expiring_soon = expiry
                    .zip(expires)
                    .map(|(e, date)| is_expiring_soon(date, e.today, e.notification_days));
                ReportItem {
                    item,
                    expires,
                    expiring_soon,
                }
            })
            .collect();

        Self {
            source: source.into(),
            tier: result.tier,
            prediction: result.prediction,
            items,
            warnings: result.warnings,
            stats: result.stats,
            processing_time_ms,
        }
    }
}

/// Resolve expiry options from command-line flags and configuration.
pub fn expiry_options(
    config: &LarderConfig,
    expiry: bool,
    storage: Option<StorageLocation>,
    purchased: Option<NaiveDate>,
) -> Option<ExpiryOptions> {
    let storage = storage.or(expiry.then_some(config.expiry.default_storage))?;
    let today = Local::now().date_naive();

    Some(ExpiryOptions {
        storage,
        purchased: purchased.unwrap_or(today),
        today,
        notification_days: config.expiry.notification_days,
    })
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    // Load configuration
    let config = load_config(config_path)?;

    let text = read_input(&args.input)?;
    info!("Processing file: {}", args.input.display());

    let extractor = build_extractor(&config, &args.classifier)?;
    debug!("Using {} extraction", extractor.tier());

    let result = extractor.parse(&text);
    let expiry = expiry_options(&config, args.expiry, args.storage, args.purchased);
    let report = ReceiptReport::new(
        args.input.display().to_string(),
        result,
        expiry,
        start.elapsed().as_millis() as u64,
    );

    for warning in &report.warnings {
        eprintln!("{} {}", style("⚠").yellow(), warning);
    }

    // Format output
    let output = format_report(&report, args.format, args.show_confidence)?;

    // Write output
    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    // Show summary
    if args.show_confidence {
        eprintln!();
        eprintln!(
            "{} Tier: {}, mean confidence: {:.1}%",
            style("ℹ").blue(),
            report.tier,
            mean_confidence(&report) * 100.0
        );
        eprintln!(
            "{} Processing time: {}ms",
            style("ℹ").blue(),
            report.processing_time_ms
        );
    }

    Ok(())
}

fn read_input(input: &Path) -> anyhow::Result<String> {
    if input == Path::new("-") {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }

    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    Ok(fs::read_to_string(input)?)
}

fn mean_confidence(report: &ReceiptReport) -> f32 {
    if report.items.is_empty() {
        return 0.0;
    }
    let total: f32 = report.items.iter().map(|i| i.item.confidence).sum();
    total / report.items.len() as f32
}

pub fn format_report(
    report: &ReceiptReport,
    format: OutputFormat,
    show_confidence: bool,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Csv => format_csv(report),
        OutputFormat::Text => Ok(format_text(report, show_confidence)),
    }
}

fn format_csv(report: &ReceiptReport) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    // Write header
    wtr.write_record([
        "line",
        "name",
        "category",
        "quantity",
        "unit",
        "price",
        "confidence",
        "expires",
    ])?;

    for entry in &report.items {
        let item = &entry.item;
        wtr.write_record([
            &item.line.to_string(),
            &item.name,
            item.category.as_str(),
            &item.quantity.to_string(),
            &item.unit,
            &item.price.map(|p| p.to_string()).unwrap_or_default(),
            &format!("{:.2}", item.confidence),
            &entry.expires.map(|d| d.to_string()).unwrap_or_default(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(report: &ReceiptReport, show_confidence: bool) -> String {
    let mut output = String::new();

    output.push_str(&format!("Receipt: {}\n", report.source));
    output.push_str(&format!("Tier: {}\n", report.tier));
    if let Some(prediction) = &report.prediction {
        output.push_str(&format!(
            "Predicted category: {} ({:.1}%)\n",
            prediction.category,
            prediction.probability * 100.0
        ));
    }
    output.push('\n');

    output.push_str(&format!("Items ({}):\n", report.items.len()));
    for entry in &report.items {
        let item = &entry.item;
        output.push_str(&format!(
            "  {} [{}] {} {}",
            item.name, item.category, item.quantity, item.unit
        ));
        if let Some(price) = item.price {
            output.push_str(&format!(" ${}", price));
        }
        if show_confidence {
            output.push_str(&format!(" ({:.0}%)", item.confidence * 100.0));
        }
        if let Some(expires) = entry.expires {
            output.push_str(&format!(" expires {}", expires));
            if entry.expiring_soon == Some(true) {
                output.push_str(" (soon)");
            }
        }
        output.push('\n');
    }

    output.push_str(&format!(
        "\nLines: {} total, {} rejected, {} unmatched\n",
        report.stats.total, report.stats.rejected, report.stats.unmatched
    ));

    output
}
