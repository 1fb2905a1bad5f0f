//! Evaluate command - measure extraction accuracy on labeled receipts.

use std::path::PathBuf;

use clap::Args;
use console::style;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use tracing::{debug, info};

use larder_core::models::{ReceiptSample, SampleItem};
use larder_core::{ExtractedItem, ReceiptParser, Tier};

use super::{ClassifierArgs, build_extractor, load_config};

/// Arguments for the evaluate command.
#[derive(Args)]
pub struct EvaluateArgs {
    /// JSON file with labeled receipt samples
    #[arg(required = true)]
    samples: PathBuf,

    #[command(flatten)]
    classifier: ClassifierArgs,

    /// Print the evaluation as JSON
    #[arg(long)]
    json: bool,

    /// Fail when category accuracy is below this value (0.0 - 1.0)
    #[arg(long)]
    min_category_accuracy: Option<f64>,
}

/// Accumulated accuracy counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct Evaluation {
    pub samples: usize,
    pub assisted_samples: usize,
    pub expected_items: usize,
    pub matched_items: usize,
    pub extra_items: usize,
    pub category_correct: usize,
    pub quantity_correct: usize,
    pub unit_correct: usize,
    pub priced_items: usize,
    pub price_correct: usize,
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 { 0.0 } else { part as f64 / whole as f64 }
}

impl Evaluation {
    /// Compare the items extracted from one sample with its labels.
    ///
    /// Expected items are matched to extracted items by name
    /// (case-insensitive), each extracted item at most once.
    pub fn add(&mut self, expected: &[SampleItem], extracted: &[ExtractedItem], tier: Tier) {
        self.samples += 1;
        if tier == Tier::Assisted {
            self.assisted_samples += 1;
        }
        self.expected_items += expected.len();

        let mut used = vec![false; extracted.len()];

        for want in expected {
            let found = extracted.iter().enumerate().find(|(idx, item)| {
                !used[*idx] && item.name.trim().eq_ignore_ascii_case(want.name.trim())
            });

            let Some((idx, item)) = found else {
                debug!("Expected item not extracted: {}", want.name);
                continue;
            };
            used[idx] = true;
            self.matched_items += 1;

            if item.category == want.category {
                self.category_correct += 1;
            }
            if (item.quantity - want.quantity).abs() < 1e-9 {
                self.quantity_correct += 1;
            }
            if item.unit.eq_ignore_ascii_case(&want.unit) {
                self.unit_correct += 1;
            }
            if let Some(price) = want.price {
                self.priced_items += 1;
                let got = item.price.and_then(|p| p.to_f64());
                if got.is_some_and(|g| (g - price).abs() < 0.005) {
                    self.price_correct += 1;
                }
            }
        }

        self.extra_items += used.iter().filter(|u| !**u).count();
    }

    pub fn recall(&self) -> f64 {
        ratio(self.matched_items, self.expected_items)
    }

    pub fn category_accuracy(&self) -> f64 {
        ratio(self.category_correct, self.matched_items)
    }

    pub fn quantity_accuracy(&self) -> f64 {
        ratio(self.quantity_correct, self.matched_items)
    }

    pub fn unit_accuracy(&self) -> f64 {
        ratio(self.unit_correct, self.matched_items)
    }

    pub fn price_accuracy(&self) -> f64 {
        ratio(self.price_correct, self.priced_items)
    }
}

pub async fn run(args: EvaluateArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    if !args.samples.exists() {
        anyhow::bail!("Samples file not found: {}", args.samples.display());
    }

    let samples = ReceiptSample::load_all(&args.samples)?;
    if samples.is_empty() {
        anyhow::bail!("No samples in {}", args.samples.display());
    }

    info!("Evaluating {} samples", samples.len());

    let extractor = build_extractor(&config, &args.classifier)?;
    let mut evaluation = Evaluation::default();

    for sample in &samples {
        let result = extractor.parse(&sample.text);
        evaluation.add(&sample.items, &result.items, result.tier);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&evaluation)?);
    } else {
        print_evaluation(&evaluation);
    }

    if let Some(min) = args.min_category_accuracy {
        if evaluation.category_accuracy() < min {
            anyhow::bail!(
                "Category accuracy {:.3} is below the required {:.3}",
                evaluation.category_accuracy(),
                min
            );
        }
    }

    Ok(())
}

fn print_evaluation(evaluation: &Evaluation) {
    println!(
        "{} Evaluated {} samples ({} assisted)",
        style("ℹ").blue(),
        evaluation.samples,
        evaluation.assisted_samples
    );
    println!();
    println!(
        "  Items found:       {}/{} ({:.1}%)",
        evaluation.matched_items,
        evaluation.expected_items,
        evaluation.recall() * 100.0
    );
    println!("  Extra items:       {}", evaluation.extra_items);
    println!(
        "  Category accuracy: {:.1}%",
        evaluation.category_accuracy() * 100.0
    );
    println!(
        "  Quantity accuracy: {:.1}%",
        evaluation.quantity_accuracy() * 100.0
    );
    println!(
        "  Unit accuracy:     {:.1}%",
        evaluation.unit_accuracy() * 100.0
    );
    if evaluation.priced_items > 0 {
        println!(
            "  Price accuracy:    {:.1}%",
            evaluation.price_accuracy() * 100.0
        );
    }
}
