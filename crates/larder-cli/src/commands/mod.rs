//! CLI subcommands.

pub mod batch;
pub mod config;
pub mod evaluate;
pub mod extract;

use std::path::{Path, PathBuf};

use tracing::debug;

use larder_core::models::config::LarderConfig;
use larder_core::{ReceiptExtractor, TokenWeightClassifier};

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("larder")
        .join("config.json")
}

/// Load the configuration from an explicit path, the default location, or
/// fall back to defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<LarderConfig> {
    if let Some(path) = config_path {
        return Ok(LarderConfig::from_file(Path::new(path))?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Using config file {}", default_path.display());
        Ok(LarderConfig::from_file(&default_path)?)
    } else {
        Ok(LarderConfig::default())
    }
}

/// Options shared by commands that run extraction.
#[derive(Debug, Default, Clone, clap::Args)]
pub struct ClassifierArgs {
    /// Classifier weights file (overrides the configured model)
    #[arg(long)]
    pub classifier: Option<PathBuf>,

    /// Use rule-based extraction only
    #[arg(long, conflicts_with = "classifier")]
    pub no_classifier: bool,
}

/// Build the extractor for the given configuration and command-line options.
///
/// A classifier passed on the command line must load; a configured one
/// falls back to rule-based extraction when it can't.
pub fn build_extractor(
    config: &LarderConfig,
    args: &ClassifierArgs,
) -> anyhow::Result<ReceiptExtractor> {
    let mut config = config.clone();
    if args.no_classifier || args.classifier.is_some() {
        config.extraction.use_classifier = false;
    }

    let extractor = ReceiptExtractor::from_config(&config);

    match &args.classifier {
        Some(path) => {
            let classifier = TokenWeightClassifier::from_file(path)
                .map_err(|e| anyhow::anyhow!("Failed to load classifier: {}", e))?;
            Ok(extractor.with_classifier(Box::new(classifier)))
        }
        None => Ok(extractor),
    }
}
