//! Configuration structures for receipt extraction.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::expiry::StorageLocation;

/// Main configuration for larder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LarderConfig {
    /// Receipt extraction configuration.
    pub extraction: ExtractionConfig,

    /// Classifier model configuration.
    pub models: ModelConfig,

    /// Expiry prediction configuration.
    pub expiry: ExpiryConfig,
}

/// Receipt extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Lines shorter than this (after trimming) are never items.
    pub min_line_length: usize,

    /// Substrings rejected in addition to the built-in denylist.
    pub extra_denylist: Vec<String>,

    /// Use the category classifier when a model is configured.
    pub use_classifier: bool,

    /// Unit assigned to items whose line carries none.
    pub default_unit: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_line_length: 3,
            extra_denylist: Vec::new(),
            use_classifier: true,
            default_unit: "each".to_string(),
        }
    }
}

/// Model file paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Directory containing model files.
    pub model_dir: PathBuf,

    /// Category classifier weights file name (optional).
    pub classifier_model: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            classifier_model: None,
        }
    }
}

/// Expiry prediction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpiryConfig {
    /// Storage location assumed when none is given.
    pub default_storage: StorageLocation,

    /// Items expiring within this many days are flagged.
    pub notification_days: u32,
}

impl Default for ExpiryConfig {
    fn default() -> Self {
        Self {
            default_storage: StorageLocation::Fridge,
            notification_days: 3,
        }
    }
}

impl LarderConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Get full path to a model file.
    pub fn model_path(&self, model_name: &str) -> PathBuf {
        self.models.model_dir.join(model_name)
    }

    /// Path of the configured classifier model, if classification is enabled.
    pub fn classifier_path(&self) -> Option<PathBuf> {
        if !self.extraction.use_classifier {
            return None;
        }
        self.models
            .classifier_model
            .as_deref()
            .map(|name| self.model_path(name))
    }
}
