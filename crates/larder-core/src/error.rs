//! Error types for the larder-core library.

use thiserror::Error;

/// Main error type for the larder library.
///
/// Receipt parsing itself never fails; these errors come from loading
/// configuration, classifier models and labeled samples.
#[derive(Error, Debug)]
pub enum LarderError {
    /// Category classifier error.
    #[error("classifier error: {0}")]
    Classifier(#[from] ClassifierError),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised by a category classifier.
///
/// Inside the extraction pipeline every variant is recoverable: the
/// document is re-processed by the rule-based tier.
#[derive(Error, Debug)]
pub enum ClassifierError {
    /// The classifier has no usable model.
    #[error("classifier is not available")]
    Unavailable,

    /// Failed to load classifier weights.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Prediction failed.
    #[error("prediction failed: {0}")]
    Prediction(String),

    /// The classifier returned a probability outside [0, 1].
    #[error("invalid prediction probability: {0}")]
    InvalidProbability(f32),
}

/// Result type for the larder library.
pub type Result<T> = std::result::Result<T, LarderError>;
