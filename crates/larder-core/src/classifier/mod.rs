//! Document-level category classification.
//!
//! A classifier looks at a whole receipt and predicts its dominant grocery
//! category. Extraction uses the prediction as a second opinion next to
//! keyword inference; a failing classifier never fails extraction.

mod token_weights;

pub use token_weights::{TokenWeightClassifier, TokenWeights, tokenize};

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::ClassifierError;
use crate::models::category::Category;

/// Dominant category of a document and its probability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryPrediction {
    pub category: Category,
    pub probability: f32,
}

impl CategoryPrediction {
    pub fn new(category: Category, probability: f32) -> Self {
        Self {
            category,
            probability,
        }
    }

    /// Reject probabilities that are NaN or outside [0, 1].
    pub fn validate(self) -> Result<Self, ClassifierError> {
        if self.probability.is_finite() && (0.0..=1.0).contains(&self.probability) {
            Ok(self)
        } else {
            Err(ClassifierError::InvalidProbability(self.probability))
        }
    }
}

/// Trait for receipt category classifiers.
///
/// Implementations must be usable from several threads at once; a
/// prediction is a read-only operation.
pub trait CategoryClassifier: Send + Sync {
    /// Predict the dominant category of a receipt text.
    fn predict(&self, text: &str) -> Result<CategoryPrediction, ClassifierError>;

    /// Whether the classifier can currently make predictions.
    fn is_available(&self) -> bool {
        true
    }

    /// Short name used in logs.
    fn name(&self) -> &str;
}

impl<C: CategoryClassifier + ?Sized> CategoryClassifier for &C {
    fn predict(&self, text: &str) -> Result<CategoryPrediction, ClassifierError> {
        (**self).predict(text)
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<C: CategoryClassifier + ?Sized> CategoryClassifier for Box<C> {
    fn predict(&self, text: &str) -> Result<CategoryPrediction, ClassifierError> {
        (**self).predict(text)
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<C: CategoryClassifier + ?Sized> CategoryClassifier for Arc<C> {
    fn predict(&self, text: &str) -> Result<CategoryPrediction, ClassifierError> {
        (**self).predict(text)
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
