//! Per-item confidence scoring.

use crate::classifier::CategoryPrediction;
use crate::models::category::Category;

/// Confidence of items extracted without a classifier.
pub const RULE_BASED_CONFIDENCE: f32 = 0.7;

/// Applied to the classifier probability when the item's category differs
/// from the predicted one.
pub const DISAGREEMENT_FACTOR: f32 = 0.8;

/// Scores items from the resolved category and the document prediction.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfidenceScorer;

impl ConfidenceScorer {
    pub fn new() -> Self {
        Self
    }

    /// Score one item.
    ///
    /// Without a prediction this is the fixed rule-based confidence.
    pub fn score(&self, category: Category, prediction: Option<&CategoryPrediction>) -> f32 {
        let Some(prediction) = prediction else {
            return RULE_BASED_CONFIDENCE;
        };

        let base = prediction.probability;
        let score = if prediction.category == category {
            base
        } else {
            base * DISAGREEMENT_FACTOR
        };

        if score.is_finite() {
            score.clamp(0.0, 1.0)
        } else {
            RULE_BASED_CONFIDENCE
        }
    }
}
