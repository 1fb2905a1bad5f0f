//! Linear bag-of-words category classifier.
//!
//! Weights are trained elsewhere and exported as JSON:
//!
//! ```json
//! {
//!   "bias": { "dry_goods": 0.2 },
//!   "tokens": {
//!     "milk": { "dairy": 2.1 },
//!     "chicken": { "meat": 2.4 }
//!   }
//! }
//! ```
//!
//! A category's score is its bias plus the weights of every token of the
//! text; scores are turned into probabilities with a softmax.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

use super::{CategoryClassifier, CategoryPrediction};
use crate::error::ClassifierError;
use crate::models::category::Category;

/// Serialized classifier weights.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenWeights {
    /// Per-category bias; missing categories have a bias of 0.
    pub bias: HashMap<Category, f32>,

    /// Per-token category weights.
    pub tokens: HashMap<String, HashMap<Category, f32>>,
}

/// Split text into lower-case word tokens.
///
/// Characters other than ASCII letters, digits, underscores and whitespace
/// act as separators.
pub fn tokenize(text: &str) -> Vec<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    cleaned.split_whitespace().map(str::to_string).collect()
}

/// Classifier backed by [`TokenWeights`].
#[derive(Debug, Clone)]
pub struct TokenWeightClassifier {
    weights: TokenWeights,
}

impl TokenWeightClassifier {
    pub fn new(weights: TokenWeights) -> Self {
        Self { weights }
    }

    /// Parse weights from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ClassifierError> {
        let weights: TokenWeights =
            serde_json::from_str(json).map_err(|e| ClassifierError::ModelLoad(e.to_string()))?;
        Ok(Self::new(weights))
    }

    /// Load weights from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ClassifierError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ClassifierError::ModelLoad(format!("{}: {}", path.display(), e)))?;
        let classifier = Self::from_json(&content)?;

        info!(
            "Loaded classifier weights from {} ({} tokens)",
            path.display(),
            classifier.vocabulary_size()
        );

        Ok(classifier)
    }

    /// Number of tokens with weights.
    pub fn vocabulary_size(&self) -> usize {
        self.weights.tokens.len()
    }

    /// Probability of every category, in [`Category::ALL`] order.
    pub fn probabilities(&self, text: &str) -> Result<Vec<(Category, f32)>, ClassifierError> {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return Err(ClassifierError::Prediction("text has no tokens".to_string()));
        }

        let mut scores: Vec<f32> = Category::ALL
            .iter()
            .map(|c| self.weights.bias.get(c).copied().unwrap_or(0.0))
            .collect();

        let mut known = 0usize;
        for token in &tokens {
            if let Some(weights) = self.weights.tokens.get(token) {
                known += 1;
                for (idx, category) in Category::ALL.iter().enumerate() {
                    scores[idx] += weights.get(category).copied().unwrap_or(0.0);
                }
            }
        }

        if known == 0 {
            return Err(ClassifierError::Prediction(
                "no known tokens in text".to_string(),
            ));
        }

        debug!("Classifier matched {}/{} tokens", known, tokens.len());

        let probs = softmax(&scores)?;
        Ok(Category::ALL.iter().copied().zip(probs).collect())
    }
}

fn softmax(scores: &[f32]) -> Result<Vec<f32>, ClassifierError> {
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    if !max.is_finite() {
        return Err(ClassifierError::Prediction(
            "non-finite category score".to_string(),
        ));
    }

    let exps: Vec<f32> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    Ok(exps.into_iter().map(|e| e / sum).collect())
}

impl CategoryClassifier for TokenWeightClassifier {
    fn predict(&self, text: &str) -> Result<CategoryPrediction, ClassifierError> {
        if !self.is_available() {
            return Err(ClassifierError::Unavailable);
        }

        let probs = self.probabilities(text)?;

        // Ties go to the category listed first
        let (category, probability) = probs
            .into_iter()
            .fold(None, |best: Option<(Category, f32)>, (c, p)| match best {
                Some((_, bp)) if bp >= p => best,
                _ => Some((c, p)),
            })
            .ok_or_else(|| ClassifierError::Prediction("no categories".to_string()))?;

        debug!("Predicted {} ({:.3})", category, probability);

        Ok(CategoryPrediction::new(category, probability))
    }

    fn is_available(&self) -> bool {
        !self.weights.tokens.is_empty()
    }

    fn name(&self) -> &str {
        "token-weights"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WEIGHTS: &str = r#"{
        "bias": {"dry_goods": 0.5},
        "tokens": {
            "milk": {"dairy": 3.0},
            "yogurt": {"dairy": 2.0},
            "chicken": {"meat": 3.0}
        }
    }"#;

    #[test]
    fn test_tokenize() {
        assert_eq!(
            tokenize("Milk 2% 1 gallon $3.99\nCHICKEN_BREAST"),
            vec!["milk", "2", "1", "gallon", "3", "99", "chicken_breast"]
        );
        assert!(tokenize(" $ - ").is_empty());
    }

    #[test]
    fn test_predicts_dominant_category() {
        let classifier = TokenWeightClassifier::from_json(WEIGHTS).unwrap();
        let prediction = classifier
            .predict("Milk 2% 1 gallon $3.99\nYogurt Greek 32oz $4.99")
            .unwrap();

        assert_eq!(prediction.category, Category::Dairy);
        assert!(prediction.probability > 0.5 && prediction.probability <= 1.0);
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let classifier = TokenWeightClassifier::from_json(WEIGHTS).unwrap();
        let probs = classifier.probabilities("chicken milk").unwrap();

        assert_eq!(probs.len(), Category::ALL.len());
        let total: f32 = probs.iter().map(|(_, p)| p).sum();
        assert!((total - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_unknown_tokens_fail() {
        let classifier = TokenWeightClassifier::from_json(WEIGHTS).unwrap();
        assert!(matches!(
            classifier.predict("Xyz Unknown Product"),
            Err(ClassifierError::Prediction(_))
        ));
        assert!(classifier.predict("").is_err());
    }

    #[test]
    fn test_empty_model_is_unavailable() {
        let classifier = TokenWeightClassifier::from_json("{}").unwrap();
        assert!(!classifier.is_available());
        assert!(matches!(
            classifier.predict("milk"),
            Err(ClassifierError::Unavailable)
        ));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            TokenWeightClassifier::from_json("{\"tokens\": {\"milk\": {\"household\": 1.0}}}"),
            Err(ClassifierError::ModelLoad(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let result = TokenWeightClassifier::from_file(Path::new("does/not/exist.json"));
        assert!(matches!(result, Err(ClassifierError::ModelLoad(_))));
    }
}
