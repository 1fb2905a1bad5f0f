//! Receipt item extraction module.

mod parser;
pub mod rules;

pub use parser::{
    AssistedExtractor, ExtractionResult, LineStats, ReceiptExtractor, ReceiptParser,
    RuleBasedExtractor,
};

use serde::{Deserialize, Serialize};

use crate::classifier::CategoryClassifier;
use crate::models::item::ExtractedItem;

/// Strategy that produced an extraction result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Keyword rules only.
    RuleBased,
    /// Keyword rules with a document-level classifier prediction.
    Assisted,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::RuleBased => write!(f, "rule-based"),
            Tier::Assisted => write!(f, "assisted"),
        }
    }
}

/// Extract grocery items from receipt text.
///
/// With a classifier the assisted tier is attempted; any classifier failure
/// falls back to rule-based extraction of the whole document.
pub fn extract(text: &str, classifier: Option<&dyn CategoryClassifier>) -> Vec<ExtractedItem> {
    match classifier {
        Some(classifier) => AssistedExtractor::new(classifier).parse(text).items,
        None => RuleBasedExtractor::new().parse(text).items,
    }
}
