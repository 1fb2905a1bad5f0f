//! Rule-based building blocks of receipt extraction.

pub mod category;
pub mod confidence;
pub mod fields;
pub mod lines;
pub mod patterns;

pub use category::{CATEGORY_KEYWORDS, infer_category};
pub use confidence::{ConfidenceScorer, DISAGREEMENT_FACTOR, RULE_BASED_CONFIDENCE};
pub use fields::{ItemFieldExtractor, ItemFields, LinePattern};
pub use lines::{DENYLIST, LineClassifier, LineRejection, MIN_LINE_LENGTH, is_purchasable_line};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from a single line.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract the field from every line of a document.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// A value extracted from receipt text, with its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Pattern that produced the value.
    pub pattern: LinePattern,
    /// Source text that was matched.
    pub source: String,
    /// 1-based line number in the source document.
    pub line: Option<usize>,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, pattern: LinePattern, source: impl Into<String>) -> Self {
        Self {
            value,
            pattern,
            source: source.into(),
            line: None,
        }
    }

    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }
}
