//! Receipt line classification.
//!
//! Decides whether a line could describe a purchased item before any field
//! extraction runs. Totals, tax, store metadata and very short fragments are
//! rejected here.

use tracing::debug;

/// Minimum trimmed line length (in characters) of an item line.
pub const MIN_LINE_LENGTH: usize = 3;

/// Substrings marking a line as non-purchasable (matched case-insensitively).
pub const DENYLIST: &[&str] = &[
    "total",
    "tax",
    "change",
    "receipt",
    "store",
    "cashier",
    "bag",
    "bottle deposit",
    "coupon",
    "discount",
];

/// Why a line was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineRejection {
    /// The trimmed line is shorter than the minimum length.
    TooShort,
    /// The line contains a denylisted substring.
    Denylisted(String),
}

/// Line classifier with a configurable length threshold and denylist.
#[derive(Debug, Clone)]
pub struct LineClassifier {
    min_length: usize,
    denylist: Vec<String>,
}

impl LineClassifier {
    /// Create a classifier with the built-in threshold and denylist.
    pub fn new() -> Self {
        Self {
            min_length: MIN_LINE_LENGTH,
            denylist: DENYLIST.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Set the minimum trimmed line length.
    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.min_length = min_length;
        self
    }

    /// Add substrings to the denylist.
    pub fn with_extra_denylist<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.denylist.extend(
            extra
                .into_iter()
                .map(|s| s.as_ref().trim().to_lowercase())
                .filter(|s| !s.is_empty()),
        );
        self
    }

    /// Check a line, returning the reason when it is rejected.
    pub fn rejection(&self, line: &str) -> Option<LineRejection> {
        let line = line.trim();

        if line.chars().count() < self.min_length {
            return Some(LineRejection::TooShort);
        }

        let lower = line.to_lowercase();
        self.denylist
            .iter()
            .find(|keyword| lower.contains(keyword.as_str()))
            .map(|keyword| LineRejection::Denylisted(keyword.clone()))
    }

    /// Whether the line may describe a purchased item.
    pub fn is_purchasable(&self, line: &str) -> bool {
        match self.rejection(line) {
            Some(reason) => {
                debug!("Rejected line {:?}: {:?}", line.trim(), reason);
                false
            }
            None => true,
        }
    }
}

impl Default for LineClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether a line may describe a purchased item, using the built-in rules.
pub fn is_purchasable_line(line: &str) -> bool {
    LineClassifier::new().is_purchasable(line)
}
