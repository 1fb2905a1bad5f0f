//! Two-tier receipt parser: keyword rules, optionally assisted by a classifier.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::classifier::{CategoryClassifier, CategoryPrediction, TokenWeightClassifier};
use crate::error::ClassifierError;
use crate::models::category::Category;
use crate::models::config::{ExtractionConfig, LarderConfig};
use crate::models::item::ExtractedItem;

use super::Tier;
use super::rules::{
    ConfidenceScorer, FieldExtractor, ItemFieldExtractor, LineClassifier, infer_category,
};

/// Per-document line counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineStats {
    /// Lines in the input.
    pub total: usize,
    /// Lines empty after trimming.
    pub blank: usize,
    /// Lines rejected by the line classifier.
    pub rejected: usize,
    /// Accepted lines no pattern matched.
    pub unmatched: usize,
    /// Lines that produced an item.
    pub extracted: usize,
}

/// Result of receipt extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Extracted items, in line order.
    pub items: Vec<ExtractedItem>,
    /// Tier that produced the items.
    pub tier: Tier,
    /// Document-level classifier prediction (assisted tier only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction: Option<CategoryPrediction>,
    /// Extraction warnings.
    pub warnings: Vec<String>,
    /// Line counters.
    pub stats: LineStats,
}

/// Trait for receipt parsing.
///
/// Parsing is total: malformed lines are dropped and classifier failures
/// are reported as warnings.
pub trait ReceiptParser {
    /// Parse receipt items from text.
    fn parse(&self, text: &str) -> ExtractionResult;
}

enum LineOutcome {
    Blank,
    Rejected,
    Unmatched,
    Item(ExtractedItem),
}

/// Rule-based extractor: line filtering, ordered patterns, keyword categories.
#[derive(Debug, Clone, Default)]
pub struct RuleBasedExtractor {
    lines: LineClassifier,
    fields: ItemFieldExtractor,
    scorer: ConfidenceScorer,
}

impl RuleBasedExtractor {
    /// Create an extractor with the built-in rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an extractor from configuration.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new()
            .with_line_classifier(
                LineClassifier::new()
                    .with_min_length(config.min_line_length)
                    .with_extra_denylist(&config.extra_denylist),
            )
            .with_field_extractor(
                ItemFieldExtractor::new().with_default_unit(config.default_unit.as_str()),
            )
    }

    /// Replace the line classifier.
    pub fn with_line_classifier(mut self, lines: LineClassifier) -> Self {
        self.lines = lines;
        self
    }

    /// Replace the field extractor.
    pub fn with_field_extractor(mut self, fields: ItemFieldExtractor) -> Self {
        self.fields = fields;
        self
    }

    /// Lazily extract items without a classifier prediction.
    ///
    /// The iterator borrows `text` and can be recreated at any time.
    pub fn items<'a>(&'a self, text: &'a str) -> impl Iterator<Item = ExtractedItem> + 'a {
        self.items_with(text, None)
    }

    /// Lazily extract items, resolving unknown categories from `prediction`.
    pub fn items_with<'a>(
        &'a self,
        text: &'a str,
        prediction: Option<CategoryPrediction>,
    ) -> impl Iterator<Item = ExtractedItem> + 'a {
        text.lines().enumerate().filter_map(move |(idx, line)| {
            match self.evaluate_line(idx + 1, line, prediction.as_ref()) {
                LineOutcome::Item(item) => Some(item),
                _ => None,
            }
        })
    }

    /// Parse with an already validated document prediction.
    ///
    /// `None` produces the rule-based tier.
    pub fn parse_with(&self, text: &str, prediction: Option<CategoryPrediction>) -> ExtractionResult {
        let mut stats = LineStats::default();
        let mut items = Vec::new();

        for (idx, line) in text.lines().enumerate() {
            stats.total += 1;
            match self.evaluate_line(idx + 1, line, prediction.as_ref()) {
                LineOutcome::Blank => stats.blank += 1,
                LineOutcome::Rejected => stats.rejected += 1,
                LineOutcome::Unmatched => {
                    debug!("No pattern matched line {}: {:?}", idx + 1, line.trim());
                    stats.unmatched += 1;
                }
                LineOutcome::Item(item) => {
                    stats.extracted += 1;
                    items.push(item);
                }
            }
        }

        let tier = if prediction.is_some() {
            Tier::Assisted
        } else {
            Tier::RuleBased
        };

        let mut warnings = Vec::new();
        if items.is_empty() && stats.total > stats.blank {
            warnings.push("No items found in receipt text".to_string());
        }

        info!(
            "Extracted {} items from {} lines ({} tier)",
            items.len(),
            stats.total,
            tier
        );

        ExtractionResult {
            items,
            tier,
            prediction,
            warnings,
            stats,
        }
    }

    fn evaluate_line(
        &self,
        line_no: usize,
        line: &str,
        prediction: Option<&CategoryPrediction>,
    ) -> LineOutcome {
        let line = line.trim();
        if line.is_empty() {
            return LineOutcome::Blank;
        }

        if !self.lines.is_purchasable(line) {
            return LineOutcome::Rejected;
        }

        let Some(found) = self.fields.extract(line) else {
            return LineOutcome::Unmatched;
        };

        let fields = found.value;
        let category = infer_category(&fields.name)
            .or_else(|| prediction.map(|p| p.category))
            .unwrap_or(Category::DryGoods);
        let confidence = self.scorer.score(category, prediction);

        debug!(
            "Line {} matched {:?}: {} -> {}",
            line_no, found.pattern, fields.name, category
        );

        LineOutcome::Item(ExtractedItem {
            name: fields.name,
            category,
            quantity: fields.quantity,
            unit: fields.unit,
            price: fields.price,
            confidence,
            line: line_no,
        })
    }
}

impl ReceiptParser for RuleBasedExtractor {
    fn parse(&self, text: &str) -> ExtractionResult {
        self.parse_with(text, None)
    }
}

/// Extractor that consults a classifier once per document and falls back to
/// the rule-based tier on any classifier failure.
pub struct AssistedExtractor<C: CategoryClassifier> {
    classifier: C,
    fallback: RuleBasedExtractor,
}

impl<C: CategoryClassifier> AssistedExtractor<C> {
    /// Create an assisted extractor with the built-in rules as fallback.
    pub fn new(classifier: C) -> Self {
        Self {
            classifier,
            fallback: RuleBasedExtractor::new(),
        }
    }

    /// Replace the rule-based extractor used for both tiers.
    pub fn with_fallback(mut self, fallback: RuleBasedExtractor) -> Self {
        self.fallback = fallback;
        self
    }

    /// The wrapped classifier.
    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    fn predict(&self, text: &str) -> Result<CategoryPrediction, ClassifierError> {
        if !self.classifier.is_available() {
            return Err(ClassifierError::Unavailable);
        }
        self.classifier.predict(text)?.validate()
    }
}

impl<C: CategoryClassifier> std::fmt::Debug for AssistedExtractor<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssistedExtractor")
            .field("classifier", &self.classifier.name())
            .field("fallback", &self.fallback)
            .finish()
    }
}

impl<C: CategoryClassifier> ReceiptParser for AssistedExtractor<C> {
    fn parse(&self, text: &str) -> ExtractionResult {
        if text.trim().is_empty() {
            return self.fallback.parse_with(text, None);
        }

        match self.predict(text) {
            Ok(prediction) => {
                debug!(
                    "Classifier {} predicted {} ({:.3})",
                    self.classifier.name(),
                    prediction.category,
                    prediction.probability
                );
                self.fallback.parse_with(text, Some(prediction))
            }
            Err(e) => {
                warn!(
                    "Classifier {} failed, falling back to rule-based extraction: {}",
                    self.classifier.name(),
                    e
                );
                let mut result = self.fallback.parse_with(text, None);
                result
                    .warnings
                    .push(format!("Classifier fallback ({}): {}", self.classifier.name(), e));
                result
            }
        }
    }
}

/// Extractor selected at construction time.
#[derive(Debug)]
pub enum ReceiptExtractor {
    RuleBased(RuleBasedExtractor),
    Assisted(AssistedExtractor<Box<dyn CategoryClassifier>>),
}

impl ReceiptExtractor {
    /// Build an extractor from configuration.
    ///
    /// A configured classifier model that fails to load is logged and the
    /// rule-based tier is used instead.
    pub fn from_config(config: &LarderConfig) -> Self {
        let rules = RuleBasedExtractor::from_config(&config.extraction);

        let Some(path) = config.classifier_path() else {
            return Self::RuleBased(rules);
        };

        match TokenWeightClassifier::from_file(&path) {
            Ok(classifier) => Self::Assisted(
                AssistedExtractor::new(Box::new(classifier) as Box<dyn CategoryClassifier>)
                    .with_fallback(rules),
            ),
            Err(e) => {
                warn!("Using rule-based extraction only: {}", e);
                Self::RuleBased(rules)
            }
        }
    }

    /// Use `classifier` on top of this extractor's rules.
    pub fn with_classifier(self, classifier: Box<dyn CategoryClassifier>) -> Self {
        let rules = match self {
            Self::RuleBased(rules) => rules,
            Self::Assisted(assisted) => assisted.fallback,
        };
        Self::Assisted(AssistedExtractor::new(classifier).with_fallback(rules))
    }

    /// Tier attempted by this extractor.
    pub fn tier(&self) -> Tier {
        match self {
            Self::RuleBased(_) => Tier::RuleBased,
            Self::Assisted(_) => Tier::Assisted,
        }
    }
}

impl Default for ReceiptExtractor {
    fn default() -> Self {
        Self::RuleBased(RuleBasedExtractor::new())
    }
}

impl ReceiptParser for ReceiptExtractor {
    fn parse(&self, text: &str) -> ExtractionResult {
        match self {
            Self::RuleBased(extractor) => extractor.parse(text),
            Self::Assisted(extractor) => extractor.parse(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::receipt::extract;
    use pretty_assertions::assert_eq;

    const RECEIPT: &str = "GROCERY STORE RECEIPT
Milk 2% 1 gallon $3.99
Bread Whole Wheat $2.49
Chicken Breast 2.5 lb $8.99

Thank you for shopping with us
SUBTOTAL: $15.47
TAX $1.24
TOTAL: $16.71";

    struct FailingClassifier;

    impl CategoryClassifier for FailingClassifier {
        fn predict(&self, _text: &str) -> Result<CategoryPrediction, ClassifierError> {
            Err(ClassifierError::Prediction("model exploded".to_string()))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    struct FixedClassifier(CategoryPrediction);

    impl CategoryClassifier for FixedClassifier {
        fn predict(&self, _text: &str) -> Result<CategoryPrediction, ClassifierError> {
            Ok(self.0)
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    struct OfflineClassifier;

    impl CategoryClassifier for OfflineClassifier {
        fn predict(&self, _text: &str) -> Result<CategoryPrediction, ClassifierError> {
            panic!("predict must not be called on an unavailable classifier");
        }

        fn is_available(&self) -> bool {
            false
        }

        fn name(&self) -> &str {
            "offline"
        }
    }

    fn single(line: &str) -> ExtractedItem {
        let items: Vec<_> = RuleBasedExtractor::new().items(line).collect();
        assert_eq!(items.len(), 1, "expected one item from {line:?}");
        items.into_iter().next().unwrap()
    }

    #[test]
    fn test_milk_line() {
        let item = single("Milk 2% 1 gallon $3.99");
        assert_eq!(item.name, "Milk 2%");
        assert_eq!(item.category, Category::Dairy);
        assert_eq!(item.quantity, 1.0);
        assert_eq!(item.unit, "gallon");
        assert_eq!(item.confidence, 0.7);
    }

    #[test]
    fn test_bread_line() {
        let item = single("Bread Whole Wheat $2.49");
        assert_eq!(item.name, "Bread Whole Wheat");
        assert_eq!(item.category, Category::Bread);
        assert_eq!(item.quantity, 1.0);
        assert_eq!(item.unit, "each");
    }

    #[test]
    fn test_chicken_line() {
        let item = single("Chicken Breast 2.5 lb $8.99");
        assert_eq!(item.name, "Chicken Breast");
        assert_eq!(item.category, Category::Meat);
        assert_eq!(item.quantity, 2.5);
        assert_eq!(item.unit, "lb");
    }

    #[test]
    fn test_total_line_yields_nothing() {
        let result = RuleBasedExtractor::new().parse("TOTAL: $43.89");
        assert!(result.items.is_empty());
        assert_eq!(result.stats.rejected, 1);
    }

    #[test]
    fn test_unknown_product_is_dry_goods() {
        assert_eq!(single("Xyz Unknown Product $9.99").category, Category::DryGoods);
    }

    #[test]
    fn test_full_receipt() {
        let result = RuleBasedExtractor::new().parse(RECEIPT);

        let names: Vec<_> = result.items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Milk 2%", "Bread Whole Wheat", "Chicken Breast"]);

        let lines: Vec<_> = result.items.iter().map(|i| i.line).collect();
        assert_eq!(lines, vec![2, 3, 4]);

        assert_eq!(result.tier, Tier::RuleBased);
        assert_eq!(result.prediction, None);
        assert!(result.warnings.is_empty());
        assert_eq!(
            result.stats,
            LineStats {
                total: 9,
                blank: 1,
                rejected: 4,
                unmatched: 1,
                extracted: 3,
            }
        );
    }

    #[test]
    fn test_parse_is_idempotent() {
        let extractor = RuleBasedExtractor::new();
        assert_eq!(extractor.parse(RECEIPT), extractor.parse(RECEIPT));

        let first: Vec<_> = extractor.items(RECEIPT).collect();
        let second: Vec<_> = extractor.items(RECEIPT).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_items_are_well_formed() {
        let text = "Mystery Item 0 lb $1.00\nEggs Large 2 x DOZEN $7.98\n  Frozen Peas 16oz $2.29  ";
        for item in RuleBasedExtractor::new().items(text) {
            assert!(item.quantity.is_finite() && item.quantity > 0.0);
            assert!(!item.name.is_empty());
            assert_eq!(item.unit, item.unit.to_lowercase());
            assert!(Category::ALL.contains(&item.category));
        }
    }

    #[test]
    fn test_empty_input() {
        let result = RuleBasedExtractor::new().parse("");
        assert!(result.items.is_empty());
        assert!(result.warnings.is_empty());
        assert_eq!(result.stats, LineStats::default());

        assert!(extract("\n  \n", Some(&FailingClassifier)).is_empty());
    }

    #[test]
    fn test_failing_classifier_matches_rule_based() {
        let assisted = AssistedExtractor::new(FailingClassifier).parse(RECEIPT);
        let rules = RuleBasedExtractor::new().parse(RECEIPT);

        assert_eq!(assisted.items, rules.items);
        assert_eq!(assisted.tier, Tier::RuleBased);
        assert_eq!(assisted.warnings.len(), 1);
        assert!(assisted.warnings[0].contains("failing"));

        assert_eq!(
            extract(RECEIPT, Some(&FailingClassifier)),
            extract(RECEIPT, None)
        );
    }

    #[test]
    fn test_unavailable_classifier_falls_back() {
        let result = AssistedExtractor::new(OfflineClassifier).parse(RECEIPT);
        assert_eq!(result.tier, Tier::RuleBased);
        assert_eq!(result.items, RuleBasedExtractor::new().parse(RECEIPT).items);
    }

    #[test]
    fn test_invalid_probability_falls_back() {
        for probability in [f32::NAN, 1.2, -0.5] {
            let classifier = FixedClassifier(CategoryPrediction::new(Category::Meat, probability));
            let result = AssistedExtractor::new(classifier).parse(RECEIPT);

            assert_eq!(result.tier, Tier::RuleBased);
            assert!(result.items.iter().all(|i| i.confidence == 0.7));
            assert_eq!(result.warnings.len(), 1);
        }
    }

    #[test]
    fn test_assisted_confidence() {
        let classifier = FixedClassifier(CategoryPrediction::new(Category::Meat, 0.9));
        let text = "Milk 2% 1 gallon $3.99\nChicken Breast 2.5 lb $8.99\nXyz Unknown Product $9.99";
        let result = AssistedExtractor::new(classifier).parse(text);

        assert_eq!(result.tier, Tier::Assisted);
        assert_eq!(
            result.prediction,
            Some(CategoryPrediction::new(Category::Meat, 0.9))
        );

        let milk = &result.items[0];
        assert_eq!(milk.category, Category::Dairy);
        assert!((milk.confidence - 0.72).abs() < 1e-6);

        let chicken = &result.items[1];
        assert_eq!(chicken.category, Category::Meat);
        assert_eq!(chicken.confidence, 0.9);

        // Unknown names take the document-level category
        let unknown = &result.items[2];
        assert_eq!(unknown.category, Category::Meat);
        assert_eq!(unknown.confidence, 0.9);
    }

    #[test]
    fn test_from_config() {
        let mut config = LarderConfig::default();
        config.extraction.min_line_length = 10;
        config.extraction.extra_denylist = vec!["loyalty".to_string()];
        config.extraction.default_unit = "pcs".to_string();

        let extractor = ReceiptExtractor::from_config(&config);
        assert_eq!(extractor.tier(), Tier::RuleBased);

        let result = extractor.parse("Kale $1.5\nLoyalty Card 1 $0.00\nOnions Yellow $1.29");
        assert_eq!(result.items.len(), 1);
        assert_eq!(result.items[0].name, "Onions Yellow");
        assert_eq!(result.items[0].unit, "pcs");
    }

    #[test]
    fn test_missing_model_uses_rules() {
        let mut config = LarderConfig::default();
        config.models.model_dir = "does/not/exist".into();
        config.models.classifier_model = Some("weights.json".to_string());

        let extractor = ReceiptExtractor::from_config(&config);
        assert_eq!(extractor.tier(), Tier::RuleBased);
        assert_eq!(extractor.parse(RECEIPT).items.len(), 3);
    }

    #[test]
    fn test_with_classifier() {
        let classifier = FixedClassifier(CategoryPrediction::new(Category::Dairy, 0.95));
        let extractor = ReceiptExtractor::default().with_classifier(Box::new(classifier));

        assert_eq!(extractor.tier(), Tier::Assisted);
        let result = extractor.parse(RECEIPT);
        assert_eq!(result.tier, Tier::Assisted);
        assert_eq!(result.items[0].confidence, 0.95);
    }
}
