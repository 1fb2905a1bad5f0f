use std::path::PathBuf;

use larder_core::models::ReceiptSample;
use larder_core::{
    AssistedExtractor, Category, CategoryClassifier, ReceiptParser, RuleBasedExtractor, Tier,
    TokenWeightClassifier, extract,
};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn classifier() -> TokenWeightClassifier {
    TokenWeightClassifier::from_file(&fixture("token_weights.json")).unwrap()
}

#[test]
fn test_fixture_weights_load() {
    let classifier = classifier();
    assert!(classifier.is_available());
    assert!(classifier.vocabulary_size() > 10);
}

#[test]
fn test_prediction_fills_unknown_categories() {
    let samples = ReceiptSample::load_all(&fixture("samples.json")).unwrap();
    let text = &samples[0].text;

    let rules = RuleBasedExtractor::new().parse(text);
    let cheddar = rules.items.iter().find(|i| i.name == "Cheddar Block").unwrap();
    assert_eq!(cheddar.category, Category::DryGoods);

    let assisted = AssistedExtractor::new(classifier()).parse(text);
    assert_eq!(assisted.tier, Tier::Assisted);

    let prediction = assisted.prediction.unwrap();
    assert_eq!(prediction.category, Category::Dairy);

    for item in &assisted.items {
        assert_eq!(item.category, Category::Dairy);
        assert_eq!(item.confidence, prediction.probability);
    }
}

#[test]
fn test_assisted_matches_rules_on_fields() {
    let samples = ReceiptSample::load_all(&fixture("samples.json")).unwrap();
    let classifier = classifier();

    for sample in &samples {
        let assisted = extract(&sample.text, Some(&classifier));
        let rules = extract(&sample.text, None);

        assert_eq!(assisted.len(), rules.len());
        for (a, r) in assisted.iter().zip(&rules) {
            assert_eq!(a.name, r.name);
            assert_eq!(a.quantity, r.quantity);
            assert_eq!(a.unit, r.unit);
            assert_eq!(a.line, r.line);
        }
    }
}

#[test]
fn test_unrecognized_receipt_falls_back() {
    let result = AssistedExtractor::new(classifier()).parse("Xyz Unknown Product $9.99");

    assert_eq!(result.tier, Tier::RuleBased);
    assert_eq!(result.items.len(), 1);
    assert_eq!(result.items[0].category, Category::DryGoods);
    assert_eq!(result.items[0].confidence, 0.7);
    assert_eq!(result.warnings.len(), 1);
}
