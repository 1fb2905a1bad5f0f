//! WASM bindings for grocery receipt item extraction.
//!
//! This crate provides WebAssembly bindings for use in browsers and Node.js.

use chrono::NaiveDate;
use wasm_bindgen::prelude::*;

use larder_core::models::config::ExtractionConfig;
use larder_core::receipt::rules;
use larder_core::{
    AssistedExtractor, Category, ExtractionResult, ReceiptParser, RuleBasedExtractor,
    StorageLocation, TokenWeightClassifier,
};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Extract grocery items from receipt text using the built-in rules.
///
/// Returns an array of `{ name, category, quantity, unit, price?, confidence, line }`.
#[wasm_bindgen]
pub fn extract_items_from_text(text: &str) -> Result<JsValue, JsValue> {
    let result = RuleBasedExtractor::new().parse(text);
    serde_wasm_bindgen::to_value(&result.items).map_err(to_js_error)
}

/// Same as [`extract_items_from_text`], serialized as a JSON string.
#[wasm_bindgen]
pub fn extract_items_json(text: &str) -> Result<String, JsValue> {
    let result = RuleBasedExtractor::new().parse(text);
    serde_json::to_string(&result.items).map_err(to_js_error)
}

/// Whether a receipt line may describe a purchased item.
#[wasm_bindgen]
pub fn is_purchasable_line(line: &str) -> bool {
    rules::is_purchasable_line(line)
}

/// Keyword category of an item name, or `undefined` when none matches.
#[wasm_bindgen]
pub fn infer_category(name: &str) -> Option<String> {
    rules::infer_category(name).map(|c| c.as_str().to_string())
}

/// Predict the expiry date (`YYYY-MM-DD`) of an item.
///
/// `purchased` defaults to today's local date.
#[wasm_bindgen]
pub fn predict_expiry(
    category: &str,
    storage: &str,
    purchased: Option<String>,
) -> Result<String, JsValue> {
    let category = Category::from_str(category)
        .ok_or_else(|| to_js_error(format!("Unknown category: {}", category)))?;
    let storage = StorageLocation::from_str(storage)
        .ok_or_else(|| to_js_error(format!("Unknown storage location: {}", storage)))?;

    let purchased = match purchased {
        Some(date) => NaiveDate::parse_from_str(&date, "%Y-%m-%d").map_err(to_js_error)?,
        None => today()?,
    };

    Ok(larder_core::predict_expiry(category, storage, purchased).to_string())
}

fn today() -> Result<NaiveDate, JsValue> {
    let now = js_sys::Date::new_0();
    NaiveDate::from_ymd_opt(now.get_full_year() as i32, now.get_month() + 1, now.get_date())
        .ok_or_else(|| to_js_error("Invalid current date"))
}

/// Item extractor class for browser use.
#[wasm_bindgen]
pub struct ItemExtractor {
    config: ExtractionConfig,
    classifier: Option<TokenWeightClassifier>,
}

#[wasm_bindgen]
impl ItemExtractor {
    /// Create a new item extractor with the built-in rules.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            config: ExtractionConfig::default(),
            classifier: None,
        }
    }

    /// Set the minimum item line length.
    #[wasm_bindgen]
    pub fn set_min_line_length(&mut self, length: usize) {
        self.config.min_line_length = length;
    }

    /// Reject lines containing `word` in addition to the built-in denylist.
    #[wasm_bindgen]
    pub fn add_denylist_word(&mut self, word: &str) {
        self.config.extra_denylist.push(word.to_string());
    }

    /// Set the unit used for lines without one.
    #[wasm_bindgen]
    pub fn set_default_unit(&mut self, unit: &str) {
        self.config.default_unit = unit.to_string();
    }

    /// Load category classifier weights from a JSON string.
    #[wasm_bindgen]
    pub fn load_classifier(&mut self, weights_json: &str) -> Result<(), JsValue> {
        let classifier = TokenWeightClassifier::from_json(weights_json).map_err(to_js_error)?;
        self.classifier = Some(classifier);
        Ok(())
    }

    /// Drop the loaded classifier.
    #[wasm_bindgen]
    pub fn clear_classifier(&mut self) {
        self.classifier = None;
    }

    /// Whether a classifier is loaded.
    #[wasm_bindgen]
    pub fn has_classifier(&self) -> bool {
        self.classifier.is_some()
    }

    fn run(&self, text: &str) -> ExtractionResult {
        let rules = RuleBasedExtractor::from_config(&self.config);
        match &self.classifier {
            Some(classifier) => AssistedExtractor::new(classifier).with_fallback(rules).parse(text),
            None => rules.parse(text),
        }
    }

    /// Extract items from text.
    #[wasm_bindgen]
    pub fn extract(&self, text: &str) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.run(text).items).map_err(to_js_error)
    }

    /// Get the extraction result with tier, prediction, warnings and line counts.
    #[wasm_bindgen]
    pub fn extract_with_metadata(&self, text: &str) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.run(text)).map_err(to_js_error)
    }
}

impl Default for ItemExtractor {
    fn default() -> Self {
        Self::new()
    }
}
