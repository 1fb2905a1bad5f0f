//! Extracted receipt item.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::category::Category;
use crate::expiry::{self, StorageLocation};

/// Unit used when a receipt line carries none.
pub const DEFAULT_UNIT: &str = "each";

/// A grocery item extracted from one receipt line.
///
/// Items carry no identity; ids and timestamps are assigned by whatever
/// stores them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedItem {
    /// Product description, without trailing quantity, unit and price.
    pub name: String,

    /// Inferred category.
    pub category: Category,

    /// Purchased quantity (always positive and finite).
    pub quantity: f64,

    /// Lower-case unit token (e.g. "lb", "oz", "gallon").
    pub unit: String,

    /// Line price, when the receipt line carried one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,

    /// Extraction confidence (0.0 - 1.0).
    pub confidence: f32,

    /// 1-based line number in the source text.
    pub line: usize,
}

impl ExtractedItem {
    /// Predict the expiry date of this item when stored at `storage`.
    pub fn predicted_expiry(&self, storage: StorageLocation, purchased: NaiveDate) -> NaiveDate {
        expiry::predict_expiry(self.category, storage, purchased)
    }
}

/// Coerce a parsed quantity into a valid one.
///
/// Missing, non-finite and non-positive quantities become 1.
pub fn normalize_quantity(quantity: Option<f64>) -> f64 {
    match quantity {
        Some(q) if q.is_finite() && q > 0.0 => q,
        _ => 1.0,
    }
}
