//! Labeled receipt samples for measuring extraction accuracy.

use serde::{Deserialize, Serialize};

use super::category::Category;
use crate::error::Result;

/// A receipt text together with the items a person expects from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptSample {
    /// Raw receipt text.
    pub text: String,

    /// Expected items, in receipt order.
    pub items: Vec<SampleItem>,
}

/// Expected item of a labeled receipt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleItem {
    pub name: String,
    pub category: Category,
    pub quantity: f64,
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

impl ReceiptSample {
    /// Load a list of samples from a JSON file.
    pub fn load_all(path: &std::path::Path) -> Result<Vec<Self>> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}
