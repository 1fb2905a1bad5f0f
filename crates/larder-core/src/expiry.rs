//! Shelf-life based expiry prediction.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::category::Category;

/// Where an item is kept at home.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageLocation {
    Fridge,
    Freezer,
    Pantry,
}

impl StorageLocation {
    /// Parse a storage location from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "fridge" | "refrigerator" => Some(StorageLocation::Fridge),
            "freezer" => Some(StorageLocation::Freezer),
            "pantry" | "cupboard" => Some(StorageLocation::Pantry),
            _ => None,
        }
    }
}

impl std::fmt::Display for StorageLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageLocation::Fridge => write!(f, "fridge"),
            StorageLocation::Freezer => write!(f, "freezer"),
            StorageLocation::Pantry => write!(f, "pantry"),
        }
    }
}

/// Days an item of `category` keeps at `storage`.
pub fn shelf_life_days(category: Category, storage: StorageLocation) -> u32 {
    use StorageLocation::*;

    // (fridge, freezer, pantry)
    let (fridge, freezer, pantry) = match category.expiry_class() {
        Category::Dairy => (7, 90, 1),
        Category::Meat => (3, 180, 1),
        Category::Vegetables => (10, 365, 3),
        Category::Fruits => (7, 365, 3),
        Category::Bread => (7, 90, 3),
        Category::Canned => (365, 365, 730),
        Category::Frozen => (1, 365, 1),
        _ => (365, 365, 365),
    };

    match storage {
        Fridge => fridge,
        Freezer => freezer,
        Pantry => pantry,
    }
}

/// Predict the expiry date of an item bought on `from`.
pub fn predict_expiry(category: Category, storage: StorageLocation, from: NaiveDate) -> NaiveDate {
    let days = shelf_life_days(category, storage);
    from.checked_add_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MAX)
}

/// Whether `expiry` falls within `within_days` from `today` (inclusive).
///
/// Already expired items are not "expiring soon".
pub fn is_expiring_soon(expiry: NaiveDate, today: NaiveDate, within_days: u32) -> bool {
    let threshold = today
        .checked_add_days(Days::new(u64::from(within_days)))
        .unwrap_or(NaiveDate::MAX);
    expiry >= today && expiry <= threshold
}
