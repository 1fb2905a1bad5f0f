//! Grocery category vocabulary shared by extraction and expiry prediction.

use serde::{Deserialize, Serialize};

/// Grocery item category.
///
/// This is a closed set: extraction never produces anything outside it and
/// unknown items fall back to [`Category::DryGoods`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Dairy,
    Meat,
    Vegetables,
    Fruits,
    Bread,
    Canned,
    Frozen,
    DryGoods,
    Beverages,
    Snacks,
}

impl Category {
    /// All categories, in classifier output order.
    pub const ALL: [Category; 10] = [
        Category::Dairy,
        Category::Meat,
        Category::Vegetables,
        Category::Fruits,
        Category::Bread,
        Category::Canned,
        Category::Frozen,
        Category::DryGoods,
        Category::Beverages,
        Category::Snacks,
    ];

    /// Snake-case identifier used in JSON, CSV and model files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Dairy => "dairy",
            Category::Meat => "meat",
            Category::Vegetables => "vegetables",
            Category::Fruits => "fruits",
            Category::Bread => "bread",
            Category::Canned => "canned",
            Category::Frozen => "frozen",
            Category::DryGoods => "dry_goods",
            Category::Beverages => "beverages",
            Category::Snacks => "snacks",
        }
    }

    /// Parse a category from its identifier (case-insensitive).
    pub fn from_str(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();

        match &*s {
            "dairy" => Some(Category::Dairy),
            "meat" => Some(Category::Meat),
            "vegetables" => Some(Category::Vegetables),
            "fruits" => Some(Category::Fruits),
            "bread" => Some(Category::Bread),
            "canned" => Some(Category::Canned),
            "frozen" => Some(Category::Frozen),
            "dry_goods" | "dry goods" => Some(Category::DryGoods),
            "beverages" => Some(Category::Beverages),
            "snacks" => Some(Category::Snacks),
            _ => None,
        }
    }

    /// Category the expiry table uses for this category.
    ///
    /// The shelf-life table has no rows for beverages and snacks; both are
    /// treated as dry goods.
    pub fn expiry_class(&self) -> Category {
        match self {
            Category::Beverages | Category::Snacks => Category::DryGoods,
            other => *other,
        }
    }
}

impl Default for Category {
    fn default() -> Self {
        Self::DryGoods
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
