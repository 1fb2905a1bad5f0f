//! Keyword-based category inference.

use crate::models::category::Category;

/// Keyword table, searched in order. The first category with a keyword
/// contained in the lower-cased item name wins.
pub const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (Category::Dairy, &["milk", "cheese", "yogurt", "butter", "cream"]),
    (Category::Meat, &["chicken", "beef", "pork", "fish", "turkey", "ham"]),
    (
        Category::Vegetables,
        &["lettuce", "spinach", "carrot", "broccoli", "tomato", "onion"],
    ),
    (
        Category::Fruits,
        &["apple", "banana", "orange", "berry", "grape", "lemon"],
    ),
    (Category::Bread, &["bread", "bagel", "roll", "bun"]),
    (Category::Frozen, &["frozen"]),
    (Category::Beverages, &["juice", "soda", "water", "coffee", "tea"]),
];

/// Infer the category of an item from its name.
///
/// Returns `None` when no keyword matches; callers pick the fallback.
pub fn infer_category(name: &str) -> Option<Category> {
    let name = name.to_lowercase();

    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| name.contains(k)))
        .map(|(category, _)| *category)
}
