//! Core library for grocery receipt processing.
//!
//! This crate provides:
//! - Receipt line filtering and item field extraction (name, quantity, unit, price)
//! - Keyword-based category inference over a fixed grocery category set
//! - Two-tier extraction: rule-based, or assisted by a pluggable category classifier
//! - Shelf-life based expiry prediction for extracted items

pub mod classifier;
pub mod error;
pub mod expiry;
pub mod models;
pub mod receipt;

pub use classifier::{CategoryClassifier, CategoryPrediction, TokenWeightClassifier};
pub use error::{ClassifierError, LarderError, Result};
pub use expiry::{StorageLocation, is_expiring_soon, predict_expiry, shelf_life_days};
pub use models::category::Category;
pub use models::item::ExtractedItem;
pub use receipt::{
    AssistedExtractor, ExtractionResult, LineStats, ReceiptExtractor, ReceiptParser,
    RuleBasedExtractor, Tier, extract,
};
