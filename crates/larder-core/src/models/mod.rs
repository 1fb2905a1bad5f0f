//! Data models for extracted receipt items and configuration.

pub mod category;
pub mod config;
pub mod item;
pub mod sample;

pub use category::Category;
pub use config::LarderConfig;
pub use item::ExtractedItem;
pub use sample::{ReceiptSample, SampleItem};
