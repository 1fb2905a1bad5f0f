//! Regex patterns for receipt item lines.
//!
//! Every pattern is anchored at both ends and matched against a single
//! trimmed line. Capture group 1 is always the item name. Digits and unit
//! tokens are ASCII only.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // "<name> <qty> [x] [<unit>] $<price>", e.g. "Chicken Breast 2.5 lb $8.99"
    // Groups: name, quantity, unit, price
    pub static ref PRICED_QUANTITY: Regex = Regex::new(
        r"(?i)^(.+?)\s+([0-9]+(?:\.[0-9]+)?)\s*x?\s*([A-Za-z0-9_]+)?\s*\$?([0-9]+(?:\.[0-9]+)?)$"
    ).unwrap();

    // "<name> <qty> [<unit>]" without a price, e.g. "Bananas 3 lb"
    // Groups: name, quantity, unit
    pub static ref BARE_QUANTITY: Regex = Regex::new(
        r"(?i)^(.+?)\s+([0-9]+(?:\.[0-9]+)?)\s*(lb|kg|oz|g|each|ea)?\s*$"
    ).unwrap();

    // "<name> $<price>", e.g. "Bread Whole Wheat $2.49"
    // Groups: name, price
    pub static ref PRICED_NAME: Regex = Regex::new(
        r"(?i)^(.+?)\s+\$?([0-9]+(?:\.[0-9]+)?)$"
    ).unwrap();
}
