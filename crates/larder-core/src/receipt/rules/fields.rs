//! Item field extraction from a single receipt line.

use regex::{Captures, Regex};
use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::{BARE_QUANTITY, PRICED_NAME, PRICED_QUANTITY};
use super::{ExtractionMatch, FieldExtractor};
use crate::models::item::{DEFAULT_UNIT, normalize_quantity};

/// Receipt line layouts, most specific first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinePattern {
    /// Name, quantity, optional unit and a trailing price.
    PricedQuantity,
    /// Name, quantity and an optional weight/count unit, no price.
    BareQuantity,
    /// Name and a trailing price only.
    PricedName,
}

impl LinePattern {
    /// Patterns in the order they are tried.
    pub const ORDERED: [LinePattern; 3] = [
        LinePattern::PricedQuantity,
        LinePattern::BareQuantity,
        LinePattern::PricedName,
    ];

    fn regex(&self) -> &'static Regex {
        match self {
            LinePattern::PricedQuantity => &PRICED_QUANTITY,
            LinePattern::BareQuantity => &BARE_QUANTITY,
            LinePattern::PricedName => &PRICED_NAME,
        }
    }

    /// Capture group indices of (quantity, unit, price).
    fn groups(&self) -> (Option<usize>, Option<usize>, Option<usize>) {
        match self {
            LinePattern::PricedQuantity => (Some(2), Some(3), Some(4)),
            LinePattern::BareQuantity => (Some(2), Some(3), None),
            LinePattern::PricedName => (None, None, Some(2)),
        }
    }

    /// Match the pattern against a trimmed line.
    ///
    /// Returns `None` when the pattern does not match or the captured name
    /// is empty.
    fn apply(&self, line: &str, default_unit: &str) -> Option<ItemFields> {
        let caps = self.regex().captures(line)?;

        let name = caps.get(1)?.as_str().trim();
        if name.is_empty() {
            return None;
        }

        let (quantity_group, unit_group, price_group) = self.groups();

        let quantity = normalize_quantity(
            group(&caps, quantity_group).and_then(|q| q.parse::<f64>().ok()),
        );

        let unit = group(&caps, unit_group)
            .map(str::to_lowercase)
            .unwrap_or_else(|| default_unit.to_lowercase());

        let price = group(&caps, price_group).and_then(|p| Decimal::from_str(p).ok());

        Some(ItemFields {
            name: name.to_string(),
            quantity,
            unit,
            price,
        })
    }
}

fn group<'t>(caps: &Captures<'t>, index: Option<usize>) -> Option<&'t str> {
    index
        .and_then(|i| caps.get(i))
        .map(|m| m.as_str())
        .filter(|s| !s.is_empty())
}

/// Fields extracted from one item line.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemFields {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub price: Option<Decimal>,
}

/// Extracts item fields by trying each [`LinePattern`] in order.
#[derive(Debug, Clone)]
pub struct ItemFieldExtractor {
    default_unit: String,
}

impl ItemFieldExtractor {
    pub fn new() -> Self {
        Self {
            default_unit: DEFAULT_UNIT.to_string(),
        }
    }

    /// Set the unit used when a line carries none.
    pub fn with_default_unit(mut self, unit: impl Into<String>) -> Self {
        let unit = unit.into();
        if !unit.trim().is_empty() {
            self.default_unit = unit.trim().to_lowercase();
        }
        self
    }
}

impl Default for ItemFieldExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for ItemFieldExtractor {
    type Output = ExtractionMatch<ItemFields>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        let line = text.trim();

        LinePattern::ORDERED.iter().find_map(|pattern| {
            pattern
                .apply(line, &self.default_unit)
                .map(|fields| ExtractionMatch::new(fields, *pattern, line))
        })
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        text.lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .filter_map(|(idx, line)| self.extract(line).map(|m| m.with_line(idx + 1)))
            .collect()
    }
}
