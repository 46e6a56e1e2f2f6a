//! Shipping group classification
//!
//! Two Pranjul product lines are priced by fixed formulas instead of the
//! category tables. Everything else ships under its own category.

use serde::{Deserialize, Serialize};
use std::fmt;

const BRAND: &str = "pranjul";
const NIGHTY: &str = "nighty";
// "collecion" is a spelling that exists in live catalog data.
const COLLECTION: [&str; 2] = ["collection", "collecion"];

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "category", rename_all = "snake_case")]
pub enum ShippingGroup {
    PranjulNighty,
    PranjulCollection,
    Generic(String),
}

impl fmt::Display for ShippingGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PranjulNighty => write!(f, "Pranjul Nighty"),
            Self::PranjulCollection => write!(f, "Pranjul Collection"),
            Self::Generic(category) => write!(f, "{}", category),
        }
    }
}

/// Classify a line by its category and sub-category, case-insensitively.
/// A keyword may come from either field.
pub fn classify(category: &str, sub_category: Option<&str>) -> ShippingGroup {
    let cat = category.to_lowercase();
    let sub = sub_category.unwrap_or_default().to_lowercase();
    let mentions = |keyword: &str| cat.contains(keyword) || sub.contains(keyword);

    if mentions(BRAND) && mentions(NIGHTY) {
        ShippingGroup::PranjulNighty
    } else if mentions(BRAND) && COLLECTION.iter().any(|k| mentions(k)) {
        ShippingGroup::PranjulCollection
    } else {
        ShippingGroup::Generic(category.to_string())
    }
}
