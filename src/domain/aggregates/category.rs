//! Category Aggregate
//!
//! A catalog category owns its sub-category list and its shipping table.

use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::domain::shipping::{default_rules, overlapping_rules, ShippingRule};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    name: String,
    sub_categories: Vec<String>,
    shipping_rules: Vec<ShippingRule>,
}

impl Category {
    /// New category with the default shipping table.
    pub fn create(name: impl Into<String>) -> Result<Self, CategoryError> {
        Self::with_rules(name, default_rules())
    }

    pub fn with_rules(name: impl Into<String>, rules: Vec<ShippingRule>) -> Result<Self, CategoryError> {
        let name = normalize_name(name.into())?;
        let mut category = Self { name, sub_categories: vec![], shipping_rules: vec![] };
        category.replace_rules(rules)?;
        Ok(category)
    }

    /// Rebuild a stored category. Stored rules were validated when written.
    pub fn from_parts(name: String, sub_categories: Vec<String>, shipping_rules: Vec<ShippingRule>) -> Self {
        Self { name, sub_categories, shipping_rules }
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn sub_categories(&self) -> &[String] { &self.sub_categories }
    pub fn shipping_rules(&self) -> &[ShippingRule] { &self.shipping_rules }

    pub fn rename(&mut self, name: impl Into<String>) -> Result<(), CategoryError> {
        self.name = normalize_name(name.into())?;
        Ok(())
    }

    /// Swap in a new shipping table. Rules are validated; overlapping ranges
    /// are accepted (first in order wins) but reported.
    pub fn replace_rules(&mut self, rules: Vec<ShippingRule>) -> Result<(), CategoryError> {
        for (index, rule) in rules.iter().enumerate() {
            rule.validate().map_err(|e| CategoryError::InvalidRule { index, reason: e.to_string() })?;
        }
        for (a, b) in overlapping_rules(&rules) {
            tracing::warn!(category = %self.name, first = a, second = b, state = %rules[a].state, "overlapping shipping rules, earlier rule takes precedence");
        }
        self.shipping_rules = rules;
        Ok(())
    }

    pub fn set_sub_categories(&mut self, subs: Vec<String>) {
        self.sub_categories.clear();
        for sub in subs { self.add_sub_category(sub); }
    }

    /// Returns false when the sub-category already existed.
    pub fn add_sub_category(&mut self, sub: impl Into<String>) -> bool {
        let sub = sub.into().trim().to_string();
        if sub.is_empty() || self.sub_categories.contains(&sub) { return false; }
        self.sub_categories.push(sub);
        true
    }
}

fn normalize_name(name: String) -> Result<String, CategoryError> {
    let name = name.trim().to_string();
    if name.is_empty() { return Err(CategoryError::EmptyName); }
    Ok(name)
}

/// Catalog a fresh store starts with.
pub fn seed_categories() -> Vec<Category> {
    const SEED: [(&str, &[&str]); 8] = [
        ("Bottom Wear", &["Ankle Length", "Cotton Patiyala", "Four way Leggins", "Full Length", "Leggins", "Patiyala", "Two way Leggins", "Viscose Patiyala"]),
        ("Dupatta", &["Low Price Dupatta", "Nazeem Dupatta", "Plain Cotton Dupatta", "Printed Cotton Dupatta"]),
        ("Inner wear", &["Brasier", "Panties", "Slips"]),
        ("Kurtis Collections", &["A line Kurti", "Aliya cut Kurti", "Feeding Kurti", "Long Gown", "Nyra Cut Kurti", "Side Open Kurti", "Three piece set", "Two Piece Set", "Umberlla Kurti"]),
        ("Nighty", &["3/4 Nighty", "60 Inch Nighty", "Baniyan Cloth Night Dress", "Cotton Night Dress", "Dupatta Nighty", "Feeding Nighty", "Feeding Zipless", "Full Open Nighty", "Non Feeding", "Other Brand Nighty", "Pranjul brand nighty", "T-Shirts"]),
        ("Unstiched Material", &["Cotton Material", "Georgette material", "Other Material", "Silk Material"]),
        ("Readymade", &["Cotton with Lining", "Cotton without Lining", "Mixed Cotton Fullset", "Rayon Fullset", "Two piece set"]),
        ("Saree", &["Cotton Saree", "Creape Saree", "Linen Saree", "Poonam Saree", "Silk Saree"]),
    ];
    SEED.iter()
        .map(|(name, subs)| Category {
            name: name.to_string(),
            sub_categories: subs.iter().map(|s| s.to_string()).collect(),
            shipping_rules: default_rules(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryError { EmptyName, InvalidRule { index: usize, reason: String } }
impl std::error::Error for CategoryError {}
impl std::fmt::Display for CategoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Category name is empty"),
            Self::InvalidRule { index, reason } => write!(f, "Shipping rule #{} is invalid: {}", index + 1, reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::shipping::{CostType, ALL_STATES};
    use rust_decimal::Decimal;

    #[test]
    fn test_new_category_gets_default_rules() {
        let c = Category::create("  Lehenga ").unwrap();
        assert_eq!(c.name(), "Lehenga");
        assert_eq!(c.shipping_rules(), default_rules().as_slice());
    }

    #[test]
    fn test_invalid_rule_rejected() {
        let rules = vec![ShippingRule::new("Kerala", 5, 1, Decimal::from(10), CostType::Fixed)];
        assert!(matches!(Category::with_rules("Saree", rules), Err(CategoryError::InvalidRule { index: 0, .. })));
        assert_eq!(Category::create("   "), Err(CategoryError::EmptyName));
    }

    #[test]
    fn test_overlapping_rules_kept_in_order() {
        let mut c = Category::create("Saree").unwrap();
        let rules = vec![
            ShippingRule::new(ALL_STATES, 1, 10, Decimal::from(15), CostType::Fixed),
            ShippingRule::new(ALL_STATES, 1, 5, Decimal::from(99), CostType::Fixed),
        ];
        c.replace_rules(rules.clone()).unwrap();
        assert_eq!(c.shipping_rules(), rules.as_slice());
    }

    #[test]
    fn test_sub_categories_deduplicated() {
        let mut c = Category::create("Saree").unwrap();
        assert!(c.add_sub_category("Silk Saree"));
        assert!(!c.add_sub_category("Silk Saree "));
        c.set_sub_categories(vec!["A".into(), "A".into(), "B".into()]);
        assert_eq!(c.sub_categories(), ["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn test_seed_catalog() {
        let seeded = seed_categories();
        assert_eq!(seeded.len(), 8);
        let nighty = seeded.iter().find(|c| c.name() == "Nighty").unwrap();
        assert!(nighty.sub_categories().iter().any(|s| s == "Pranjul brand nighty"));
        assert!(seeded.iter().all(|c| c.shipping_rules().len() == 2));
    }
}
