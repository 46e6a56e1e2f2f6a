//! Shipping rules and the cost engine
//!
//! Every category carries an ordered list of [`ShippingRule`]s. At checkout the
//! cart is partitioned into shipping groups ([`classify`]) and each group is
//! priced by [`ShippingCostCalculator`] against a [`RuleLookup`].

pub mod calculator;
pub mod classify;
pub mod states;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::{Validate, ValidationError};

pub use calculator::{
    ChargeBasis, ShippingCharge, ShippingComputationInput, ShippingComputationResult,
    ShippingCostCalculator, ShippingPolicy,
};
pub use classify::{classify, ShippingGroup};
pub use states::{is_destination_state, is_rule_state, ALL_STATES, INDIAN_STATES, OTHER_STATES};

/// Highest base cost a rule may be saved with.
pub const MAX_RULE_COST: i64 = 1_000_000;

/// How a matched rule's cost scales with the group quantity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostType {
    #[default]
    Fixed,
    PerPiece,
    #[serde(rename = "every_2")]
    Every2,
    #[serde(rename = "every_3")]
    Every3,
    #[serde(rename = "every_10")]
    Every10,
}

impl CostType {
    /// Number of billable units for `quantity` pieces.
    pub fn units(self, quantity: u32) -> u32 {
        match self {
            Self::Fixed => 1,
            Self::PerPiece => quantity,
            Self::Every2 => quantity.div_ceil(2),
            Self::Every3 => quantity.div_ceil(3),
            Self::Every10 => quantity.div_ceil(10),
        }
    }
}

/// One row of a category's shipping table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_rule"))]
pub struct ShippingRule {
    #[validate(length(min = 1))]
    pub state: String,
    #[validate(range(min = 1))]
    pub min_qty: u32,
    pub max_qty: u32,
    pub cost: Decimal,
    #[serde(rename = "type", default)]
    pub cost_type: CostType,
}

fn validate_rule(rule: &ShippingRule) -> Result<(), ValidationError> {
    if !is_rule_state(&rule.state) {
        return Err(ValidationError::new("unknown_state"));
    }
    if rule.min_qty > rule.max_qty {
        return Err(ValidationError::new("inverted_range"));
    }
    if rule.cost.is_sign_negative() {
        return Err(ValidationError::new("negative_cost"));
    }
    if rule.cost > Decimal::from(MAX_RULE_COST) {
        return Err(ValidationError::new("cost_too_large"));
    }
    Ok(())
}

impl ShippingRule {
    pub fn new(state: impl Into<String>, min_qty: u32, max_qty: u32, cost: Decimal, cost_type: CostType) -> Self {
        Self { state: state.into(), min_qty, max_qty, cost, cost_type }
    }

    pub fn covers(&self, quantity: u32) -> bool {
        self.min_qty <= quantity && quantity <= self.max_qty
    }

    /// Charge for `quantity` pieces under this rule. Saturates at `Decimal::MAX`.
    pub fn charge(&self, quantity: u32) -> Decimal {
        self.cost.checked_mul(Decimal::from(self.cost_type.units(quantity))).unwrap_or(Decimal::MAX)
    }

    fn overlaps(&self, other: &ShippingRule) -> bool {
        self.state == other.state && self.min_qty <= other.max_qty && other.min_qty <= self.max_qty
    }
}

/// Rules every new category starts with: 1–5 pieces cost a flat 50, six or more ship free.
pub fn default_rules() -> Vec<ShippingRule> {
    vec![
        ShippingRule::new(ALL_STATES, 1, 5, Decimal::from(50), CostType::Fixed),
        ShippingRule::new(ALL_STATES, 6, 9999, Decimal::ZERO, CostType::Fixed),
    ]
}

/// Pairs of rule indices whose ranges overlap for the same state.
///
/// Overlaps are tolerated at pricing time (first rule in stored order wins);
/// this is only used to warn when an administrator saves such a table.
pub fn overlapping_rules(rules: &[ShippingRule]) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for (i, a) in rules.iter().enumerate() {
        for (j, b) in rules.iter().enumerate().skip(i + 1) {
            if a.overlaps(b) {
                pairs.push((i, j));
            }
        }
    }
    pairs
}

/// Read access to per-category shipping rules.
pub trait RuleLookup {
    fn rules_for(&self, category: &str) -> Option<&[ShippingRule]>;
}

/// Point-in-time copy of every category's rules, taken once per computation.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RuleSnapshot(HashMap<String, Vec<ShippingRule>>);

impl RuleSnapshot {
    pub fn new() -> Self { Self::default() }

    pub fn with_rules(mut self, category: impl Into<String>, rules: Vec<ShippingRule>) -> Self {
        self.insert(category, rules);
        self
    }

    pub fn insert(&mut self, category: impl Into<String>, rules: Vec<ShippingRule>) {
        self.0.insert(category.into(), rules);
    }

    pub fn len(&self) -> usize { self.0.len() }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl RuleLookup for RuleSnapshot {
    fn rules_for(&self, category: &str) -> Option<&[ShippingRule]> {
        self.0.get(category).map(Vec::as_slice)
    }
}

impl FromIterator<(String, Vec<ShippingRule>)> for RuleSnapshot {
    fn from_iter<I: IntoIterator<Item = (String, Vec<ShippingRule>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl RuleLookup for HashMap<String, Vec<ShippingRule>> {
    fn rules_for(&self, category: &str) -> Option<&[ShippingRule]> {
        self.get(category).map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cost_type_units() {
        assert_eq!(CostType::Fixed.units(7), 1);
        assert_eq!(CostType::PerPiece.units(7), 7);
        assert_eq!(CostType::Every2.units(7), 4);
        assert_eq!(CostType::Every3.units(7), 3);
        assert_eq!(CostType::Every10.units(7), 1);
        assert_eq!(CostType::Every10.units(11), 2);
    }

    #[test]
    fn test_rule_json_shape() {
        let rule: ShippingRule = serde_json::from_str(r#"{"state":"Kerala","minQty":1,"maxQty":3,"cost":20,"type":"every_2"}"#).unwrap();
        assert_eq!(rule.cost_type, CostType::Every2);
        assert_eq!(rule.cost, Decimal::from(20));
        let back = serde_json::to_value(&rule).unwrap();
        assert_eq!(back["type"], "every_2");
        assert_eq!(back["minQty"], 1);
    }

    #[test]
    fn test_rule_validation() {
        assert!(ShippingRule::new("Kerala", 1, 5, Decimal::from(10), CostType::Fixed).validate().is_ok());
        assert!(ShippingRule::new(OTHER_STATES, 1, 5, Decimal::from(10), CostType::Fixed).validate().is_ok());
        assert!(ShippingRule::new("Atlantis", 1, 5, Decimal::from(10), CostType::Fixed).validate().is_err());
        assert!(ShippingRule::new("Kerala", 6, 5, Decimal::from(10), CostType::Fixed).validate().is_err());
        assert!(ShippingRule::new("Kerala", 0, 5, Decimal::from(10), CostType::Fixed).validate().is_err());
        assert!(ShippingRule::new("Kerala", 1, 5, Decimal::from(-1), CostType::Fixed).validate().is_err());
        assert!(ShippingRule::new("Kerala", 1, 5, Decimal::from(MAX_RULE_COST), CostType::Fixed).validate().is_ok());
        assert!(ShippingRule::new("Kerala", 1, 5, Decimal::from(MAX_RULE_COST + 1), CostType::Fixed).validate().is_err());
    }

    #[test]
    fn test_charge_saturates() {
        let rule = ShippingRule::new(ALL_STATES, 1, u32::MAX, Decimal::MAX, CostType::PerPiece);
        assert_eq!(rule.charge(3), Decimal::MAX);
        let rule = ShippingRule::new(ALL_STATES, 1, u32::MAX, Decimal::from(12), CostType::Every3);
        assert_eq!(rule.charge(7), Decimal::from(36));
    }

    #[test]
    fn test_overlap_detection() {
        let mut rules = default_rules();
        assert!(overlapping_rules(&rules).is_empty());
        rules.push(ShippingRule::new(ALL_STATES, 4, 8, Decimal::from(10), CostType::Fixed));
        rules.push(ShippingRule::new("Kerala", 4, 8, Decimal::from(10), CostType::Fixed));
        assert_eq!(overlapping_rules(&rules), vec![(0, 2), (1, 2)]);
    }
}
