//! Shipping cost calculator
//!
//! Pure function of the cart lines, the destination state and a [`RuleLookup`].
//! It has no failure mode: a group that no rule governs is charged the
//! policy's fallback cost so checkout can always proceed.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::classify::{classify, ShippingGroup};
use super::states::{ALL_STATES, OTHER_STATES};
use super::{RuleLookup, ShippingRule};

pub const DEFAULT_HOME_STATE: &str = "Tamil Nadu";
pub const DEFAULT_FALLBACK_COST: i64 = 50;

/// Store-wide shipping parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShippingPolicy {
    /// State the store ships from; gets the local Pranjul rates and skips "Other States" rules.
    pub home_state: String,
    /// Charged per group when no rule applies.
    pub fallback_cost: Decimal,
}

impl Default for ShippingPolicy {
    fn default() -> Self {
        Self { home_state: DEFAULT_HOME_STATE.to_string(), fallback_cost: Decimal::from(DEFAULT_FALLBACK_COST) }
    }
}

/// The fields of a cart line the calculator looks at.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    pub category: String,
    #[serde(default)]
    pub sub_category: Option<String>,
    pub quantity: u32,
}

impl CartLineItem {
    pub fn new(category: impl Into<String>, sub_category: Option<&str>, quantity: u32) -> Self {
        Self { category: category.into(), sub_category: sub_category.map(str::to_string), quantity }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingComputationInput {
    pub items: Vec<CartLineItem>,
    pub destination_state: String,
}

/// Where a group's charge came from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "rule", rename_all = "snake_case")]
pub enum ChargeBasis {
    SpecialFormula,
    Rule(ShippingRule),
    Fallback,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingCharge {
    pub group: ShippingGroup,
    pub quantity: u32,
    pub cost: Decimal,
    pub basis: ChargeBasis,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingComputationResult {
    pub total_shipping_cost: Decimal,
    pub breakdown: Vec<ShippingCharge>,
}

#[derive(Clone, Debug, Default)]
pub struct ShippingCostCalculator {
    policy: ShippingPolicy,
}

impl ShippingCostCalculator {
    pub fn new(policy: ShippingPolicy) -> Self { Self { policy } }
    pub fn policy(&self) -> &ShippingPolicy { &self.policy }

    pub fn calculate<L: RuleLookup + ?Sized>(&self, input: &ShippingComputationInput, rules: &L) -> ShippingComputationResult {
        let destination = input.destination_state.as_str();
        let breakdown: Vec<ShippingCharge> = group_quantities(&input.items)
            .into_iter()
            .map(|(group, quantity)| self.charge_group(group, quantity, destination, rules))
            .collect();
        let total_shipping_cost = breakdown.iter()
            .fold(Decimal::ZERO, |acc, c| acc.checked_add(c.cost).unwrap_or(Decimal::MAX));
        ShippingComputationResult { total_shipping_cost, breakdown }
    }

    fn charge_group<L: RuleLookup + ?Sized>(&self, group: ShippingGroup, quantity: u32, destination: &str, rules: &L) -> ShippingCharge {
        let (cost, basis) = match &group {
            ShippingGroup::PranjulNighty => (self.nighty_cost(quantity, destination), ChargeBasis::SpecialFormula),
            ShippingGroup::PranjulCollection => (self.collection_cost(quantity, destination), ChargeBasis::SpecialFormula),
            ShippingGroup::Generic(category) => {
                let rule = rules.rules_for(category).and_then(|r| self.match_rule(r, quantity, destination));
                match rule {
                    Some(rule) => {
                        tracing::debug!(%category, quantity, state = %rule.state, "shipping rule matched");
                        (rule.charge(quantity), ChargeBasis::Rule(rule.clone()))
                    }
                    None => {
                        tracing::warn!(%category, quantity, destination, "no shipping rule applies, charging fallback");
                        (self.policy.fallback_cost, ChargeBasis::Fallback)
                    }
                }
            }
        };
        ShippingCharge { group, quantity, cost, basis }
    }

    fn is_home(&self, destination: &str) -> bool { destination == self.policy.home_state }

    fn nighty_cost(&self, quantity: u32, destination: &str) -> Decimal {
        if self.is_home(destination) {
            if quantity >= 3 { Decimal::ZERO } else { Decimal::from(30) }
        } else if quantity <= 4 {
            Decimal::from(45)
        } else {
            Decimal::from(45) + Decimal::from(quantity - 4) * Decimal::from(10)
        }
    }

    fn collection_cost(&self, quantity: u32, destination: &str) -> Decimal {
        let extra = Decimal::from(quantity.saturating_sub(1));
        if self.is_home(destination) {
            Decimal::from(40) + extra * Decimal::from(20)
        } else {
            Decimal::from(65) + extra * Decimal::from(25)
        }
    }

    /// Rule states to try, most specific first.
    fn match_tiers<'a>(&'a self, destination: &'a str) -> Vec<&'a str> {
        let mut tiers = vec![destination];
        if !self.is_home(destination) {
            tiers.push(OTHER_STATES);
        }
        tiers.push(ALL_STATES);
        tiers
    }

    /// First rule hit by the tier cascade. Within a tier, stored order decides.
    pub fn match_rule<'r>(&self, rules: &'r [ShippingRule], quantity: u32, destination: &str) -> Option<&'r ShippingRule> {
        self.match_tiers(destination)
            .into_iter()
            .find_map(|state| rules.iter().find(|r| r.state == state && r.covers(quantity)))
    }
}

/// Sum quantities per shipping group, saturating at `u32::MAX`. Empty lines
/// ship nothing and are skipped.
fn group_quantities(items: &[CartLineItem]) -> BTreeMap<ShippingGroup, u32> {
    let mut groups = BTreeMap::new();
    for item in items.iter().filter(|i| i.quantity > 0) {
        let group = classify(&item.category, item.sub_category.as_deref());
        let total = groups.entry(group).or_insert(0u32);
        *total = total.saturating_add(item.quantity);
    }
    groups
}
