//! Cart Aggregate
//!
//! The storefront keeps the bag on the client. Quotes and orders send the
//! lines back and the server rebuilds a `Cart` from them to price it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use crate::domain::shipping::calculator::CartLineItem;
use crate::domain::value_objects::{Money, MoneyError};

/// Most pieces one cart line may carry.
pub const MAX_LINE_QUANTITY: u32 = 10_000;

#[derive(Clone, Debug)]
pub struct Cart {
    items: Vec<CartItem>,
    currency: String,
}

/// A product in the bag. One line per (product, size).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: i64,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub sub_category: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub discount_price: Option<Decimal>,
    pub quantity: u32,
    #[serde(default)]
    pub selected_size: Option<String>,
}

impl CartItem {
    /// Discount price when one is set, list price otherwise.
    pub fn unit_price(&self) -> Decimal {
        self.discount_price.filter(|p| *p > Decimal::ZERO).unwrap_or(self.price)
    }
    pub fn line_total(&self, currency: &str) -> Result<Money, MoneyError> {
        Money::new(self.unit_price(), currency).multiply(self.quantity)
    }
    fn same_line(&self, other: &CartItem) -> bool {
        self.product_id == other.product_id && self.selected_size == other.selected_size
    }
}

impl Cart {
    pub fn new(currency: &str) -> Self {
        Self { items: vec![], currency: currency.to_string() }
    }

    /// Rebuild a cart from client-held lines, merging duplicates.
    ///
    /// Fails when a merged line holds more than [`MAX_LINE_QUANTITY`] pieces.
    pub fn from_items(currency: &str, items: impl IntoIterator<Item = CartItem>) -> Result<Self, CartError> {
        let mut cart = Self::new(currency);
        for item in items { cart.add_item(item); }
        if let Some(line) = cart.items.iter().find(|i| i.quantity > MAX_LINE_QUANTITY) {
            return Err(CartError::QuantityTooLarge { product_id: line.product_id });
        }
        Ok(cart)
    }

    pub fn currency(&self) -> &str { &self.currency }
    pub fn items(&self) -> &[CartItem] { &self.items }
    pub fn item_count(&self) -> u64 { self.items.iter().map(|i| u64::from(i.quantity)).sum() }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }

    pub fn add_item(&mut self, item: CartItem) {
        if item.quantity == 0 { return; }
        if let Some(existing) = self.items.iter_mut().find(|i| i.same_line(&item)) {
            existing.quantity = existing.quantity.saturating_add(item.quantity);
        } else {
            self.items.push(item);
        }
    }

    pub fn subtotal(&self) -> Result<Money, CartError> {
        self.items.iter().try_fold(Money::zero(&self.currency), |acc, i| {
            i.line_total(&self.currency).and_then(|line| acc.add(&line)).map_err(|_| CartError::AmountOverflow)
        })
    }

    /// What the shipping calculator needs to know about this cart.
    pub fn shipping_lines(&self) -> Vec<CartLineItem> {
        self.items.iter().map(|i| CartLineItem::new(i.category.clone(), i.sub_category.as_deref(), i.quantity)).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartError { QuantityTooLarge { product_id: i64 }, AmountOverflow }
impl std::error::Error for CartError {}
impl std::fmt::Display for CartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::QuantityTooLarge { product_id } => write!(f, "Quantity for product {} exceeds {}", product_id, MAX_LINE_QUANTITY),
            Self::AmountOverflow => write!(f, "Cart amount out of range"),
        }
    }
}
