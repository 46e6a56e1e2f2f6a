//! Product Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use crate::domain::events::{DomainEvent, ProductEvent};
use crate::domain::value_objects::Quantity;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    id: i64,
    name: String,
    category: String,
    sub_category: Option<String>,
    price: Decimal,
    discount_price: Option<Decimal>,
    stock: Quantity,
    /// Stock per size label ("S", "M", ...). Empty for unsized products.
    size_stock: BTreeMap<String, u32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

impl Product {
    pub fn create(id: i64, name: impl Into<String>, category: impl Into<String>, sub_category: Option<&str>, price: Decimal) -> Self {
        let now = Utc::now();
        Self {
            id, name: name.into(), category: category.into(), sub_category: sub_category.map(str::to_string),
            price, discount_price: None, stock: Quantity::default(), size_stock: BTreeMap::new(),
            created_at: now, updated_at: now, events: vec![],
        }
    }

    pub fn id(&self) -> i64 { self.id }
    pub fn name(&self) -> &str { &self.name }
    pub fn category(&self) -> &str { &self.category }
    pub fn sub_category(&self) -> Option<&str> { self.sub_category.as_deref() }
    pub fn stock(&self) -> u32 { self.stock.value() }
    pub fn size_stock(&self) -> &BTreeMap<String, u32> { &self.size_stock }

    /// Price a shopper pays per piece.
    pub fn selling_price(&self) -> Decimal {
        self.discount_price.filter(|p| *p > Decimal::ZERO).unwrap_or(self.price)
    }

    pub fn set_discount_price(&mut self, price: Option<Decimal>) { self.discount_price = price; self.touch(); }

    /// Move the product to another category, e.g. after a category rename.
    pub fn recategorize(&mut self, category: impl Into<String>) { self.category = category.into(); self.touch(); }

    pub fn set_stock(&mut self, qty: u32) {
        self.size_stock.clear();
        self.stock = Quantity::new(qty);
        self.touch();
    }

    /// Replace per-size stock; total stock becomes the sum.
    pub fn set_size_stock(&mut self, sizes: BTreeMap<String, u32>) {
        self.stock = Quantity::new(total_stock(&sizes));
        self.size_stock = sizes;
        self.touch();
    }

    /// Take sold pieces out of stock, clamping at zero.
    ///
    /// With per-size stock, only the named size is reduced and the total is
    /// re-summed; a size that isn't tracked leaves stock unchanged.
    pub fn deduct_stock(&mut self, size: Option<&str>, qty: u32) {
        if self.size_stock.is_empty() {
            self.stock = self.stock.deduct(qty);
        } else {
            if let Some(level) = size.and_then(|s| self.size_stock.get_mut(s)) {
                *level = level.saturating_sub(qty);
            }
            self.stock = Quantity::new(total_stock(&self.size_stock));
        }
        self.touch();
        self.raise_event(DomainEvent::Product(ProductEvent::StockDeducted {
            product_id: self.id.to_string(), size: size.map(str::to_string), quantity: qty, remaining: self.stock.value(),
        }));
        if self.stock.is_zero() {
            self.raise_event(DomainEvent::Product(ProductEvent::OutOfStock { product_id: self.id.to_string() }));
        }
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
    fn touch(&mut self) { self.updated_at = Utc::now(); }
}

fn total_stock(sizes: &BTreeMap<String, u32>) -> u32 {
    sizes.values().fold(0u32, |acc, n| acc.saturating_add(*n))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kurti() -> Product { Product::create(7, "Nyra Cut Kurti", "Kurtis Collections", Some("Nyra Cut Kurti"), Decimal::new(899, 0)) }

    #[test]
    fn test_flat_stock_clamps_at_zero() {
        let mut p = kurti();
        p.set_stock(3);
        p.deduct_stock(None, 5);
        assert_eq!(p.stock(), 0);
        let events = p.take_events();
        assert!(matches!(events.last(), Some(DomainEvent::Product(ProductEvent::OutOfStock { .. }))));
    }

    #[test]
    fn test_size_stock_deduction() {
        let mut p = kurti();
        p.set_size_stock(BTreeMap::from([("M".to_string(), 4), ("L".to_string(), 2)]));
        assert_eq!(p.stock(), 6);
        p.deduct_stock(Some("M"), 3);
        assert_eq!(p.size_stock()["M"], 1);
        assert_eq!(p.stock(), 3);
        p.deduct_stock(Some("XXL"), 1);
        assert_eq!(p.stock(), 3);
    }

    #[test]
    fn test_large_size_stock_saturates() {
        let mut p = kurti();
        p.set_size_stock(BTreeMap::from([("M".to_string(), u32::MAX), ("L".to_string(), 10)]));
        assert_eq!(p.stock(), u32::MAX);
        p.deduct_stock(Some("L"), 4);
        assert_eq!(p.stock(), u32::MAX);
        assert_eq!(p.size_stock()["L"], 6);
    }

    #[test]
    fn test_selling_price() {
        let mut p = kurti();
        assert_eq!(p.selling_price(), Decimal::new(899, 0));
        p.set_discount_price(Some(Decimal::new(699, 0)));
        assert_eq!(p.selling_price(), Decimal::new(699, 0));
    }
}
