//! Domain events
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "aggregate", content = "event", rename_all = "snake_case")]
pub enum DomainEvent {
    Product(ProductEvent),
    Order(OrderEvent),
}

impl DomainEvent {
    /// Subject suffix for publishing, e.g. `orders.placed`.
    pub fn subject(&self) -> String {
        match self {
            Self::Product(e) => format!("products.{}", e.kind()),
            Self::Order(e) => format!("orders.{}", e.kind()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProductEvent {
    StockDeducted { product_id: String, size: Option<String>, quantity: u32, remaining: u32 },
    OutOfStock { product_id: String },
}

impl ProductEvent {
    fn kind(&self) -> &'static str {
        match self { Self::StockDeducted { .. } => "stock_deducted", Self::OutOfStock { .. } => "out_of_stock" }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrderEvent {
    Placed { order_id: String, customer_id: String, total: Decimal, shipping: Decimal },
    Paid { order_id: String },
    PaymentFailed { order_id: String },
    StatusChanged { order_id: String, status: String },
    Cancelled { order_id: String },
}

impl OrderEvent {
    fn kind(&self) -> &'static str {
        match self {
            Self::Placed { .. } => "placed",
            Self::Paid { .. } => "paid",
            Self::PaymentFailed { .. } => "payment_failed",
            Self::StatusChanged { .. } => "status_changed",
            Self::Cancelled { .. } => "cancelled",
        }
    }
}
