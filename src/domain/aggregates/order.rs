//! Order Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;
use crate::domain::aggregates::cart::CartItem;
use crate::domain::events::{DomainEvent, OrderEvent};
use crate::domain::value_objects::{Money, MoneyError};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    id: String,
    customer_id: String,
    customer_name: String,
    status: OrderStatus,
    payment_method: PaymentMethod,
    items: Vec<CartItem>,
    subtotal: Money,
    shipping: Money,
    tax: Money,
    total: Money,
    billing_details: Address,
    shipping_details: Address,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

/// Postal details captured at checkout. `state` drives shipping.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[validate(length(min = 1))] pub first_name: String,
    #[serde(default)] pub last_name: String,
    #[validate(email)] pub email: String,
    #[validate(length(min = 6, max = 15))] pub phone: String,
    #[validate(length(min = 1))] pub address: String,
    #[validate(length(min = 1))] pub city: String,
    #[serde(default)] pub district: String,
    #[validate(length(min = 1))] pub state: String,
    #[validate(length(min = 6, max = 6))] pub pincode: String,
}

impl Address {
    pub fn full_name(&self) -> String { format!("{} {}", self.first_name, self.last_name).trim().to_string() }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    #[default] Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    #[serde(rename = "Payment Failed")] PaymentFailed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending", Self::Processing => "Processing", Self::Shipped => "Shipped",
            Self::Delivered => "Delivered", Self::Cancelled => "Cancelled", Self::PaymentFailed => "Payment Failed",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod { #[default] Prepaid, #[serde(rename = "COD")] Cod }

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentOutcome { Success, Failure }

/// Amounts an order is created with. Computed by checkout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderPricing { pub subtotal: Money, pub shipping: Money, pub tax: Money }

#[derive(Clone, Debug)]
pub struct NewOrder {
    pub id: String,
    pub customer_id: String,
    pub payment_method: PaymentMethod,
    pub items: Vec<CartItem>,
    pub billing: Address,
    pub shipping: Address,
    pub notes: Option<String>,
}

impl Order {
    pub fn place(new: NewOrder, pricing: OrderPricing) -> Result<Self, OrderError> {
        if new.items.is_empty() { return Err(OrderError::NoItems); }
        let now = Utc::now();
        let total = Money::zero(pricing.subtotal.currency());
        let mut order = Self {
            id: new.id, customer_id: new.customer_id, customer_name: new.billing.full_name(),
            status: OrderStatus::Pending, payment_method: new.payment_method, items: new.items,
            subtotal: pricing.subtotal, shipping: pricing.shipping, tax: pricing.tax, total,
            billing_details: new.billing, shipping_details: new.shipping, notes: new.notes,
            created_at: now, updated_at: now, events: vec![],
        };
        order.recalculate()?;
        order.raise_event(DomainEvent::Order(OrderEvent::Placed {
            order_id: order.id.clone(), customer_id: order.customer_id.clone(),
            total: order.total.amount(), shipping: order.shipping.amount(),
        }));
        Ok(order)
    }

    pub fn id(&self) -> &str { &self.id }
    pub fn customer_id(&self) -> &str { &self.customer_id }
    pub fn status(&self) -> OrderStatus { self.status }
    pub fn payment_method(&self) -> PaymentMethod { self.payment_method }
    pub fn items(&self) -> &[CartItem] { &self.items }
    pub fn subtotal(&self) -> &Money { &self.subtotal }
    pub fn shipping(&self) -> &Money { &self.shipping }
    pub fn tax(&self) -> &Money { &self.tax }
    pub fn total(&self) -> &Money { &self.total }
    pub fn shipping_details(&self) -> &Address { &self.shipping_details }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }

    pub fn record_payment(&mut self, outcome: PaymentOutcome) -> Result<(), OrderError> {
        if !matches!(self.status, OrderStatus::Pending | OrderStatus::PaymentFailed) {
            return Err(OrderError::InvalidTransition { from: self.status, to: OrderStatus::Processing });
        }
        let event = match outcome {
            PaymentOutcome::Success => {
                self.status = OrderStatus::Processing;
                self.payment_method = PaymentMethod::Prepaid;
                OrderEvent::Paid { order_id: self.id.clone() }
            }
            PaymentOutcome::Failure => {
                self.status = OrderStatus::PaymentFailed;
                OrderEvent::PaymentFailed { order_id: self.id.clone() }
            }
        };
        self.touch();
        self.raise_event(DomainEvent::Order(event));
        Ok(())
    }

    /// Back-office status change.
    pub fn set_status(&mut self, status: OrderStatus) -> Result<(), OrderError> {
        if status == OrderStatus::Cancelled { return self.cancel(); }
        self.status = status;
        self.touch();
        self.raise_event(DomainEvent::Order(OrderEvent::StatusChanged { order_id: self.id.clone(), status: status.as_str().to_string() }));
        Ok(())
    }

    pub fn cancel(&mut self) -> Result<(), OrderError> {
        if self.status == OrderStatus::Delivered { return Err(OrderError::CannotCancel); }
        self.status = OrderStatus::Cancelled;
        self.touch();
        self.raise_event(DomainEvent::Order(OrderEvent::Cancelled { order_id: self.id.clone() }));
        Ok(())
    }

    fn recalculate(&mut self) -> Result<(), OrderError> {
        let total = self.subtotal.add(&self.shipping)?.add(&self.tax)?;
        self.total = total.rounded();
        self.touch();
        Ok(())
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
    fn touch(&mut self) { self.updated_at = Utc::now(); }
}

/// `ORD-` followed by twelve random digits. Callers retry on the rare clash.
pub fn next_order_id() -> String {
    format!("ORD-{:012}", Uuid::new_v4().as_u128() % 1_000_000_000_000)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderError { NoItems, CannotCancel, CurrencyMismatch, AmountOverflow, InvalidTransition { from: OrderStatus, to: OrderStatus } }
impl std::error::Error for OrderError {}
impl std::fmt::Display for OrderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoItems => write!(f, "No items"),
            Self::CannotCancel => write!(f, "Cannot cancel a delivered order"),
            Self::CurrencyMismatch => write!(f, "Currency mismatch"),
            Self::AmountOverflow => write!(f, "Order amount out of range"),
            Self::InvalidTransition { from, to } => write!(f, "Cannot move order from {} to {}", from.as_str(), to.as_str()),
        }
    }
}
impl From<MoneyError> for OrderError {
    fn from(e: MoneyError) -> Self {
        match e {
            MoneyError::CurrencyMismatch => Self::CurrencyMismatch,
            MoneyError::Overflow => Self::AmountOverflow,
        }
    }
}
