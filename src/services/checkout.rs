//! Checkout and order service
//!
//! Prices carts (subtotal, tax, shipping), places orders and applies order
//! lifecycle changes. Each pricing call reads one rule snapshot, so a quote and
//! the order placed after it may differ if an administrator edits shipping in
//! between.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::config::AppConfig;
use crate::domain::aggregates::order::next_order_id;
use crate::domain::aggregates::{
    Address, Cart, CartError, CartItem, NewOrder, Order, OrderError, OrderPricing, OrderStatus, PaymentMethod,
    PaymentOutcome, MAX_LINE_QUANTITY,
};
use crate::domain::shipping::calculator::CartLineItem;
use crate::domain::shipping::{
    is_rule_state, RuleLookup, ShippingCharge, ShippingComputationInput, ShippingComputationResult,
    ShippingCostCalculator,
};
use crate::domain::value_objects::Money;
use crate::publisher::EventPublisher;
use crate::storage::Storage;
use crate::{EcommerceError, Result};

/// Fresh ids tried before giving up on placing an order.
const ORDER_ID_ATTEMPTS: usize = 5;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub items: Vec<CartItem>,
    pub destination_state: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    #[serde(default)]
    pub customer_id: Option<String>,
    pub items: Vec<CartItem>,
    pub billing_details: Address,
    /// Ships to the billing address when omitted.
    #[serde(default)]
    pub shipping_details: Option<Address>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutQuote {
    pub currency: String,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
    pub shipping_breakdown: Vec<ShippingCharge>,
}

#[derive(Clone)]
pub struct CheckoutService {
    storage: Storage,
    publisher: EventPublisher,
    calculator: ShippingCostCalculator,
    tax_rate: Decimal,
    currency: String,
}

impl CheckoutService {
    pub fn new(storage: Storage, publisher: EventPublisher, config: &AppConfig) -> Self {
        Self {
            storage, publisher,
            calculator: ShippingCostCalculator::new(config.shipping.clone()),
            tax_rate: config.tax_rate,
            currency: config.currency.clone(),
        }
    }

    /// Shipping only, for the address step of checkout.
    pub async fn shipping_quote(&self, input: &ShippingComputationInput) -> Result<ShippingComputationResult> {
        check_destination(&input.destination_state)?;
        check_lines(&input.items)?;
        let rules = self.storage.rule_snapshot().await?;
        Ok(self.calculator.calculate(input, &rules))
    }

    pub async fn quote(&self, req: QuoteRequest) -> Result<CheckoutQuote> {
        let cart = self.cart_from(req.items)?;
        check_destination(&req.destination_state)?;
        let rules = self.storage.rule_snapshot().await?;
        let (pricing, shipping) = self.price(&cart, &req.destination_state, &rules)?;
        let total = pricing.subtotal.add(&pricing.shipping).and_then(|t| t.add(&pricing.tax)).map_err(|_| CartError::AmountOverflow)?;
        Ok(CheckoutQuote {
            currency: self.currency.clone(),
            subtotal: pricing.subtotal.rounded().amount(),
            tax: pricing.tax.rounded().amount(),
            shipping: pricing.shipping.rounded().amount(),
            total: total.rounded().amount(),
            shipping_breakdown: shipping.breakdown,
        })
    }

    /// Subtotal, tax and shipping for `cart` delivered to `state`.
    pub fn price<L: RuleLookup + ?Sized>(&self, cart: &Cart, state: &str, rules: &L) -> Result<(OrderPricing, ShippingComputationResult)> {
        let input = ShippingComputationInput { items: cart.shipping_lines(), destination_state: state.to_string() };
        let shipping = self.calculator.calculate(&input, rules);
        let subtotal = cart.subtotal()?;
        let pricing = OrderPricing {
            tax: subtotal.percent(self.tax_rate).map_err(|_| CartError::AmountOverflow)?,
            shipping: Money::new(shipping.total_shipping_cost, &self.currency),
            subtotal,
        };
        Ok((pricing, shipping))
    }

    pub async fn place_order(&self, req: PlaceOrderRequest) -> Result<Order> {
        self.place_order_with(req, next_order_id).await
    }

    /// Once the order row is written the request succeeds. Stock and event
    /// failures after that point are logged.
    async fn place_order_with(&self, req: PlaceOrderRequest, mut next_id: impl FnMut() -> String) -> Result<Order> {
        req.billing_details.validate()?;
        let shipping_address = req.shipping_details.unwrap_or_else(|| req.billing_details.clone());
        shipping_address.validate()?;
        check_destination(&shipping_address.state)?;

        let customer_id = req.customer_id.unwrap_or_else(|| "guest".to_string());
        let cart = self.cart_from(req.items)?;
        let rules = self.storage.rule_snapshot().await?;
        let (pricing, shipping) = self.price(&cart, &shipping_address.state, &rules)?;

        let mut new = NewOrder {
            id: String::new(), customer_id, payment_method: req.payment_method,
            items: cart.items().to_vec(), billing: req.billing_details, shipping: shipping_address, notes: req.notes,
        };
        let mut placed = None;
        for attempt in 1..=ORDER_ID_ATTEMPTS {
            new.id = next_id();
            let mut order = Order::place(new.clone(), pricing.clone())?;
            let events = order.take_events();
            match self.storage.insert_order(order.clone()).await {
                Ok(()) => { placed = Some((order, events)); break; }
                Err(EcommerceError::DuplicateOrderId(id)) => tracing::warn!(order_id = %id, attempt, "order id taken, drawing another"),
                Err(e) => return Err(e),
            }
        }
        let Some((order, events)) = placed else {
            return Err(EcommerceError::StorageError("no free order id".to_string()));
        };
        tracing::info!(order_id = %order.id(), total = %order.total(), shipping = %shipping.total_shipping_cost, state = %order.shipping_details().state, "order placed");

        self.publisher.publish(events).await;
        self.deduct_stock(order.id(), cart.items()).await;
        Ok(order)
    }

    async fn deduct_stock(&self, order_id: &str, items: &[CartItem]) {
        for item in items {
            match self.storage.deduct_stock(item.product_id, item.selected_size.as_deref(), item.quantity).await {
                Ok(Some(events)) => self.publisher.publish(events).await,
                Ok(None) => tracing::debug!(product_id = item.product_id, "ordered product not in catalog, stock unchanged"),
                Err(e) => tracing::warn!(%order_id, product_id = item.product_id, error = %e, "stock not deducted"),
            }
        }
    }

    pub async fn list_orders(&self) -> Result<Vec<Order>> { self.storage.list_orders().await }

    pub async fn get_order(&self, id: &str) -> Result<Order> {
        self.storage.get_order(id).await?.ok_or_else(|| EcommerceError::OrderNotFound(id.to_string()))
    }

    pub async fn delete_order(&self, id: &str) -> Result<()> {
        self.storage.delete_order(id).await?;
        tracing::info!(order_id = %id, "order deleted");
        Ok(())
    }

    /// Gateway callback: a successful payment moves the order to processing.
    pub async fn record_payment(&self, id: &str, outcome: PaymentOutcome) -> Result<Order> {
        self.update(id, |order| order.record_payment(outcome)).await
    }

    pub async fn set_status(&self, id: &str, status: OrderStatus) -> Result<Order> {
        self.update(id, |order| order.set_status(status)).await
    }

    pub async fn cancel(&self, id: &str) -> Result<Order> {
        self.update(id, Order::cancel).await
    }

    async fn update(&self, id: &str, change: impl FnOnce(&mut Order) -> std::result::Result<(), OrderError>) -> Result<Order> {
        let mut order = self.get_order(id).await?;
        change(&mut order)?;
        let events = order.take_events();
        self.storage.save_order(order.clone()).await?;
        tracing::info!(order_id = %id, status = order.status().as_str(), "order updated");
        self.publisher.publish(events).await;
        Ok(order)
    }

    fn cart_from(&self, items: Vec<CartItem>) -> Result<Cart> {
        if items.is_empty() { return Err(EcommerceError::EmptyCart); }
        if items.iter().any(|i| !valid_quantity(i.quantity) || i.price.is_sign_negative()) { return Err(EcommerceError::InvalidQuantity); }
        Ok(Cart::from_items(&self.currency, items)?)
    }
}

fn valid_quantity(qty: u32) -> bool { (1..=MAX_LINE_QUANTITY).contains(&qty) }

/// Any of the 36 states, or a rule sentinel (priced by the matching tier).
fn check_destination(state: &str) -> Result<()> {
    if is_rule_state(state) { Ok(()) } else { Err(EcommerceError::UnknownState(state.to_string())) }
}

fn check_lines(items: &[CartLineItem]) -> Result<()> {
    if items.is_empty() { return Err(EcommerceError::EmptyCart); }
    if items.iter().any(|i| !valid_quantity(i.quantity)) { return Err(EcommerceError::InvalidQuantity); }
    Ok(())
}
