//! Neela Fashion storefront service
//!
//! Back end for a fashion storefront and its back office.
//!
//! ## Features
//! - Catalog categories with per-state, quantity-tiered shipping tables
//! - Shipping cost engine with the Pranjul special-case formulas
//! - Cart pricing (subtotal, tax, shipping) and checkout
//! - Order lifecycle with payment outcomes and stock deduction
//! - Product reviews
//! - In-memory or Postgres storage, optional NATS event publishing

pub mod api;
pub mod config;
pub mod domain;
pub mod publisher;
pub mod services;
pub mod storage;

use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use thiserror::Error;

use crate::domain::aggregates::{CartError, CategoryError, OrderError};

pub use api::{build_router, AppState};
pub use config::AppConfig;
pub use domain::shipping::{
    CostType, RuleLookup, RuleSnapshot, ShippingComputationInput, ShippingComputationResult,
    ShippingCostCalculator, ShippingPolicy, ShippingRule,
};
pub use storage::Storage;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum EcommerceError {
    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    #[error("Category already exists: {0}")]
    CategoryExists(String),

    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Order id already taken: {0}")]
    DuplicateOrderId(String),

    #[error("Review not found: {0}")]
    ReviewNotFound(i64),

    #[error("Unknown destination state: {0}")]
    UnknownState(String),

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Invalid quantity")]
    InvalidQuantity,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Category(#[from] CategoryError),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    StorageError(String),
}

impl From<sqlx::Error> for EcommerceError {
    fn from(e: sqlx::Error) -> Self { Self::StorageError(e.to_string()) }
}

impl From<sqlx::migrate::MigrateError> for EcommerceError {
    fn from(e: sqlx::migrate::MigrateError) -> Self { Self::StorageError(e.to_string()) }
}

impl From<CartError> for EcommerceError {
    fn from(e: CartError) -> Self {
        match e {
            CartError::QuantityTooLarge { .. } => Self::InvalidQuantity,
            CartError::AmountOverflow => Self::InvalidRequest(e.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for EcommerceError {
    fn from(e: validator::ValidationErrors) -> Self { Self::InvalidRequest(e.to_string()) }
}

impl EcommerceError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::CategoryNotFound(_) | Self::ProductNotFound(_) | Self::OrderNotFound(_) | Self::ReviewNotFound(_) => StatusCode::NOT_FOUND,
            Self::CategoryExists(_) | Self::DuplicateOrderId(_) => StatusCode::CONFLICT,
            Self::Order(OrderError::CannotCancel | OrderError::InvalidTransition { .. }) => StatusCode::CONFLICT,
            Self::UnknownState(_) | Self::EmptyCart | Self::InvalidQuantity | Self::InvalidRequest(_)
            | Self::Category(_) | Self::Order(_) => StatusCode::BAD_REQUEST,
            Self::Config(_) | Self::StorageError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for EcommerceError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, EcommerceError>;
