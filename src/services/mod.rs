//! Application services sitting between the HTTP layer and storage.

pub mod catalog;
pub mod checkout;

pub use catalog::{BulkDelete, BulkDeleted, CatalogService, CreateCategory, CreateProduct, UpdateCategory};
pub use checkout::{CheckoutQuote, CheckoutService, PlaceOrderRequest, QuoteRequest};
