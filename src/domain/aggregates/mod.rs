//! Aggregates module
pub mod category;
pub mod product;
pub mod order;
pub mod cart;
pub mod review;

pub use category::{seed_categories, Category, CategoryError};
pub use product::Product;
pub use order::{Address, NewOrder, Order, OrderError, OrderPricing, OrderStatus, PaymentMethod, PaymentOutcome};
pub use cart::{Cart, CartError, CartItem, MAX_LINE_QUANTITY};
pub use review::{NewReview, Review};
