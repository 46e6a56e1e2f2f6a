//! In-memory storage, used when no database is configured and in tests.

use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::domain::aggregates::{Category, NewReview, Order, Product, Review};
use crate::domain::events::DomainEvent;
use crate::{EcommerceError, Result};

#[derive(Default)]
struct Inner {
    categories: Vec<Category>,
    products: BTreeMap<i64, Product>,
    orders: Vec<Order>,
    reviews: Vec<Review>,
    last_review_id: i64,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }

    pub async fn list_categories(&self) -> Vec<Category> {
        self.inner.read().await.categories.clone()
    }

    pub async fn get_category(&self, name: &str) -> Option<Category> {
        self.inner.read().await.categories.iter().find(|c| c.name() == name).cloned()
    }

    pub async fn insert_category(&self, category: Category) -> Result<()> {
        let mut inner = self.inner.write().await;
        if inner.categories.iter().any(|c| c.name() == category.name()) {
            return Err(EcommerceError::CategoryExists(category.name().to_string()));
        }
        inner.categories.push(category);
        Ok(())
    }

    /// Store `category` in place of `previous_name`, moving products along on rename.
    pub async fn replace_category(&self, previous_name: &str, category: Category) -> Result<()> {
        let mut inner = self.inner.write().await;
        let renamed = previous_name != category.name();
        if renamed && inner.categories.iter().any(|c| c.name() == category.name()) {
            return Err(EcommerceError::CategoryExists(category.name().to_string()));
        }
        let slot = inner.categories.iter_mut().find(|c| c.name() == previous_name)
            .ok_or_else(|| EcommerceError::CategoryNotFound(previous_name.to_string()))?;
        let new_name = category.name().to_string();
        *slot = category;
        if renamed {
            for product in inner.products.values_mut().filter(|p| p.category() == previous_name) {
                product.recategorize(new_name.clone());
            }
        }
        Ok(())
    }

    pub async fn delete_category(&self, name: &str) -> Result<()> {
        let mut inner = self.inner.write().await;
        let before = inner.categories.len();
        inner.categories.retain(|c| c.name() != name);
        if inner.categories.len() == before { return Err(EcommerceError::CategoryNotFound(name.to_string())); }
        Ok(())
    }

    pub async fn seed_categories(&self, categories: Vec<Category>) -> bool {
        let mut inner = self.inner.write().await;
        if !inner.categories.is_empty() { return false; }
        inner.categories = categories;
        true
    }

    pub async fn list_products(&self) -> Vec<Product> {
        self.inner.read().await.products.values().cloned().collect()
    }

    pub async fn get_product(&self, id: i64) -> Option<Product> {
        self.inner.read().await.products.get(&id).cloned()
    }

    pub async fn save_product(&self, product: Product) {
        self.inner.write().await.products.insert(product.id(), product);
    }

    /// Deduct under the write lock so concurrent orders both count.
    /// `None` when the product is not in the catalog.
    pub async fn deduct_stock(&self, id: i64, size: Option<&str>, qty: u32) -> Option<Vec<DomainEvent>> {
        let mut inner = self.inner.write().await;
        let product = inner.products.get_mut(&id)?;
        product.deduct_stock(size, qty);
        Some(product.take_events())
    }

    pub async fn delete_product(&self, id: i64) -> Result<()> {
        self.inner.write().await.products.remove(&id).map(|_| ()).ok_or(EcommerceError::ProductNotFound(id))
    }

    pub async fn delete_products(&self, ids: &[i64]) -> u64 {
        let mut inner = self.inner.write().await;
        ids.iter().filter(|id| inner.products.remove(*id).is_some()).count() as u64
    }

    pub async fn insert_order(&self, order: Order) -> Result<()> {
        let mut inner = self.inner.write().await;
        if inner.orders.iter().any(|o| o.id() == order.id()) {
            return Err(EcommerceError::DuplicateOrderId(order.id().to_string()));
        }
        inner.orders.push(order);
        Ok(())
    }

    pub async fn delete_order(&self, id: &str) -> Result<()> {
        let mut inner = self.inner.write().await;
        let before = inner.orders.len();
        inner.orders.retain(|o| o.id() != id);
        if inner.orders.len() == before { return Err(EcommerceError::OrderNotFound(id.to_string())); }
        Ok(())
    }

    pub async fn save_order(&self, order: Order) -> Result<()> {
        let mut inner = self.inner.write().await;
        let slot = inner.orders.iter_mut().find(|o| o.id() == order.id())
            .ok_or_else(|| EcommerceError::OrderNotFound(order.id().to_string()))?;
        *slot = order;
        Ok(())
    }

    pub async fn get_order(&self, id: &str) -> Option<Order> {
        self.inner.read().await.orders.iter().find(|o| o.id() == id).cloned()
    }

    /// Newest first.
    pub async fn list_orders(&self) -> Vec<Order> {
        let mut orders = self.inner.read().await.orders.clone();
        orders.reverse();
        orders.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        orders
    }

    /// Newest first.
    pub async fn list_reviews(&self) -> Vec<Review> {
        self.inner.read().await.reviews.iter().rev().cloned().collect()
    }

    pub async fn insert_review(&self, new: NewReview) -> Review {
        let mut inner = self.inner.write().await;
        inner.last_review_id += 1;
        let review = Review::create(inner.last_review_id, new);
        inner.reviews.push(review.clone());
        review
    }

    pub async fn delete_review(&self, id: i64) -> Result<()> {
        let mut inner = self.inner.write().await;
        let before = inner.reviews.len();
        inner.reviews.retain(|r| r.id() != id);
        if inner.reviews.len() == before { return Err(EcommerceError::ReviewNotFound(id)); }
        Ok(())
    }
}
