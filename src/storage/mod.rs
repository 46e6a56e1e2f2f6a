//! Storage backends
//!
//! [`Storage`] is the only handle services hold. Both backends expose the same
//! operations; the enum keeps call sites free of generics.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use crate::domain::aggregates::{seed_categories, Category, NewReview, Order, Product, Review};
use crate::domain::events::DomainEvent;
use crate::domain::shipping::RuleSnapshot;
use crate::Result;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Clone)]
pub enum Storage {
    Memory(Arc<MemoryStore>),
    Postgres(PgStore),
}

impl Storage {
    pub fn memory() -> Self { Self::Memory(Arc::new(MemoryStore::new())) }

    pub async fn connect(database_url: Option<&str>) -> Result<Self> {
        match database_url {
            Some(url) => {
                let store = PgStore::connect(url).await?;
                tracing::info!("connected to postgres");
                Ok(Self::Postgres(store))
            }
            None => {
                tracing::warn!("DATABASE_URL not set, using in-memory storage");
                Ok(Self::memory())
            }
        }
    }

    pub fn backend(&self) -> &'static str {
        match self { Self::Memory(_) => "memory", Self::Postgres(_) => "postgres" }
    }

    /// Insert the default catalog when no categories exist yet.
    pub async fn seed(&self) -> Result<()> {
        let seeded = match self {
            Self::Memory(m) => m.seed_categories(seed_categories()).await,
            Self::Postgres(p) => p.seed_categories(&seed_categories()).await?,
        };
        if seeded { tracing::info!("default categories seeded"); }
        Ok(())
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        match self {
            Self::Memory(m) => Ok(m.list_categories().await),
            Self::Postgres(p) => p.list_categories().await,
        }
    }

    pub async fn get_category(&self, name: &str) -> Result<Option<Category>> {
        match self {
            Self::Memory(m) => Ok(m.get_category(name).await),
            Self::Postgres(p) => p.get_category(name).await,
        }
    }

    pub async fn insert_category(&self, category: Category) -> Result<()> {
        match self {
            Self::Memory(m) => m.insert_category(category).await,
            Self::Postgres(p) => p.insert_category(&category).await,
        }
    }

    pub async fn replace_category(&self, previous_name: &str, category: Category) -> Result<()> {
        match self {
            Self::Memory(m) => m.replace_category(previous_name, category).await,
            Self::Postgres(p) => p.replace_category(previous_name, &category).await,
        }
    }

    pub async fn delete_category(&self, name: &str) -> Result<()> {
        match self {
            Self::Memory(m) => m.delete_category(name).await,
            Self::Postgres(p) => p.delete_category(name).await,
        }
    }

    /// One consistent read of every category's shipping table.
    pub async fn rule_snapshot(&self) -> Result<RuleSnapshot> {
        let categories = self.list_categories().await?;
        Ok(categories.into_iter().map(|c| (c.name().to_string(), c.shipping_rules().to_vec())).collect())
    }

    pub async fn list_products(&self) -> Result<Vec<Product>> {
        match self {
            Self::Memory(m) => Ok(m.list_products().await),
            Self::Postgres(p) => p.list_products().await,
        }
    }

    pub async fn get_product(&self, id: i64) -> Result<Option<Product>> {
        match self {
            Self::Memory(m) => Ok(m.get_product(id).await),
            Self::Postgres(p) => p.get_product(id).await,
        }
    }

    pub async fn save_product(&self, product: Product) -> Result<()> {
        match self {
            Self::Memory(m) => { m.save_product(product).await; Ok(()) }
            Self::Postgres(p) => p.save_product(&product).await,
        }
    }

    /// Deduct stock atomically. `None` when the product is gone.
    pub async fn deduct_stock(&self, id: i64, size: Option<&str>, qty: u32) -> Result<Option<Vec<DomainEvent>>> {
        match self {
            Self::Memory(m) => Ok(m.deduct_stock(id, size, qty).await),
            Self::Postgres(p) => p.deduct_stock(id, size, qty).await,
        }
    }

    pub async fn delete_product(&self, id: i64) -> Result<()> {
        match self {
            Self::Memory(m) => m.delete_product(id).await,
            Self::Postgres(p) => p.delete_product(id).await,
        }
    }

    /// Returns how many of `ids` existed.
    pub async fn delete_products(&self, ids: &[i64]) -> Result<u64> {
        match self {
            Self::Memory(m) => Ok(m.delete_products(ids).await),
            Self::Postgres(p) => p.delete_products(ids).await,
        }
    }

    /// Fails with `DuplicateOrderId` when the id is taken.
    pub async fn insert_order(&self, order: Order) -> Result<()> {
        match self {
            Self::Memory(m) => m.insert_order(order).await,
            Self::Postgres(p) => p.insert_order(&order).await,
        }
    }

    pub async fn save_order(&self, order: Order) -> Result<()> {
        match self {
            Self::Memory(m) => m.save_order(order).await,
            Self::Postgres(p) => p.save_order(&order).await,
        }
    }

    pub async fn get_order(&self, id: &str) -> Result<Option<Order>> {
        match self {
            Self::Memory(m) => Ok(m.get_order(id).await),
            Self::Postgres(p) => p.get_order(id).await,
        }
    }

    pub async fn list_orders(&self) -> Result<Vec<Order>> {
        match self {
            Self::Memory(m) => Ok(m.list_orders().await),
            Self::Postgres(p) => p.list_orders().await,
        }
    }

    pub async fn delete_order(&self, id: &str) -> Result<()> {
        match self {
            Self::Memory(m) => m.delete_order(id).await,
            Self::Postgres(p) => p.delete_order(id).await,
        }
    }

    pub async fn list_reviews(&self) -> Result<Vec<Review>> {
        match self {
            Self::Memory(m) => Ok(m.list_reviews().await),
            Self::Postgres(p) => p.list_reviews().await,
        }
    }

    pub async fn insert_review(&self, new: NewReview) -> Result<Review> {
        match self {
            Self::Memory(m) => Ok(m.insert_review(new).await),
            Self::Postgres(p) => p.insert_review(new).await,
        }
    }

    pub async fn delete_review(&self, id: i64) -> Result<()> {
        match self {
            Self::Memory(m) => m.delete_review(id).await,
            Self::Postgres(p) => p.delete_review(id).await,
        }
    }
}
