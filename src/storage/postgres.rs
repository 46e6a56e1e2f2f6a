//! Postgres storage
//!
//! Categories keep their sub-categories and shipping table as JSONB columns.
//! Products, orders and reviews are stored as JSONB documents next to the
//! columns the queries filter and sort on.

use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Json;

use crate::domain::aggregates::{Category, NewReview, Order, Product, Review};
use crate::domain::events::DomainEvent;
use crate::domain::shipping::ShippingRule;
use crate::{EcommerceError, Result};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

type CategoryRow = (String, Json<Vec<String>>, Json<Vec<ShippingRule>>);

fn into_category((name, subs, rules): CategoryRow) -> Category {
    Category::from_parts(name, subs.0, rules.0)
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

impl PgStore {
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new().max_connections(10).connect(url).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query_as::<_, CategoryRow>("SELECT name, sub_categories, shipping_rules FROM categories ORDER BY created_at, name")
            .fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(into_category).collect())
    }

    pub async fn get_category(&self, name: &str) -> Result<Option<Category>> {
        let row = sqlx::query_as::<_, CategoryRow>("SELECT name, sub_categories, shipping_rules FROM categories WHERE name = $1")
            .bind(name).fetch_optional(&self.pool).await?;
        Ok(row.map(into_category))
    }

    pub async fn insert_category(&self, category: &Category) -> Result<()> {
        let inserted = sqlx::query("INSERT INTO categories (name, sub_categories, shipping_rules, created_at) VALUES ($1, $2, $3, NOW()) ON CONFLICT (name) DO NOTHING")
            .bind(category.name()).bind(Json(category.sub_categories())).bind(Json(category.shipping_rules()))
            .execute(&self.pool).await?;
        if inserted.rows_affected() == 0 {
            return Err(EcommerceError::CategoryExists(category.name().to_string()));
        }
        Ok(())
    }

    /// Store `category` in place of `previous_name`, moving products along on rename.
    pub async fn replace_category(&self, previous_name: &str, category: &Category) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        let updated = sqlx::query("UPDATE categories SET name = $2, sub_categories = $3, shipping_rules = $4 WHERE name = $1")
            .bind(previous_name).bind(category.name())
            .bind(Json(category.sub_categories())).bind(Json(category.shipping_rules()))
            .execute(&mut *tx).await
            .map_err(|e| match is_unique_violation(&e) {
                true => EcommerceError::CategoryExists(category.name().to_string()),
                false => EcommerceError::from(e),
            })?;
        if updated.rows_affected() == 0 {
            return Err(EcommerceError::CategoryNotFound(previous_name.to_string()));
        }
        if previous_name != category.name() {
            sqlx::query("UPDATE products SET category = $2, data = jsonb_set(data, '{category}', to_jsonb($2::text)), updated_at = NOW() WHERE category = $1")
                .bind(previous_name).bind(category.name())
                .execute(&mut *tx).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    pub async fn delete_category(&self, name: &str) -> Result<()> {
        let deleted = sqlx::query("DELETE FROM categories WHERE name = $1").bind(name).execute(&self.pool).await?;
        if deleted.rows_affected() == 0 {
            return Err(EcommerceError::CategoryNotFound(name.to_string()));
        }
        Ok(())
    }

    pub async fn seed_categories(&self, categories: &[Category]) -> Result<bool> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM categories").fetch_one(&self.pool).await?;
        if count > 0 { return Ok(false); }
        for category in categories {
            self.insert_category(category).await?;
        }
        Ok(true)
    }

    pub async fn list_products(&self) -> Result<Vec<Product>> {
        let rows: Vec<(Json<Product>,)> = sqlx::query_as("SELECT data FROM products ORDER BY id").fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(|(p,)| p.0).collect())
    }

    pub async fn get_product(&self, id: i64) -> Result<Option<Product>> {
        let row: Option<(Json<Product>,)> = sqlx::query_as("SELECT data FROM products WHERE id = $1").bind(id).fetch_optional(&self.pool).await?;
        Ok(row.map(|(p,)| p.0))
    }

    pub async fn save_product(&self, product: &Product) -> Result<()> {
        sqlx::query("INSERT INTO products (id, category, data, updated_at) VALUES ($1, $2, $3, NOW()) ON CONFLICT (id) DO UPDATE SET category = $2, data = $3, updated_at = NOW()")
            .bind(product.id()).bind(product.category()).bind(Json(product))
            .execute(&self.pool).await?;
        Ok(())
    }

    /// Lock the row, deduct and write back in one transaction.
    pub async fn deduct_stock(&self, id: i64, size: Option<&str>, qty: u32) -> Result<Option<Vec<DomainEvent>>> {
        let mut tx = self.pool.begin().await?;
        let row: Option<(Json<Product>,)> = sqlx::query_as("SELECT data FROM products WHERE id = $1 FOR UPDATE")
            .bind(id).fetch_optional(&mut *tx).await?;
        let Some((Json(mut product),)) = row else { return Ok(None) };
        product.deduct_stock(size, qty);
        let events = product.take_events();
        sqlx::query("UPDATE products SET data = $2, updated_at = NOW() WHERE id = $1")
            .bind(id).bind(Json(&product))
            .execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(Some(events))
    }

    pub async fn delete_product(&self, id: i64) -> Result<()> {
        let deleted = sqlx::query("DELETE FROM products WHERE id = $1").bind(id).execute(&self.pool).await?;
        if deleted.rows_affected() == 0 {
            return Err(EcommerceError::ProductNotFound(id));
        }
        Ok(())
    }

    pub async fn delete_products(&self, ids: &[i64]) -> Result<u64> {
        let deleted = sqlx::query("DELETE FROM products WHERE id = ANY($1)").bind(ids).execute(&self.pool).await?;
        Ok(deleted.rows_affected())
    }

    pub async fn insert_order(&self, order: &Order) -> Result<()> {
        sqlx::query("INSERT INTO orders (id, customer_id, status, total, data, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, NOW())")
            .bind(order.id()).bind(order.customer_id()).bind(order.status().as_str())
            .bind(order.total().amount()).bind(Json(order)).bind(order.created_at())
            .execute(&self.pool).await
            .map_err(|e| match is_unique_violation(&e) {
                true => EcommerceError::DuplicateOrderId(order.id().to_string()),
                false => EcommerceError::from(e),
            })?;
        Ok(())
    }

    pub async fn delete_order(&self, id: &str) -> Result<()> {
        let deleted = sqlx::query("DELETE FROM orders WHERE id = $1").bind(id).execute(&self.pool).await?;
        if deleted.rows_affected() == 0 {
            return Err(EcommerceError::OrderNotFound(id.to_string()));
        }
        Ok(())
    }

    pub async fn save_order(&self, order: &Order) -> Result<()> {
        let updated = sqlx::query("UPDATE orders SET status = $2, total = $3, data = $4, updated_at = NOW() WHERE id = $1")
            .bind(order.id()).bind(order.status().as_str()).bind(order.total().amount()).bind(Json(order))
            .execute(&self.pool).await?;
        if updated.rows_affected() == 0 {
            return Err(EcommerceError::OrderNotFound(order.id().to_string()));
        }
        Ok(())
    }

    pub async fn get_order(&self, id: &str) -> Result<Option<Order>> {
        let row: Option<(Json<Order>,)> = sqlx::query_as("SELECT data FROM orders WHERE id = $1").bind(id).fetch_optional(&self.pool).await?;
        Ok(row.map(|(o,)| o.0))
    }

    pub async fn list_orders(&self) -> Result<Vec<Order>> {
        let rows: Vec<(Json<Order>,)> = sqlx::query_as("SELECT data FROM orders ORDER BY created_at DESC").fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(|(o,)| o.0).collect())
    }

    pub async fn list_reviews(&self) -> Result<Vec<Review>> {
        let rows: Vec<(Json<Review>,)> = sqlx::query_as("SELECT data FROM reviews ORDER BY created_at DESC, id DESC").fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(|(r,)| r.0).collect())
    }

    pub async fn insert_review(&self, new: NewReview) -> Result<Review> {
        let (id,): (i64,) = sqlx::query_as("SELECT nextval('reviews_id_seq')").fetch_one(&self.pool).await?;
        let review = Review::create(id, new);
        sqlx::query("INSERT INTO reviews (id, product_id, data, created_at) VALUES ($1, $2, $3, $4)")
            .bind(review.id()).bind(review.product_id()).bind(Json(&review)).bind(review.created_at())
            .execute(&self.pool).await?;
        Ok(review)
    }

    pub async fn delete_review(&self, id: i64) -> Result<()> {
        let deleted = sqlx::query("DELETE FROM reviews WHERE id = $1").bind(id).execute(&self.pool).await?;
        if deleted.rows_affected() == 0 {
            return Err(EcommerceError::ReviewNotFound(id));
        }
        Ok(())
    }
}
