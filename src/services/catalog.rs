//! Category, product and review administration

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::Validate;

use crate::domain::aggregates::{Category, NewReview, Product, Review};
use crate::domain::shipping::ShippingRule;
use crate::storage::Storage;
use crate::{EcommerceError, Result};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategory {
    pub name: String,
    /// Defaults to the standard two-tier table when omitted.
    #[serde(default)]
    pub rules: Option<Vec<ShippingRule>>,
    #[serde(default)]
    pub sub_categories: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategory {
    #[serde(default)]
    pub new_name: Option<String>,
    #[serde(default)]
    pub rules: Option<Vec<ShippingRule>>,
    #[serde(default)]
    pub sub_categories: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProduct {
    #[validate(range(min = 1))]
    pub id: i64,
    #[validate(length(min = 1))]
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub sub_category: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub discount_price: Option<Decimal>,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub size_stock: BTreeMap<String, u32>,
}

#[derive(Debug, Deserialize)]
pub struct BulkDelete {
    pub ids: Vec<i64>,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct BulkDeleted {
    pub deleted: u64,
}

#[derive(Clone)]
pub struct CatalogService {
    storage: Storage,
}

impl CatalogService {
    pub fn new(storage: Storage) -> Self { Self { storage } }

    pub async fn list_categories(&self) -> Result<Vec<Category>> { self.storage.list_categories().await }

    pub async fn get_category(&self, name: &str) -> Result<Category> {
        self.storage.get_category(name).await?.ok_or_else(|| EcommerceError::CategoryNotFound(name.to_string()))
    }

    pub async fn create_category(&self, req: CreateCategory) -> Result<Category> {
        let mut category = match req.rules {
            Some(rules) => Category::with_rules(req.name, rules)?,
            None => Category::create(req.name)?,
        };
        category.set_sub_categories(req.sub_categories);
        self.storage.insert_category(category.clone()).await?;
        tracing::info!(category = %category.name(), rules = category.shipping_rules().len(), "category created");
        Ok(category)
    }

    /// Rename and/or replace the shipping table and sub-categories.
    pub async fn update_category(&self, name: &str, req: UpdateCategory) -> Result<Category> {
        let mut category = self.get_category(name).await?;
        if let Some(new_name) = req.new_name {
            category.rename(new_name)?;
        }
        if let Some(rules) = req.rules {
            category.replace_rules(rules)?;
        }
        if let Some(subs) = req.sub_categories {
            category.set_sub_categories(subs);
        }
        self.storage.replace_category(name, category.clone()).await?;
        tracing::info!(category = %name, now = %category.name(), rules = category.shipping_rules().len(), "category updated");
        Ok(category)
    }

    pub async fn add_sub_category(&self, name: &str, sub: &str) -> Result<Category> {
        let mut category = self.get_category(name).await?;
        if category.add_sub_category(sub) {
            self.storage.replace_category(name, category.clone()).await?;
        }
        Ok(category)
    }

    pub async fn delete_category(&self, name: &str) -> Result<()> {
        self.storage.delete_category(name).await?;
        tracing::info!(category = %name, "category deleted");
        Ok(())
    }

    pub async fn list_products(&self) -> Result<Vec<Product>> { self.storage.list_products().await }

    pub async fn get_product(&self, id: i64) -> Result<Product> {
        self.storage.get_product(id).await?.ok_or(EcommerceError::ProductNotFound(id))
    }

    pub async fn save_product(&self, req: CreateProduct) -> Result<Product> {
        req.validate()?;
        if req.price.is_sign_negative() {
            return Err(EcommerceError::InvalidRequest("price must not be negative".into()));
        }
        self.get_category(&req.category).await?;
        let mut product = Product::create(req.id, req.name, req.category, req.sub_category.as_deref(), req.price);
        product.set_discount_price(req.discount_price);
        if req.size_stock.is_empty() { product.set_stock(req.stock) } else { product.set_size_stock(req.size_stock) }
        self.storage.save_product(product.clone()).await?;
        Ok(product)
    }

    pub async fn delete_product(&self, id: i64) -> Result<()> {
        self.storage.delete_product(id).await?;
        tracing::info!(product_id = id, "product deleted");
        Ok(())
    }

    /// Ids that don't exist are skipped.
    pub async fn delete_products(&self, req: BulkDelete) -> Result<BulkDeleted> {
        if req.ids.is_empty() {
            return Err(EcommerceError::InvalidRequest("ids must not be empty".into()));
        }
        let deleted = self.storage.delete_products(&req.ids).await?;
        tracing::info!(requested = req.ids.len(), deleted, "products deleted");
        Ok(BulkDeleted { deleted })
    }

    pub async fn list_reviews(&self) -> Result<Vec<Review>> { self.storage.list_reviews().await }

    pub async fn create_review(&self, new: NewReview) -> Result<Review> {
        new.validate()?;
        let review = self.storage.insert_review(new).await?;
        tracing::info!(review_id = review.id(), product_id = review.product_id(), rating = review.rating(), "review added");
        Ok(review)
    }

    pub async fn delete_review(&self, id: i64) -> Result<()> {
        self.storage.delete_review(id).await
    }
}
