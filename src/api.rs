//! HTTP routes

use std::sync::Arc;

use axum::{extract::{Path, State}, http::StatusCode, routing::{delete, get, post, put}, Json, Router};
use serde::Deserialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::domain::aggregates::{Category, NewReview, Order, OrderStatus, PaymentOutcome, Product, Review};
use crate::domain::shipping::{ShippingComputationInput, ShippingComputationResult, INDIAN_STATES};
use crate::publisher::EventPublisher;
use crate::services::{
    BulkDelete, BulkDeleted, CatalogService, CheckoutQuote, CheckoutService, CreateCategory, CreateProduct,
    PlaceOrderRequest, QuoteRequest, UpdateCategory,
};
use crate::storage::Storage;
use crate::Result;

#[derive(Clone)]
pub struct AppState {
    pub catalog: CatalogService,
    pub checkout: CheckoutService,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(storage: Storage, publisher: EventPublisher, config: AppConfig) -> Self {
        Self {
            catalog: CatalogService::new(storage.clone()),
            checkout: CheckoutService::new(storage, publisher, &config),
            config: Arc::new(config),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "neela-storefront"})) }))
        .route("/api/v1/states", get(list_states))
        .route("/api/v1/categories", get(list_categories).post(create_category))
        .route("/api/v1/categories/:name", get(get_category).put(update_category).delete(delete_category))
        .route("/api/v1/categories/:name/sub", post(add_sub_category))
        .route("/api/v1/products", get(list_products).post(save_product))
        .route("/api/v1/products/bulk-delete", post(delete_products))
        .route("/api/v1/products/:id", get(get_product).delete(delete_product))
        .route("/api/v1/reviews", get(list_reviews).post(create_review))
        .route("/api/v1/reviews/:id", delete(delete_review))
        .route("/api/v1/shipping/quote", post(shipping_quote))
        .route("/api/v1/checkout/quote", post(checkout_quote))
        .route("/api/v1/orders", get(list_orders).post(place_order))
        .route("/api/v1/orders/:id", get(get_order).delete(delete_order))
        .route("/api/v1/orders/:id/status", put(set_order_status))
        .route("/api/v1/orders/:id/cancel", put(cancel_order))
        .route("/api/v1/orders/:id/payment", post(record_payment))
        .layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()).with_state(state)
}

async fn list_states() -> Json<Vec<&'static str>> { Json(INDIAN_STATES.to_vec()) }

async fn list_categories(State(s): State<AppState>) -> Result<Json<Vec<Category>>> {
    Ok(Json(s.catalog.list_categories().await?))
}

async fn get_category(State(s): State<AppState>, Path(name): Path<String>) -> Result<Json<Category>> {
    Ok(Json(s.catalog.get_category(&name).await?))
}

async fn create_category(State(s): State<AppState>, Json(r): Json<CreateCategory>) -> Result<(StatusCode, Json<Category>)> {
    Ok((StatusCode::CREATED, Json(s.catalog.create_category(r).await?)))
}

async fn update_category(State(s): State<AppState>, Path(name): Path<String>, Json(r): Json<UpdateCategory>) -> Result<Json<Category>> {
    Ok(Json(s.catalog.update_category(&name, r).await?))
}

async fn delete_category(State(s): State<AppState>, Path(name): Path<String>) -> Result<StatusCode> {
    s.catalog.delete_category(&name).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubCategoryRequest { pub sub_category: String }

async fn add_sub_category(State(s): State<AppState>, Path(name): Path<String>, Json(r): Json<SubCategoryRequest>) -> Result<Json<Category>> {
    Ok(Json(s.catalog.add_sub_category(&name, &r.sub_category).await?))
}

async fn list_products(State(s): State<AppState>) -> Result<Json<Vec<Product>>> {
    Ok(Json(s.catalog.list_products().await?))
}

async fn get_product(State(s): State<AppState>, Path(id): Path<i64>) -> Result<Json<Product>> {
    Ok(Json(s.catalog.get_product(id).await?))
}

async fn save_product(State(s): State<AppState>, Json(r): Json<CreateProduct>) -> Result<(StatusCode, Json<Product>)> {
    Ok((StatusCode::CREATED, Json(s.catalog.save_product(r).await?)))
}

async fn delete_product(State(s): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode> {
    s.catalog.delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_products(State(s): State<AppState>, Json(r): Json<BulkDelete>) -> Result<Json<BulkDeleted>> {
    Ok(Json(s.catalog.delete_products(r).await?))
}

async fn list_reviews(State(s): State<AppState>) -> Result<Json<Vec<Review>>> {
    Ok(Json(s.catalog.list_reviews().await?))
}

async fn create_review(State(s): State<AppState>, Json(r): Json<NewReview>) -> Result<(StatusCode, Json<Review>)> {
    Ok((StatusCode::CREATED, Json(s.catalog.create_review(r).await?)))
}

async fn delete_review(State(s): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode> {
    s.catalog.delete_review(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn shipping_quote(State(s): State<AppState>, Json(r): Json<ShippingComputationInput>) -> Result<Json<ShippingComputationResult>> {
    Ok(Json(s.checkout.shipping_quote(&r).await?))
}

async fn checkout_quote(State(s): State<AppState>, Json(r): Json<QuoteRequest>) -> Result<Json<CheckoutQuote>> {
    Ok(Json(s.checkout.quote(r).await?))
}

async fn place_order(State(s): State<AppState>, Json(r): Json<PlaceOrderRequest>) -> Result<(StatusCode, Json<Order>)> {
    Ok((StatusCode::CREATED, Json(s.checkout.place_order(r).await?)))
}

async fn list_orders(State(s): State<AppState>) -> Result<Json<Vec<Order>>> {
    Ok(Json(s.checkout.list_orders().await?))
}

async fn get_order(State(s): State<AppState>, Path(id): Path<String>) -> Result<Json<Order>> {
    Ok(Json(s.checkout.get_order(&id).await?))
}

async fn delete_order(State(s): State<AppState>, Path(id): Path<String>) -> Result<StatusCode> {
    s.checkout.delete_order(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)] pub struct StatusRequest { pub status: OrderStatus }

async fn set_order_status(State(s): State<AppState>, Path(id): Path<String>, Json(r): Json<StatusRequest>) -> Result<Json<Order>> {
    Ok(Json(s.checkout.set_status(&id, r.status).await?))
}

async fn cancel_order(State(s): State<AppState>, Path(id): Path<String>) -> Result<Json<Order>> {
    Ok(Json(s.checkout.cancel(&id).await?))
}

#[derive(Debug, Deserialize)] pub struct PaymentRequest { pub outcome: PaymentOutcome }

async fn record_payment(State(s): State<AppState>, Path(id): Path<String>, Json(r): Json<PaymentRequest>) -> Result<Json<Order>> {
    Ok(Json(s.checkout.record_payment(&id, r.outcome).await?))
}
