//! Router tests against the in-memory store

use axum::{body::Body, http::{Method, Request, StatusCode}, Router};
use neela_storefront::{build_router, publisher::EventPublisher, AppConfig, AppState, Storage};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn app() -> Router {
    let storage = Storage::memory();
    storage.seed().await.unwrap();
    build_router(AppState::new(storage, EventPublisher::disabled(), AppConfig::default()))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri).header("content-type", "application/json");
    let request = match body {
        Some(body) => request.body(Body::from(body.to_string())).unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, value)
}

fn line(category: &str, sub: &str, qty: u32) -> Value {
    json!({"productId": 1, "name": "Item", "category": category, "subCategory": sub, "price": 500, "quantity": qty, "selectedSize": "M"})
}

fn billing(state: &str) -> Value {
    json!({
        "firstName": "Meena", "email": "meena@example.com", "phone": "9876543210",
        "address": "12 Temple St", "city": "Madurai", "state": state, "pincode": "625001"
    })
}

#[tokio::test]
async fn test_health_and_states() {
    let app = app().await;
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (_, states) = send(&app, Method::GET, "/api/v1/states", None).await;
    let states = states.as_array().unwrap();
    assert_eq!(states.len(), 36);
    assert!(states.contains(&json!("Tamil Nadu")));
}

#[tokio::test]
async fn test_seeded_categories_listed() {
    let app = app().await;
    let (status, body) = send(&app, Method::GET, "/api/v1/categories", None).await;
    assert_eq!(status, StatusCode::OK);
    let categories = body.as_array().unwrap();
    assert_eq!(categories.len(), 8);
    let saree = categories.iter().find(|c| c["name"] == "Saree").unwrap();
    assert_eq!(saree["shippingRules"][0], json!({"state": "All States", "minQty": 1, "maxQty": 5, "cost": 50.0, "type": "fixed"}));
}

#[tokio::test]
async fn test_shipping_quote_cascade() {
    let app = app().await;
    let rules = json!({"rules": [
        {"state": "Kerala", "minQty": 1, "maxQty": 10, "cost": 20, "type": "per_piece"},
        {"state": "Other States", "minQty": 1, "maxQty": 10, "cost": 70, "type": "fixed"},
        {"state": "All States", "minQty": 1, "maxQty": 10, "cost": 35, "type": "fixed"}
    ]});
    let (status, _) = send(&app, Method::PUT, "/api/v1/categories/Saree", Some(rules)).await;
    assert_eq!(status, StatusCode::OK);

    let quote = |state: &str| json!({"items": [{"category": "Saree", "quantity": 2}], "destinationState": state});
    let (_, kerala) = send(&app, Method::POST, "/api/v1/shipping/quote", Some(quote("Kerala"))).await;
    assert_eq!(kerala["totalShippingCost"], json!(40.0));
    let (_, goa) = send(&app, Method::POST, "/api/v1/shipping/quote", Some(quote("Goa"))).await;
    assert_eq!(goa["totalShippingCost"], json!(70.0));
    let (_, home) = send(&app, Method::POST, "/api/v1/shipping/quote", Some(quote("Tamil Nadu"))).await;
    assert_eq!(home["totalShippingCost"], json!(35.0));
}

#[tokio::test]
async fn test_shipping_quote_pranjul_and_errors() {
    let app = app().await;
    let body = json!({"items": [{"category": "Nighty", "subCategory": "Pranjul brand nighty", "quantity": 6}], "destinationState": "Kerala"});
    let (status, result) = send(&app, Method::POST, "/api/v1/shipping/quote", Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["totalShippingCost"], json!(65.0));

    let body = json!({"items": [{"category": "Saree", "quantity": 1}], "destinationState": "Atlantis"});
    let (status, err) = send(&app, Method::POST, "/api/v1/shipping/quote", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(err["error"].as_str().unwrap().contains("Atlantis"));

    let body = json!({"items": [{"category": "Saree", "quantity": 2}], "destinationState": "Other States"});
    let (status, result) = send(&app, Method::POST, "/api/v1/shipping/quote", Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["totalShippingCost"], json!(50.0));

    let body = json!({"items": [{"category": "Saree", "quantity": 4_000_000_000u32}], "destinationState": "Kerala"});
    let (status, _) = send(&app, Method::POST, "/api/v1/shipping/quote", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_category_admin_errors() {
    let app = app().await;
    let (status, _) = send(&app, Method::POST, "/api/v1/categories", Some(json!({"name": "Saree"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let bad = json!({"rules": [{"state": "Mars", "minQty": 1, "maxQty": 2, "cost": 10, "type": "fixed"}]});
    let (status, _) = send(&app, Method::PUT, "/api/v1/categories/Saree", Some(bad)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::DELETE, "/api/v1/categories/Lehenga", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, Method::POST, "/api/v1/categories/Saree/sub", Some(json!({"subCategory": "Kanchi Silk"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["subCategories"].as_array().unwrap().contains(&json!("Kanchi Silk")));
}

#[tokio::test]
async fn test_checkout_quote() {
    let app = app().await;
    let body = json!({"items": [line("Saree", "Silk Saree", 2)], "destinationState": "Kerala"});
    let (status, quote) = send(&app, Method::POST, "/api/v1/checkout/quote", Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(quote["subtotal"], json!(1000.0));
    assert_eq!(quote["tax"], json!(50.0));
    assert_eq!(quote["shipping"], json!(50.0));
    assert_eq!(quote["total"], json!(1100.0));
    assert_eq!(quote["currency"], "INR");
}

#[tokio::test]
async fn test_order_flow() {
    let app = app().await;
    let body = json!({"items": [line("Saree", "Silk Saree", 6)], "billingDetails": billing("Tamil Nadu"), "paymentMethod": "COD"});
    let (status, order) = send(&app, Method::POST, "/api/v1/orders", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["status"], "Pending");
    assert_eq!(order["shipping"]["amount"], json!(0.0));
    let id = order["id"].as_str().unwrap().to_string();
    assert!(id.starts_with("ORD-"));

    let (status, fetched) = send(&app, Method::GET, &format!("/api/v1/orders/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["id"], json!(id));

    let (_, paid) = send(&app, Method::POST, &format!("/api/v1/orders/{}/payment", id), Some(json!({"outcome": "success"}))).await;
    assert_eq!(paid["status"], "Processing");

    let (_, shipped) = send(&app, Method::PUT, &format!("/api/v1/orders/{}/status", id), Some(json!({"status": "Delivered"}))).await;
    assert_eq!(shipped["status"], "Delivered");

    let (status, _) = send(&app, Method::PUT, &format!("/api/v1/orders/{}/cancel", id), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, orders) = send(&app, Method::GET, "/api/v1/orders", None).await;
    assert_eq!(orders.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, Method::DELETE, &format!("/api/v1/orders/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::DELETE, &format!("/api/v1/orders/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_order_rejections() {
    let app = app().await;
    let (status, _) = send(&app, Method::POST, "/api/v1/orders", Some(json!({"items": [], "billingDetails": billing("Kerala")}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::GET, "/api/v1/orders/ORD-000000000000", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let body = json!({"items": [line("Saree", "Silk Saree", 10_001)], "billingDetails": billing("Kerala")});
    let (status, _) = send(&app, Method::POST, "/api/v1/orders", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (_, orders) = send(&app, Method::GET, "/api/v1/orders", None).await;
    assert!(orders.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_products() {
    let app = app().await;
    let product = json!({"id": 7, "name": "Kanchi Silk", "category": "Saree", "price": 2400, "sizeStock": {"Free": 4}});
    let (status, created) = send(&app, Method::POST, "/api/v1/products", Some(product)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["stock"], 4);

    let (status, fetched) = send(&app, Method::GET, "/api/v1/products/7", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "Kanchi Silk");

    let (status, _) = send(&app, Method::GET, "/api/v1/products/8", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let orphan = json!({"id": 9, "name": "Lehenga", "category": "Lehenga", "price": 900});
    let (status, _) = send(&app, Method::POST, "/api/v1/products", Some(orphan)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_product_deletes() {
    let app = app().await;
    for id in 1..=3 {
        let product = json!({"id": id, "name": "Cotton Saree", "category": "Saree", "price": 800, "stock": 2});
        send(&app, Method::POST, "/api/v1/products", Some(product)).await;
    }
    let (status, _) = send(&app, Method::DELETE, "/api/v1/products/1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::DELETE, "/api/v1/products/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, Method::POST, "/api/v1/products/bulk-delete", Some(json!({"ids": [2, 3, 9]}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], 2);
    let (_, products) = send(&app, Method::GET, "/api/v1/products", None).await;
    assert!(products.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_reviews() {
    let app = app().await;
    let review = |comment: &str| json!({"productId": 7, "productName": "Kanchi Silk", "userId": "u-1", "userName": "Meena", "rating": 5, "comment": comment});
    let (status, first) = send(&app, Method::POST, "/api/v1/reviews", Some(review("Beautiful drape"))).await;
    assert_eq!(status, StatusCode::CREATED);
    send(&app, Method::POST, "/api/v1/reviews", Some(review("Fast delivery"))).await;

    let (_, listed) = send(&app, Method::GET, "/api/v1/reviews", None).await;
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0]["comment"], "Fast delivery");

    let (status, _) = send(&app, Method::POST, "/api/v1/reviews", Some(json!({"productId": 7, "userId": "u-1", "rating": 0}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::DELETE, &format!("/api/v1/reviews/{}", first["id"]), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::DELETE, &format!("/api/v1/reviews/{}", first["id"]), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
