//! In-process mock of the storefront backend for integration tests.
//!
//! [`spawn_backend`] serves the product, review, order and auth routes on
//! `127.0.0.1:0` and records what the client sent in [`MockState`].

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Multipart, Path, RawQuery, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use printables_client::{AdminClient, ApiClient, AuthSession};
use printables_core::product::ProductType;
use printables_events::{Notification, NotificationBus};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// Recorded traffic
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct RecordedPart {
    pub name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// One multipart product request.
#[derive(Debug, Clone)]
pub struct RecordedUpload {
    pub method: &'static str,
    pub parts: Vec<RecordedPart>,
}

impl RecordedUpload {
    pub fn part(&self, name: &str) -> Option<&RecordedPart> {
        self.parts.iter().find(|p| p.name == name)
    }

    pub fn part_names(&self) -> Vec<&str> {
        self.parts.iter().map(|p| p.name.as_str()).collect()
    }

    /// The parsed `productData` part.
    pub fn descriptor(&self) -> Value {
        let part = self.part("productData").expect("productData part");
        serde_json::from_slice(&part.bytes).expect("productData is JSON")
    }
}

#[derive(Default)]
pub struct MockState {
    pub products: Mutex<HashMap<String, Value>>,
    pub uploads: Mutex<Vec<RecordedUpload>>,
    /// `"<kind>:<id>"` for every successful delete.
    pub deleted: Mutex<Vec<String>>,
    pub list_queries: Mutex<Vec<String>>,
    pub list_calls: AtomicUsize,
    pub get_calls: AtomicUsize,
    pub review_calls: AtomicUsize,
    pub order_calls: AtomicUsize,
    pub refresh_calls: AtomicUsize,
    pub logout_calls: AtomicUsize,
    pub fail_mutations: AtomicBool,
    pub fail_refresh: AtomicBool,
    pub authenticated: AtomicBool,
    next_id: AtomicUsize,
}

impl MockState {
    pub fn seed_product(&self, product: Value) {
        let id = product["id"].as_str().expect("seeded product id").to_string();
        self.products.lock().unwrap().insert(id, product);
    }

    pub fn uploads(&self) -> Vec<RecordedUpload> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn set_fail_mutations(&self, fail: bool) {
        self.fail_mutations.store(fail, Ordering::SeqCst);
    }

    fn failing(&self) -> bool {
        self.fail_mutations.load(Ordering::SeqCst)
    }
}

type Shared = Arc<MockState>;

pub struct MockBackend {
    pub base_url: String,
    pub state: Shared,
}

// ---------------------------------------------------------------------------
// Setup helpers
// ---------------------------------------------------------------------------

pub async fn spawn_backend() -> MockBackend {
    let state: Shared = Arc::new(MockState::default());
    let app = router(Arc::clone(&state));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockBackend {
        base_url: format!("http://{addr}"),
        state,
    }
}

pub fn api_client(backend: &MockBackend) -> ApiClient {
    let client = reqwest::Client::builder()
        .cookie_store(true)
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();
    ApiClient::with_client(client, backend.base_url.clone())
}

/// An admin client for the backend plus a receiver of its notifications.
pub fn admin_client(backend: &MockBackend) -> (Arc<AdminClient>, broadcast::Receiver<Notification>) {
    let bus = Arc::new(NotificationBus::default());
    let notifications = bus.subscribe();
    let client = AdminClient::with_api(api_client(backend), ProductType::DigitalPrintable, bus);
    (Arc::new(client), notifications)
}

pub fn auth_session(backend: &MockBackend, refresh_interval: Duration) -> Arc<AuthSession> {
    Arc::new(AuthSession::new(api_client(backend), refresh_interval).unwrap())
}

/// Next notification, failing the test if none arrives promptly.
pub async fn next_notification(rx: &mut broadcast::Receiver<Notification>) -> Notification {
    tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("notification should arrive")
        .expect("bus should be open")
}

/// A stored product with one existing variant whose asset is already on
/// the CDN.
pub fn stored_product(id: &str) -> Value {
    json!({
        "id": id,
        "title": "Floral Wedding Menu",
        "description": "A printable menu card",
        "tags": ["wedding", "menu"],
        "active": true,
        "featuredImageId": "photo-1",
        "type": "DIGITAL_PRINTABLE",
        "variants": [{
            "id": "var-1",
            "title": "A5 portrait",
            "price": 12.5,
            "sortOrder": 0,
            "active": true,
            "photos": [{"id": "photo-1", "url": "https://cdn.test/photo-1.jpg", "sortOrder": 0}],
            "digitalAsset": {
                "id": "asset-1",
                "filename": "menu-a5.pdf",
                "size": 20480,
                "mimeType": "application/pdf",
                "url": "https://cdn.test/menu-a5.pdf"
            }
        }],
        "createdAt": "2024-05-01T12:00:00Z",
        "updatedAt": "2024-05-02T08:30:00Z"
    })
}

pub fn sample_order(id: &str) -> Value {
    json!({
        "id": id,
        "reference": "70d4d7d0",
        "subtotal": "39.97",
        "tax": "3.20",
        "discount": "0.00",
        "total": "43.17",
        "date": "2024-04-12T09:15:00Z",
        "customer": {"id": "c1", "firstName": "Dejesus", "lastName": "Michael", "email": "dejesus@example.com"},
        "products": [{"id": "prod-1", "title": "Floral Wedding Menu", "image": "", "price": "12.50", "quantity": 2}],
        "status": [{"id": "s1", "name": "Pending payment", "color": "orange"}],
        "payment": {"transactionId": "tx-1", "amount": "43.17", "method": "card", "date": "2024-04-12"},
        "shippingDetails": []
    })
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

fn router(state: Shared) -> Router {
    Router::new()
        .route(
            "/api/products/",
            get(list_products).post(create_product).put(update_product),
        )
        .route("/api/products/{id}", get(get_product).delete(delete_product))
        .route("/api/products/{id}/reviews", get(list_reviews))
        .route("/api/products/{id}/reviews/stats", get(review_stats))
        .route("/api/reviews/{id}", delete(delete_review))
        .route(
            "/api/mock/ecommerce/orders",
            get(list_orders).delete(delete_orders),
        )
        .route(
            "/api/mock/ecommerce/orders/{id}",
            get(get_order).put(update_order).delete(delete_order),
        )
        .route("/api/auth/profile", get(profile))
        .route("/api/auth/refresh-token", post(refresh_token))
        .route("/api/auth/logout", post(logout))
        .with_state(state)
}

type HandlerResult = Result<Json<Value>, StatusCode>;

async fn record_upload(method: &'static str, mut multipart: Multipart) -> Result<RecordedUpload, StatusCode> {
    let mut parts = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| StatusCode::BAD_REQUEST)?
    {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(|_| StatusCode::BAD_REQUEST)?;
        parts.push(RecordedPart {
            name,
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }
    Ok(RecordedUpload { method, parts })
}

async fn list_products(State(state): State<Shared>, RawQuery(query): RawQuery) -> Json<Value> {
    state.list_calls.fetch_add(1, Ordering::SeqCst);
    state
        .list_queries
        .lock()
        .unwrap()
        .push(query.unwrap_or_default());

    let products = state.products.lock().unwrap();
    let rows: Vec<Value> = products
        .values()
        .map(|p| {
            json!({
                "id": p["id"],
                "title": p["title"],
                "price": p["variants"][0]["price"],
                "tags": p["tags"],
                "active": p["active"],
            })
        })
        .collect();
    Json(json!({"products": rows, "totalCount": rows.len()}))
}

async fn get_product(State(state): State<Shared>, Path(id): Path<String>) -> HandlerResult {
    state.get_calls.fetch_add(1, Ordering::SeqCst);
    let products = state.products.lock().unwrap();
    let product = products.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(json!({ "product": product })))
}

async fn create_product(State(state): State<Shared>, multipart: Multipart) -> HandlerResult {
    let upload = record_upload("POST", multipart).await?;
    let descriptor = upload.descriptor();
    state.uploads.lock().unwrap().push(upload);
    if state.failing() {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    let id = format!("prod-{}", state.next_id.fetch_add(1, Ordering::SeqCst) + 1);
    let mut product = descriptor;
    product["id"] = json!(id);
    state.products.lock().unwrap().insert(id.clone(), product);
    Ok(Json(json!({ "productId": id })))
}

async fn update_product(State(state): State<Shared>, multipart: Multipart) -> HandlerResult {
    let upload = record_upload("PUT", multipart).await?;
    let descriptor = upload.descriptor();
    state.uploads.lock().unwrap().push(upload);
    if state.failing() {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    let id = descriptor["id"]
        .as_str()
        .ok_or(StatusCode::BAD_REQUEST)?
        .to_string();
    let mut products = state.products.lock().unwrap();
    let stored = products.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    for key in ["title", "description", "active", "tags", "featuredImageId"] {
        stored[key] = descriptor[key].clone();
    }
    Ok(Json(json!({})))
}

async fn delete_product(State(state): State<Shared>, Path(id): Path<String>) -> StatusCode {
    if state.failing() {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }
    match state.products.lock().unwrap().remove(&id) {
        Some(_) => {
            state.deleted.lock().unwrap().push(format!("product:{id}"));
            StatusCode::OK
        }
        None => StatusCode::NOT_FOUND,
    }
}

async fn list_reviews(
    State(state): State<Shared>,
    Path(id): Path<String>,
    RawQuery(query): RawQuery,
) -> Json<Value> {
    state.review_calls.fetch_add(1, Ordering::SeqCst);
    Json(json!({
        "reviews": [{
            "id": "rev-1",
            "author": {"name": "Ana", "picture": null},
            "rating": 5,
            "title": format!("Great product {id}"),
            "content": query,
            "helpfulCount": 2,
            "verifiedPurchase": true,
            "createdAt": "2024-06-01T10:00:00Z"
        }],
        "totalCount": 1
    }))
}

async fn review_stats(State(state): State<Shared>, Path(_id): Path<String>) -> Json<Value> {
    state.review_calls.fetch_add(1, Ordering::SeqCst);
    Json(json!({
        "averageRating": 4.5,
        "totalReviews": 2,
        "ratingDistribution": {"4": 1, "5": 1}
    }))
}

async fn delete_review(State(state): State<Shared>, Path(id): Path<String>) -> StatusCode {
    if state.failing() {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }
    state.deleted.lock().unwrap().push(format!("review:{id}"));
    StatusCode::NO_CONTENT
}

async fn list_orders(State(state): State<Shared>) -> Json<Value> {
    state.order_calls.fetch_add(1, Ordering::SeqCst);
    Json(json!([sample_order("o1"), sample_order("o2")]))
}

async fn get_order(State(state): State<Shared>, Path(id): Path<String>) -> HandlerResult {
    state.order_calls.fetch_add(1, Ordering::SeqCst);
    match id.as_str() {
        "o1" | "o2" => Ok(Json(sample_order(&id))),
        _ => Err(StatusCode::NOT_FOUND),
    }
}

async fn update_order(Path(id): Path<String>, Json(mut order): Json<Value>) -> HandlerResult {
    if order["id"] != json!(id) {
        return Err(StatusCode::BAD_REQUEST);
    }
    order["status"] = json!([{"id": "s2", "name": "Shipped", "color": "green"}]);
    Ok(Json(order))
}

async fn delete_order(State(state): State<Shared>, Path(id): Path<String>) -> StatusCode {
    state.deleted.lock().unwrap().push(format!("order:{id}"));
    StatusCode::OK
}

async fn delete_orders(State(state): State<Shared>, Json(ids): Json<Vec<String>>) -> StatusCode {
    let mut deleted = state.deleted.lock().unwrap();
    for id in ids {
        deleted.push(format!("order:{id}"));
    }
    StatusCode::OK
}

async fn profile(State(state): State<Shared>) -> HandlerResult {
    if !state.authenticated.load(Ordering::SeqCst) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(Json(json!({
        "googleId": "google-42",
        "email": "owner@example.com",
        "name": "Shop Owner",
        "picture": "https://cdn.test/avatar.png",
        "isAdmin": true
    })))
}

async fn refresh_token(State(state): State<Shared>) -> StatusCode {
    state.refresh_calls.fetch_add(1, Ordering::SeqCst);
    if state.fail_refresh.load(Ordering::SeqCst) {
        StatusCode::UNAUTHORIZED
    } else {
        StatusCode::OK
    }
}

async fn logout(State(state): State<Shared>) -> StatusCode {
    state.logout_calls.fetch_add(1, Ordering::SeqCst);
    state.authenticated.store(false, Ordering::SeqCst);
    StatusCode::OK
}
