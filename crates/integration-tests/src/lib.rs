//! Integration test helpers for the Vitashop storefront client.
//!
//! [`FakeApi`] is an in-process axum server that speaks the remote API's
//! cart, order, and catalog endpoints. Tests seed it, point a
//! [`Storefront`] at it, and inspect what the client sent.
//!
//! # Example
//!
//! ```ignore
//! let api = FakeApi::start().await;
//! api.seed_product(json!({ "id": "p1", "name": "Zinc", "price": 10 }));
//! let storefront = api.storefront(None).await;
//! ```

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Path, Query, Request, State};
use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use secrecy::SecretString;
use serde_json::{Map, Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use vitashop_storefront::Storefront;
use vitashop_storefront::config::StorefrontConfig;
use vitashop_storefront::storage::LocalStorage;

type Shared = Arc<Mutex<FakeState>>;

/// A request as the fake server saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
}

#[derive(Default)]
struct FakeState {
    carts: HashMap<String, Value>,
    products: Vec<Value>,
    categories: Option<Value>,
    requests: Vec<RecordedRequest>,
    cart_writes: Vec<Value>,
    orders: Vec<Value>,
    placed: Vec<Value>,
    next_order_id: u64,
    line_delete_failure: Option<StatusCode>,
    checkout_failure: Option<(StatusCode, Value)>,
}

fn lock(state: &Shared) -> MutexGuard<'_, FakeState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-process stand-in for the remote storefront API.
///
/// The server task is aborted when this value is dropped.
pub struct FakeApi {
    addr: SocketAddr,
    state: Shared,
    server: JoinHandle<()>,
}

impl FakeApi {
    /// Bind to an ephemeral port and start serving.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start() -> Self {
        let state = Shared::default();
        lock(&state).next_order_id = 1000;

        let app = Router::new()
            .route("/api/carts", post(replace_cart).delete(delete_cart))
            .route("/api/carts/{cart_id}", get(get_cart))
            .route(
                "/api/carts/{cart_id}/items/{product_id}",
                delete(delete_line),
            )
            .route("/api/orders/checkout", post(checkout))
            .route("/api/orders/user-orders", get(user_orders))
            .route("/api/orders/{order_id}", get(get_order))
            .route("/api/products", get(list_products))
            .route("/api/products/{product_id}", get(get_product))
            .route("/api/categories", get(list_categories))
            .route("/api/categories/{category_id}", get(get_category))
            .layer(middleware::from_fn_with_state(state.clone(), record))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake API listener");
        let addr = listener
            .local_addr()
            .expect("Failed to read fake API address");

        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            state,
            server,
        }
    }

    /// API base URL, including the `/api` prefix.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// Build a storefront against this server with in-memory storage.
    ///
    /// # Panics
    ///
    /// Panics if the storefront cannot be built.
    pub async fn storefront(&self, token: Option<&str>) -> Storefront {
        self.storefront_with_storage(token, LocalStorage::in_memory())
            .await
    }

    /// Build a storefront against this server with the given storage.
    ///
    /// # Panics
    ///
    /// Panics if the storefront cannot be built.
    pub async fn storefront_with_storage(
        &self,
        token: Option<&str>,
        storage: LocalStorage,
    ) -> Storefront {
        let mut config = StorefrontConfig::for_api(&self.base_url(), "unused")
            .expect("Fake API URL should be valid");
        config.auth_token = token.map(|t| SecretString::from(t.to_string()));

        Storefront::with_storage(config, storage)
            .await
            .expect("Failed to build storefront")
    }

    // =========================================================================
    // Seeding
    // =========================================================================

    /// Store a raw cart body, returned verbatim by `GET /carts/{id}`.
    pub fn seed_cart(&self, cart_id: &str, body: Value) {
        lock(&self.state).carts.insert(cart_id.to_string(), body);
    }

    /// Add a raw product body to the catalog.
    pub fn seed_product(&self, product: Value) {
        lock(&self.state).products.push(product);
    }

    /// Set the raw `GET /categories` body. Without it the endpoint fails.
    pub fn seed_categories(&self, body: Value) {
        lock(&self.state).categories = Some(body);
    }

    // =========================================================================
    // Fault injection
    // =========================================================================

    /// Make every `DELETE /carts/{id}/items/{productId}` answer `status`.
    pub fn fail_line_deletes(&self, status: StatusCode) {
        lock(&self.state).line_delete_failure = Some(status);
    }

    /// Make `POST /orders/checkout` answer `status` with `body`.
    pub fn fail_checkout(&self, status: StatusCode, body: Value) {
        lock(&self.state).checkout_failure = Some((status, body));
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Every request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.state).requests.clone()
    }

    /// Requests received for `method` and exact `path`.
    #[must_use]
    pub fn requests_to(&self, method: &str, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }

    /// Bodies of every `POST /carts`, oldest first.
    #[must_use]
    pub fn cart_writes(&self) -> Vec<Value> {
        lock(&self.state).cart_writes.clone()
    }

    /// Bodies of every `POST /orders/checkout`, oldest first.
    #[must_use]
    pub fn orders(&self) -> Vec<Value> {
        lock(&self.state).orders.clone()
    }

    /// Orders the server accepted, as `GET /orders/{id}` returns them.
    #[must_use]
    pub fn placed_orders(&self) -> Vec<Value> {
        lock(&self.state).placed.clone()
    }

    /// The cart as currently stored on the server.
    #[must_use]
    pub fn stored_cart(&self, cart_id: &str) -> Option<Value> {
        lock(&self.state).carts.get(cart_id).cloned()
    }
}

impl Drop for FakeApi {
    fn drop(&mut self) {
        self.server.abort();
    }
}

// =============================================================================
// Handlers
// =============================================================================

async fn record(State(state): State<Shared>, request: Request, next: Next) -> Response {
    let recorded = RecordedRequest {
        method: request.method().to_string(),
        path: request.uri().path().to_string(),
        query: request.uri().query().map(str::to_string),
        authorization: request
            .headers()
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    };
    lock(&state).requests.push(recorded);

    next.run(request).await
}

async fn get_cart(State(state): State<Shared>, Path(cart_id): Path<String>) -> Response {
    lock(&state).carts.get(&cart_id).cloned().map_or_else(
        || (StatusCode::NOT_FOUND, "Cart not found").into_response(),
        |cart| Json(cart).into_response(),
    )
}

async fn replace_cart(State(state): State<Shared>, Json(body): Json<Value>) -> StatusCode {
    let mut state = lock(&state);
    state.cart_writes.push(body.clone());

    let Some(cart_id) = body.get("Id").and_then(Value::as_str) else {
        return StatusCode::BAD_REQUEST;
    };
    state.carts.insert(cart_id.to_string(), body.clone());
    StatusCode::OK
}

async fn delete_line(
    State(state): State<Shared>,
    Path((cart_id, product_id)): Path<(String, String)>,
) -> StatusCode {
    let mut state = lock(&state);
    if let Some(status) = state.line_delete_failure {
        return status;
    }

    let Some(cart) = state.carts.get_mut(&cart_id) else {
        return StatusCode::NOT_FOUND;
    };
    for key in ["Items", "items"] {
        if let Some(Value::Array(items)) = cart.get_mut(key) {
            items.retain(|item| line_product_id(item).as_deref() != Some(product_id.as_str()));
        }
    }
    StatusCode::NO_CONTENT
}

async fn delete_cart(
    State(state): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
) -> StatusCode {
    match params.get("id") {
        Some(cart_id) => {
            lock(&state).carts.remove(cart_id);
            StatusCode::NO_CONTENT
        }
        None => StatusCode::BAD_REQUEST,
    }
}

async fn checkout(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut state = lock(&state);
    state.orders.push(body.clone());

    if let Some((status, error)) = state.checkout_failure.clone() {
        return (status, Json(error)).into_response();
    }

    state.next_order_id += 1;
    let id = state.next_order_id;

    let items = body
        .get("userId")
        .and_then(Value::as_str)
        .and_then(|cart_id| state.carts.get(cart_id))
        .and_then(|cart| cart.get("Items"))
        .cloned()
        .unwrap_or_else(|| json!([]));
    let total: f64 = items
        .as_array()
        .map(|lines| {
            lines
                .iter()
                .map(|line| {
                    let price = line.get("Price").and_then(Value::as_f64).unwrap_or(0.0);
                    let quantity = line.get("Quantity").and_then(Value::as_f64).unwrap_or(0.0);
                    price * quantity
                })
                .sum()
        })
        .unwrap_or(0.0);
    state.placed.push(json!({
        "id": id,
        "orderDate": "2026-10-17T09:30:00Z",
        "customerEmail": body.get("email").cloned().unwrap_or(Value::Null),
        "items": items,
        "totalPrice": total,
        "status": "Pending",
    }));

    let mut order = match body {
        Value::Object(fields) => fields,
        _ => Map::new(),
    };
    order.insert("id".to_string(), json!(id));
    Json(Value::Object(order)).into_response()
}

async fn get_order(State(state): State<Shared>, Path(order_id): Path<String>) -> Response {
    lock(&state)
        .placed
        .iter()
        .find(|o| o.get("id").map(Value::to_string).as_deref() == Some(order_id.as_str()))
        .cloned()
        .map_or_else(
            || (StatusCode::NOT_FOUND, "Order not found").into_response(),
            |order| Json(order).into_response(),
        )
}

async fn user_orders(State(state): State<Shared>, request: Request) -> Response {
    if !request.headers().contains_key(AUTHORIZATION) {
        return (StatusCode::UNAUTHORIZED, "Sign in to see your orders").into_response();
    }
    Json(Value::Array(lock(&state).placed.clone())).into_response()
}

async fn list_products(
    State(state): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let page_number: usize = params
        .get("pageNumber")
        .and_then(|v| v.parse().ok())
        .unwrap_or(1);
    let page_size: usize = params
        .get("pageSize")
        .and_then(|v| v.parse().ok())
        .unwrap_or(10);
    let search = params.get("searchTerm").map(|s| s.to_lowercase());
    let category = params.get("categoryId");

    let matching: Vec<Value> = lock(&state)
        .products
        .iter()
        .filter(|p| {
            search.as_ref().is_none_or(|term| {
                p.get("name")
                    .and_then(Value::as_str)
                    .is_some_and(|name| name.to_lowercase().contains(term))
            })
        })
        .filter(|p| {
            category.is_none_or(|c| p.get("categoryId").and_then(Value::as_str) == Some(c.as_str()))
        })
        .cloned()
        .collect();

    let items: Vec<Value> = matching
        .iter()
        .skip(page_number.saturating_sub(1) * page_size)
        .take(page_size)
        .cloned()
        .collect();

    Json(json!({
        "items": items,
        "totalCount": matching.len(),
        "pageNumber": page_number,
        "pageSize": page_size,
    }))
}

async fn get_product(State(state): State<Shared>, Path(product_id): Path<String>) -> Response {
    lock(&state)
        .products
        .iter()
        .find(|p| p.get("id").and_then(Value::as_str) == Some(product_id.as_str()))
        .cloned()
        .map_or_else(
            || (StatusCode::NOT_FOUND, "Product not found").into_response(),
            |product| Json(product).into_response(),
        )
}

async fn list_categories(State(state): State<Shared>) -> Response {
    lock(&state).categories.clone().map_or_else(
        || StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        |body| Json(body).into_response(),
    )
}

async fn get_category(State(state): State<Shared>, Path(category_id): Path<String>) -> Response {
    let Some(body) = lock(&state).categories.clone() else {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };
    let listed = match &body {
        Value::Array(items) => items.clone(),
        other => other
            .get("items")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default(),
    };
    listed
        .into_iter()
        .find(|c| c.get("id").and_then(Value::as_str) == Some(category_id.as_str()))
        .map_or_else(
            || (StatusCode::NOT_FOUND, "Category not found").into_response(),
            |category| Json(category).into_response(),
        )
}

fn line_product_id(item: &Value) -> Option<String> {
    ["ProductId", "productId", "id"]
        .iter()
        .find_map(|key| item.get(*key))
        .map(|id| match id {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
}
