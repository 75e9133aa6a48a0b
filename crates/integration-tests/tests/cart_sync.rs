//! Cart synchronization against the fake remote API.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use vitashop_core::{CartId, ProductId, Quantity};
use vitashop_integration_tests::FakeApi;
use vitashop_storefront::AppError;
use vitashop_storefront::cart::{CartError, ProductRef};
use vitashop_storefront::storage::{LocalStorage, keys};

async fn storage_with_cart(cart_id: &str) -> LocalStorage {
    let storage = LocalStorage::in_memory();
    storage.set(keys::CART_ID, cart_id).await.unwrap();
    storage
}

fn zinc() -> ProductRef {
    serde_json::from_value(json!({ "id": "p1", "name": "Zinc", "price": 10, "imageUrl": "zinc.png" }))
        .unwrap()
}

fn last_write_items(api: &FakeApi) -> Vec<Value> {
    api.cart_writes()
        .last()
        .and_then(|body| body.get("Items"))
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

// =============================================================================
// Loading
// =============================================================================

#[tokio::test]
async fn test_new_cart_id_is_generated_and_persisted() {
    let api = FakeApi::start().await;
    let storage = LocalStorage::in_memory();

    let storefront = api.storefront_with_storage(None, storage.clone()).await;

    let cart_id = storefront.cart().cart_id().clone();
    assert_eq!(
        storage.get(keys::CART_ID).await.as_deref(),
        Some(cart_id.as_str())
    );
    // Unknown cart on the server loads as empty
    assert!(storefront.cart().is_empty());
    assert_eq!(
        api.requests_to("GET", &format!("/api/carts/{cart_id}")).len(),
        1
    );
}

#[tokio::test]
async fn test_load_normalizes_mixed_casing() {
    let api = FakeApi::start().await;
    api.seed_cart(
        "cart-1",
        json!({
            "Items": [
                { "ProductId": "p1", "ProductName": "Zinc", "Price": "10.50", "Quantity": 2, "ImageUrl": "zinc.png" },
                { "productId": "p2", "productName": "Iron", "price": 4, "quantity": "3" },
                { "productName": "No id", "price": 1, "quantity": 1 }
            ]
        }),
    );

    let storefront = api
        .storefront_with_storage(None, storage_with_cart("cart-1").await)
        .await;
    let cart = storefront.cart().snapshot();

    assert_eq!(cart.len(), 2);
    let iron = cart.find(&ProductId::new("p2")).unwrap();
    assert_eq!(iron.quantity.get(), 3);
    assert_eq!(iron.image_url, vitashop_core::PLACEHOLDER_IMAGE_URL);
    assert_eq!(cart.total_price(), Decimal::new(3300, 2));
    assert_eq!(cart.item_count(), 5);
}

// =============================================================================
// Write-through
// =============================================================================

#[tokio::test]
async fn test_add_item_writes_whole_cart() {
    let api = FakeApi::start().await;
    let storefront = api
        .storefront_with_storage(None, storage_with_cart("cart-1").await)
        .await;

    storefront
        .cart()
        .add_item(&zinc(), Quantity::new(5).unwrap())
        .await
        .unwrap();

    assert_eq!(api.cart_writes().len(), 1);
    let write = api.cart_writes().pop().unwrap();
    assert_eq!(write["Id"], "cart-1");
    let items = last_write_items(&api);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["ProductId"], "p1");
    assert_eq!(items[0]["ProductName"], "Zinc");
    assert_eq!(items[0]["Quantity"], 5);
    assert_eq!(items[0]["Price"].as_f64(), Some(10.0));
    assert_eq!(storefront.cart().total_price(), Decimal::from(50));
}

#[tokio::test]
async fn test_add_existing_item_merges_quantity() {
    let api = FakeApi::start().await;
    api.seed_cart(
        "cart-1",
        json!({ "items": [{ "productId": "p1", "productName": "Zinc", "price": 10, "quantity": 1 }] }),
    );
    let storefront = api
        .storefront_with_storage(None, storage_with_cart("cart-1").await)
        .await;

    storefront
        .cart()
        .add_item(&zinc(), Quantity::new(2).unwrap())
        .await
        .unwrap();

    let items = last_write_items(&api);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["Quantity"], 3);

    // The server copy now round-trips through a fresh load
    let reloaded = api
        .storefront_with_storage(None, storage_with_cart("cart-1").await)
        .await;
    assert_eq!(reloaded.cart().snapshot(), storefront.cart().snapshot());
}

#[tokio::test]
async fn test_update_quantity_below_one_sends_nothing() {
    let api = FakeApi::start().await;
    api.seed_cart(
        "cart-1",
        json!({ "items": [{ "productId": "p1", "productName": "Zinc", "price": 10, "quantity": 2 }] }),
    );
    let storefront = api
        .storefront_with_storage(None, storage_with_cart("cart-1").await)
        .await;

    storefront
        .cart()
        .update_quantity(&ProductId::new("p1"), 0)
        .await
        .unwrap();

    assert!(api.cart_writes().is_empty());
    assert_eq!(storefront.cart().item_count(), 2);
}

#[tokio::test]
async fn test_concurrent_adds_are_not_lost() {
    let api = FakeApi::start().await;
    let storefront = api
        .storefront_with_storage(None, storage_with_cart("cart-1").await)
        .await;

    let tasks: Vec<_> = (0..6)
        .map(|i| {
            let storefront = storefront.clone();
            tokio::spawn(async move {
                let product: ProductRef = serde_json::from_value(
                    json!({ "id": format!("p{i}"), "name": "Item", "price": 1 }),
                )
                .unwrap();
                storefront
                    .cart()
                    .add_item(&product, Quantity::new(1).unwrap())
                    .await
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    assert_eq!(storefront.cart().snapshot().len(), 6);
    assert_eq!(last_write_items(&api).len(), 6);
}

// =============================================================================
// Removal
// =============================================================================

#[tokio::test]
async fn test_remove_item_deletes_line_remotely() {
    let api = FakeApi::start().await;
    api.seed_cart(
        "cart-1",
        json!({ "items": [
            { "productId": "p1", "productName": "Zinc", "price": 10, "quantity": 1 },
            { "productId": "p2", "productName": "Iron", "price": 4, "quantity": 1 }
        ]}),
    );
    let storefront = api
        .storefront_with_storage(None, storage_with_cart("cart-1").await)
        .await;

    storefront
        .cart()
        .remove_item(&ProductId::new("p1"))
        .await
        .unwrap();

    assert_eq!(
        api.requests_to("DELETE", "/api/carts/cart-1/items/p1").len(),
        1
    );
    assert!(api.cart_writes().is_empty());
    let cart = storefront.cart().snapshot();
    assert_eq!(cart.len(), 1);
    assert!(cart.find(&ProductId::new("p1")).is_none());
}

#[tokio::test]
async fn test_remove_failure_keeps_line() {
    let api = FakeApi::start().await;
    api.seed_cart(
        "cart-1",
        json!({ "items": [{ "productId": "p1", "productName": "Zinc", "price": 10, "quantity": 1 }] }),
    );
    api.fail_line_deletes(StatusCode::INTERNAL_SERVER_ERROR);
    let storefront = api
        .storefront_with_storage(None, storage_with_cart("cart-1").await)
        .await;

    let result = storefront.cart().remove_item(&ProductId::new("p1")).await;

    assert!(matches!(result, Err(CartError::Sync(_))));
    assert!(AppError::from(result.unwrap_err()).is_fault());
    assert!(storefront.cart().snapshot().find(&ProductId::new("p1")).is_some());
}

#[tokio::test]
async fn test_clear_deletes_remote_cart() {
    let api = FakeApi::start().await;
    api.seed_cart(
        "cart-1",
        json!({ "items": [{ "productId": "p1", "productName": "Zinc", "price": 10, "quantity": 1 }] }),
    );
    let storefront = api
        .storefront_with_storage(None, storage_with_cart("cart-1").await)
        .await;

    storefront.cart().clear().await.unwrap();

    let deletes = api.requests_to("DELETE", "/api/carts");
    assert_eq!(deletes.len(), 1);
    assert_eq!(deletes[0].query.as_deref(), Some("id=cart-1"));
    assert!(api.stored_cart("cart-1").is_none());
    assert!(storefront.cart().is_empty());
    assert_eq!(storefront.cart().cart_id(), &CartId::new("cart-1"));
}
