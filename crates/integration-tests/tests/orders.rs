//! Order lookup against the fake remote API.

#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;
use serde_json::json;
use vitashop_core::{OrderId, Quantity};
use vitashop_integration_tests::FakeApi;
use vitashop_storefront::Storefront;
use vitashop_storefront::api::ApiError;
use vitashop_storefront::cart::ProductRef;
use vitashop_storefront::checkout::CheckoutForm;
use vitashop_storefront::storage::{LocalStorage, keys};

async fn place_order(api: &FakeApi, token: Option<&str>) -> (Storefront, OrderId) {
    let storage = LocalStorage::in_memory();
    storage.set(keys::CART_ID, "cart-7").await.unwrap();
    let storefront = api.storefront_with_storage(token, storage).await;

    let magnesium: ProductRef =
        serde_json::from_value(json!({ "id": "p2", "name": "Magnesium", "price": 15 })).unwrap();
    storefront
        .cart()
        .add_item(&magnesium, Quantity::new(3).unwrap())
        .await
        .unwrap();

    let form = CheckoutForm {
        first_name: "Grace".to_string(),
        last_name: "Hopper".to_string(),
        email: "grace@example.com".to_string(),
        phone: "0123456789".to_string(),
        address: "2 Compiler Way".to_string(),
        message: String::new(),
    };
    let confirmation = storefront.checkout().submit(&form).await.unwrap();
    (storefront, confirmation.order.id)
}

#[tokio::test]
async fn test_placed_order_can_be_looked_up() {
    let api = FakeApi::start().await;
    let (storefront, order_id) = place_order(&api, None).await;

    let order = storefront.api().get_order(&order_id).await.unwrap();

    assert_eq!(order.id, order_id);
    assert_eq!(order.status.as_deref(), Some("Pending"));
    assert_eq!(order.customer_email.as_deref(), Some("grace@example.com"));
    assert_eq!(order.total_price.amount(), Decimal::from(45));
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].product_id.as_str(), "p2");
    assert_eq!(order.items[0].quantity.get(), 3);
    assert_eq!(api.requests_to("GET", "/api/orders/1001").len(), 1);
}

#[tokio::test]
async fn test_unknown_order_is_not_found() {
    let api = FakeApi::start().await;
    let storefront = api.storefront(None).await;

    let result = storefront.api().get_order(&OrderId::new("4242")).await;

    assert!(matches!(result, Err(ApiError::NotFound(_))));
}

#[tokio::test]
async fn test_user_orders_need_a_token() {
    let api = FakeApi::start().await;
    let (storefront, _) = place_order(&api, None).await;

    let result = storefront.api().get_user_orders().await;

    assert!(matches!(result, Err(ApiError::Api { status: 401, .. })));
}

#[tokio::test]
async fn test_user_orders_are_listed() {
    let api = FakeApi::start().await;
    let (storefront, order_id) = place_order(&api, Some("customer-token")).await;

    let orders = storefront.api().get_user_orders().await.unwrap();

    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].id, order_id);
    assert_eq!(api.placed_orders().len(), 1);

    let lookups = api.requests_to("GET", "/api/orders/user-orders");
    assert_eq!(lookups.len(), 1);
    assert_eq!(
        lookups[0].authorization.as_deref(),
        Some("Bearer customer-token")
    );
}
