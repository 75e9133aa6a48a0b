//! Checkout against the fake remote API.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::json;
use vitashop_core::{Quantity, SubmissionState};
use vitashop_integration_tests::FakeApi;
use vitashop_storefront::Storefront;
use vitashop_storefront::cart::ProductRef;
use vitashop_storefront::checkout::{CheckoutError, CheckoutForm, FAILED_ORDER_MESSAGE};
use vitashop_storefront::storage::{LocalStorage, keys};

fn valid_form() -> CheckoutForm {
    CheckoutForm {
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        phone: "0123456789".to_string(),
        address: "1 Analytical St".to_string(),
        message: String::new(),
    }
}

async fn storefront_with_zinc(api: &FakeApi) -> Storefront {
    let storage = LocalStorage::in_memory();
    storage.set(keys::CART_ID, "cart-1").await.unwrap();
    let storefront = api.storefront_with_storage(None, storage).await;

    let zinc: ProductRef =
        serde_json::from_value(json!({ "id": "p1", "name": "Zinc", "price": 10 })).unwrap();
    storefront
        .cart()
        .add_item(&zinc, Quantity::new(2).unwrap())
        .await
        .unwrap();
    storefront
}

#[tokio::test]
async fn test_checkout_places_order_and_clears_cart() {
    let api = FakeApi::start().await;
    let storefront = storefront_with_zinc(&api).await;
    let session = storefront.checkout();

    let confirmation = session.submit(&valid_form()).await.unwrap();

    assert_eq!(confirmation.message, "Order #1001 placed successfully!");
    assert_eq!(confirmation.order.id.as_str(), "1001");
    assert_eq!(
        session.state(),
        SubmissionState::Succeeded {
            order_id: "1001".to_string()
        }
    );

    let orders = api.orders();
    assert_eq!(orders.len(), 1);
    assert_eq!(
        orders[0],
        json!({
            "userId": "cart-1",
            "firstName": "Ada",
            "lastName": "Lovelace",
            "email": "ada@example.com",
            "address": "1 Analytical St",
            "extraMessage": "",
            "phone": "0123456789"
        })
    );

    assert!(storefront.cart().is_empty());
    assert!(api.stored_cart("cart-1").is_none());
}

#[tokio::test]
async fn test_checkout_server_error_message_is_shown() {
    let api = FakeApi::start().await;
    api.fail_checkout(
        StatusCode::BAD_REQUEST,
        json!({ "error": "Zinc is out of stock" }),
    );
    let storefront = storefront_with_zinc(&api).await;
    let session = storefront.checkout();

    let result = session.submit(&valid_form()).await;

    assert!(
        matches!(result, Err(CheckoutError::Order { ref message, .. }) if message == "Zinc is out of stock")
    );
    // Failed is published, then the form is editable again
    assert_eq!(session.state(), SubmissionState::Idle);
    assert_eq!(
        session.error_message().as_deref(),
        Some("Zinc is out of stock")
    );
    // Cart survives a failed order
    assert_eq!(storefront.cart().item_count(), 2);
    assert!(api.stored_cart("cart-1").is_some());
}

#[tokio::test]
async fn test_checkout_falls_back_to_generic_message() {
    let api = FakeApi::start().await;
    api.fail_checkout(StatusCode::INTERNAL_SERVER_ERROR, json!({}));
    let storefront = storefront_with_zinc(&api).await;
    let session = storefront.checkout();

    let result = session.submit(&valid_form()).await;

    assert!(
        matches!(result, Err(CheckoutError::Order { ref message, .. }) if message == FAILED_ORDER_MESSAGE)
    );
    assert!(session.state().accepts_submission());
    assert_eq!(session.error_message().as_deref(), Some(FAILED_ORDER_MESSAGE));
}

#[tokio::test]
async fn test_invalid_form_never_reaches_server() {
    let api = FakeApi::start().await;
    let storefront = storefront_with_zinc(&api).await;
    let session = storefront.checkout();

    let form = CheckoutForm {
        email: "not-an-email".to_string(),
        phone: "12345".to_string(),
        ..valid_form()
    };
    let result = session.submit(&form).await;

    let Err(CheckoutError::Invalid(errors)) = result else {
        panic!("expected validation errors, got {result:?}");
    };
    assert_eq!(errors.len(), 2);
    assert!(api.requests_to("POST", "/api/orders/checkout").is_empty());
    assert_eq!(session.state(), SubmissionState::Idle);
}

#[tokio::test]
async fn test_empty_cart_never_reaches_server() {
    let api = FakeApi::start().await;
    let storefront = api.storefront(None).await;
    let session = storefront.checkout();

    let result = session.submit(&valid_form()).await;

    assert!(matches!(result, Err(CheckoutError::EmptyCart)));
    assert!(api.orders().is_empty());
}
