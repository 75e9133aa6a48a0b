//! Wire shapes for the remote API.
//!
//! The remote service is loose about field casing (`productId` or
//! `ProductId`), identifier keys (`id` or `_id`), and value types (prices as
//! strings or numbers). Responses are read as [`serde_json::Value`] and
//! mapped onto the canonical types here; nothing outside this module sees
//! the raw shapes.
//!
//! Field lookups follow "first truthy value wins": a key holding `null`,
//! `false`, `0`, or `""` is treated as absent and the next candidate key is
//! tried.

use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;
use vitashop_core::{
    CartId, CartLine, CartSnapshot, CategoryId, OrderId, PLACEHOLDER_IMAGE_URL, Price, ProductId,
    Quantity, UNKNOWN_PRODUCT_NAME,
};

use super::ApiError;
use super::types::{Category, Order, OrderItem, OrderResult, Product, ProductPage, ProductQuery};
use crate::checkout::CheckoutRequest;

// =============================================================================
// Field Access
// =============================================================================

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        // Zero is falsy
        Value::Number(n) => n.as_f64().is_some_and(f64::is_normal),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// First truthy value among `names`.
fn field<'a>(obj: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names
        .iter()
        .filter_map(|name| obj.get(*name))
        .find(|value| is_truthy(value))
}

/// First truthy value among `names`, as a string. Numbers are stringified.
fn string_field(obj: &Map<String, Value>, names: &[&str]) -> Option<String> {
    match field(obj, names)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn u64_field(obj: &Map<String, Value>, names: &[&str]) -> Option<u64> {
    let value = field(obj, names)?;
    value
        .as_u64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
}

fn decimal_field(obj: &Map<String, Value>, names: &[&str]) -> Option<Decimal> {
    match field(obj, names)? {
        Value::Number(n) => n.as_f64().and_then(|f| Decimal::try_from(f).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn bool_field(obj: &Map<String, Value>, names: &[&str]) -> bool {
    field(obj, names).and_then(Value::as_bool).unwrap_or(false)
}

/// Array under one of `names`, or the body itself when it is an array.
fn list<'a>(body: &'a Value, names: &[&str]) -> &'a [Value] {
    match body {
        Value::Array(items) => items.as_slice(),
        Value::Object(obj) => field(obj, names)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default(),
        _ => &[],
    }
}

// =============================================================================
// Carts
// =============================================================================

/// Normalize one remote cart item into a [`CartLine`].
///
/// Returns `None` for items without a product identifier.
#[must_use]
pub fn normalize_line(item: &Map<String, Value>) -> Option<CartLine> {
    let Some(product_id) = string_field(item, &["productId", "ProductId"]) else {
        warn!(item = ?item, "Skipping cart item without a product id");
        return None;
    };

    Some(CartLine {
        product_id: ProductId::new(product_id),
        product_name: string_field(item, &["productName", "ProductName"])
            .unwrap_or_else(|| UNKNOWN_PRODUCT_NAME.to_string()),
        price: Price::coerce(field(item, &["price", "Price"])),
        quantity: Quantity::coerce(field(item, &["quantity", "Quantity"])),
        image_url: string_field(item, &["imageUrl", "ImageUrl"])
            .unwrap_or_else(|| PLACEHOLDER_IMAGE_URL.to_string()),
    })
}

/// Normalize a remote cart body (`{ items: [...] }` or `{ Items: [...] }`).
///
/// Lines repeating a product identifier are merged.
#[must_use]
pub fn normalize_cart(body: &Value) -> CartSnapshot {
    CartSnapshot::from_lines(
        list(body, &["items", "Items"])
            .iter()
            .filter_map(Value::as_object)
            .filter_map(normalize_line),
    )
}

/// Full-replace body for `POST /carts`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CartPayload<'a> {
    pub id: &'a CartId,
    pub items: Vec<CartItemPayload<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CartItemPayload<'a> {
    pub product_id: &'a ProductId,
    pub product_name: &'a str,
    pub price: Price,
    pub quantity: Quantity,
    pub image_url: &'a str,
}

impl<'a> CartPayload<'a> {
    #[must_use]
    pub fn new(cart_id: &'a CartId, snapshot: &'a CartSnapshot) -> Self {
        Self {
            id: cart_id,
            items: snapshot
                .lines()
                .iter()
                .map(|line| CartItemPayload {
                    product_id: &line.product_id,
                    product_name: &line.product_name,
                    price: line.price,
                    quantity: line.quantity,
                    image_url: &line.image_url,
                })
                .collect(),
        }
    }
}

// =============================================================================
// Orders
// =============================================================================

/// Body for `POST /orders/checkout`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutPayload<'a> {
    pub user_id: &'a CartId,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub address: &'a str,
    pub extra_message: &'a str,
    pub phone: &'a str,
}

impl<'a> From<&'a CheckoutRequest> for CheckoutPayload<'a> {
    fn from(request: &'a CheckoutRequest) -> Self {
        let customer = &request.customer;
        Self {
            user_id: &request.cart_id,
            first_name: &customer.first_name,
            last_name: &customer.last_name,
            email: customer.email.as_str(),
            address: &customer.address,
            extra_message: customer.message.as_deref().unwrap_or_default(),
            phone: &customer.phone,
        }
    }
}

/// Read the order confirmation, keeping the whole body as the echo.
///
/// # Errors
///
/// Returns `ApiError::InvalidResponse` if the body is not an object or
/// carries no order identifier.
pub fn convert_order_result(body: Value) -> Result<OrderResult, ApiError> {
    let Value::Object(echo) = body else {
        return Err(ApiError::InvalidResponse(
            "order response is not an object".to_string(),
        ));
    };

    let id = string_field(&echo, &["id", "Id", "_id", "orderId"]).ok_or_else(|| {
        ApiError::InvalidResponse("order response has no identifier".to_string())
    })?;

    Ok(OrderResult {
        id: OrderId::new(id),
        echo,
    })
}

/// Convert one order from the lookup endpoints. Returns `None` if it has no
/// identifier.
#[must_use]
pub fn convert_order(value: &Value) -> Option<Order> {
    let obj = value.as_object()?;
    let id = string_field(obj, &["id", "Id", "_id", "orderId"])?;

    Some(Order {
        id: OrderId::new(id),
        order_date: string_field(obj, &["orderDate", "OrderDate"]),
        customer_email: string_field(obj, &["customerEmail", "CustomerEmail", "email"]),
        items: list(value, &["items", "Items"])
            .iter()
            .filter_map(Value::as_object)
            .filter_map(convert_order_item)
            .collect(),
        total_price: Price::coerce(field(
            obj,
            &["totalPrice", "TotalPrice", "totalAmount", "TotalAmount"],
        )),
        status: string_field(obj, &["status", "Status"]),
    })
}

fn convert_order_item(item: &Map<String, Value>) -> Option<OrderItem> {
    let product_id = string_field(item, &["productId", "ProductId", "id", "_id"])?;
    Some(OrderItem {
        product_id: ProductId::new(product_id),
        product_name: string_field(item, &["productName", "ProductName", "name"]),
        price: field(item, &["price", "Price"]).map(|v| Price::coerce(Some(v))),
        quantity: Quantity::coerce(field(item, &["quantity", "Quantity"])),
    })
}

/// Convert an order list (bare array, `{ items }`, or `{ orders }`).
#[must_use]
pub fn convert_orders(body: &Value) -> Vec<Order> {
    list(body, &["items", "orders", "Items", "Orders"])
        .iter()
        .filter_map(convert_order)
        .collect()
}

// =============================================================================
// Catalog
// =============================================================================

/// Convert one product object. Returns `None` if it has no identifier.
#[must_use]
pub fn convert_product(value: &Value) -> Option<Product> {
    let obj = value.as_object()?;
    let id = string_field(obj, &["id", "_id", "Id"])?;

    Some(Product {
        id: ProductId::new(id),
        name: string_field(obj, &["name", "Name"]).unwrap_or_default(),
        description: string_field(obj, &["description", "Description"]),
        price: Price::coerce(field(obj, &["price", "Price"])),
        image_url: string_field(obj, &["imageUrl", "image", "ImageUrl"]),
        category_id: string_field(obj, &["categoryId", "CategoryId"]).map(CategoryId::new),
        category: string_field(obj, &["category", "Category"]),
        rating: decimal_field(obj, &["rating", "Rating"]),
        review_count: u64_field(obj, &["reviewCount", "ReviewCount"])
            .and_then(|n| u32::try_from(n).ok()),
        tag: string_field(obj, &["tag", "Tag"]),
        is_new: bool_field(obj, &["isNew", "IsNew"]),
        is_limited: bool_field(obj, &["isLimited", "IsLimited"]),
        features: field(obj, &["features", "Features"])
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
    })
}

/// Convert a product listing.
///
/// Accepts `{ items, totalCount, pageNumber, pageSize }`, the older
/// `{ products, total, currentPage, hasMore }`, or a bare array. Missing
/// paging fields fall back to what was requested.
#[must_use]
pub fn convert_product_page(body: &Value, query: &ProductQuery) -> ProductPage {
    let items: Vec<Product> = list(body, &["items", "products", "Items"])
        .iter()
        .filter_map(convert_product)
        .collect();

    let obj = body.as_object();
    let number = |names: &[&str]| obj.and_then(|o| u64_field(o, names));

    ProductPage {
        total_count: number(&["totalCount", "total", "TotalCount"])
            .unwrap_or(items.len() as u64),
        page_number: number(&["pageNumber", "currentPage", "PageNumber"])
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(query.page_number),
        page_size: number(&["pageSize", "PageSize"])
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(query.page_size),
        has_more: obj.and_then(|o| o.get("hasMore")).and_then(Value::as_bool),
        items,
    }
}

/// Convert a category list (bare array or `{ items }`).
#[must_use]
pub fn convert_categories(body: &Value) -> Vec<Category> {
    list(body, &["items", "categories", "Items"])
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|obj| {
            Some(Category {
                id: CategoryId::new(string_field(obj, &["id", "_id", "Id"])?),
                name: string_field(obj, &["name", "Name"]).unwrap_or_default(),
            })
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use vitashop_core::Email;

    use super::*;
    use crate::checkout::CustomerDetails;

    #[test]
    fn test_convert_order_mixed_casing() {
        let order = convert_order(&json!({
            "Id": 42,
            "OrderDate": "2026-01-05T10:00:00Z",
            "customerEmail": "ada@example.com",
            "Items": [
                { "ProductId": "p1", "ProductName": "Zinc", "Price": "10.50", "Quantity": 2 },
                { "productName": "No id", "quantity": 1 }
            ],
            "totalPrice": 21,
            "status": "Pending"
        }))
        .unwrap();

        assert_eq!(order.id.as_str(), "42");
        assert_eq!(order.order_date.as_deref(), Some("2026-01-05T10:00:00Z"));
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].quantity.get(), 2);
        assert_eq!(order.items[0].price, Some(Price::new(Decimal::new(1050, 2)).unwrap()));
        assert_eq!(order.total_price, Price::from(21));
        assert_eq!(order.status.as_deref(), Some("Pending"));
    }

    #[test]
    fn test_convert_order_without_id() {
        assert!(convert_order(&json!({ "status": "Pending" })).is_none());
        assert!(convert_order(&json!("nope")).is_none());
    }

    #[test]
    fn test_convert_orders_shapes() {
        let bare = json!([{ "id": "a" }, { "id": "b" }, { "status": "no id" }]);
        assert_eq!(convert_orders(&bare).len(), 2);

        let wrapped = json!({ "orders": [{ "id": "a" }] });
        assert_eq!(convert_orders(&wrapped)[0].id.as_str(), "a");

        assert!(convert_orders(&json!({})).is_empty());
    }

    #[test]
    fn test_normalize_mixed_casing() {
        let body = json!({
            "Items": [
                { "productId": "p1", "productName": "Zinc", "price": "10.5", "quantity": "2", "imageUrl": "a.png" },
                { "ProductId": 7, "ProductName": "Magnesium", "Price": 3, "Quantity": 1, "ImageUrl": "b.png" }
            ]
        });

        let cart = normalize_cart(&body);
        assert_eq!(cart.len(), 2);

        let first = &cart.lines()[0];
        assert_eq!(first.product_id.as_str(), "p1");
        assert_eq!(first.price.amount(), Decimal::new(105, 1));
        assert_eq!(first.quantity.get(), 2);

        let second = &cart.lines()[1];
        assert_eq!(second.product_id.as_str(), "7");
        assert_eq!(second.product_name, "Magnesium");
        assert_eq!(second.image_url, "b.png");
    }

    #[test]
    fn test_normalize_applies_defaults() {
        let body = json!({ "items": [ { "productId": "p1" } ] });
        let line = normalize_cart(&body).into_lines().remove(0);
        assert_eq!(line.product_name, UNKNOWN_PRODUCT_NAME);
        assert_eq!(line.image_url, PLACEHOLDER_IMAGE_URL);
        assert_eq!(line.price, Price::ZERO);
        assert_eq!(line.quantity, Quantity::ONE);
    }

    #[test]
    fn test_normalize_empty_camel_falls_through_to_pascal() {
        let body = json!({ "items": [ { "productId": "", "ProductId": "p9", "productName": "" , "ProductName": "Iron" } ] });
        let line = normalize_cart(&body).into_lines().remove(0);
        assert_eq!(line.product_id.as_str(), "p9");
        assert_eq!(line.product_name, "Iron");
    }

    #[test]
    fn test_normalize_skips_lines_without_id_and_merges_duplicates() {
        let body = json!({ "items": [
            { "productName": "orphan" },
            { "productId": "p1", "quantity": 2 },
            { "ProductId": "p1", "Quantity": 3 }
        ]});
        let cart = normalize_cart(&body);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.lines()[0].quantity.get(), 5);
    }

    #[test]
    fn test_normalize_unexpected_bodies() {
        assert!(normalize_cart(&json!(null)).is_empty());
        assert!(normalize_cart(&json!({})).is_empty());
        assert!(normalize_cart(&json!({ "items": "nope" })).is_empty());
    }

    #[test]
    fn test_cart_payload_is_pascal_case() {
        let cart_id = CartId::new("c1");
        let cart = normalize_cart(&json!({ "items": [
            { "productId": "p1", "productName": "Zinc", "price": 10, "quantity": 2, "imageUrl": "a.png" }
        ]}));

        let json = serde_json::to_value(CartPayload::new(&cart_id, &cart)).unwrap();
        assert_eq!(
            json,
            json!({
                "Id": "c1",
                "Items": [
                    { "ProductId": "p1", "ProductName": "Zinc", "Price": 10.0, "Quantity": 2, "ImageUrl": "a.png" }
                ]
            })
        );
    }

    #[test]
    fn test_checkout_payload_shape() {
        let request = CheckoutRequest {
            cart_id: CartId::new("c1"),
            customer: CustomerDetails {
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                email: Email::parse("ada@example.com").unwrap(),
                phone: "0123456789".to_string(),
                address: "1 Analytical St".to_string(),
                message: None,
            },
        };

        let json = serde_json::to_value(CheckoutPayload::from(&request)).unwrap();
        assert_eq!(json["userId"], "c1");
        assert_eq!(json["firstName"], "Ada");
        assert_eq!(json["lastName"], "Lovelace");
        assert_eq!(json["email"], "ada@example.com");
        assert_eq!(json["extraMessage"], "");
        assert_eq!(json["phone"], "0123456789");
    }

    #[test]
    fn test_order_result() {
        let result = convert_order_result(json!({ "id": 42, "email": "a@b.co" })).unwrap();
        assert_eq!(result.id.as_str(), "42");
        assert_eq!(result.echo["email"], "a@b.co");

        assert!(matches!(
            convert_order_result(json!({ "email": "a@b.co" })),
            Err(ApiError::InvalidResponse(_))
        ));
        assert!(convert_order_result(json!("ok")).is_err());
    }

    #[test]
    fn test_convert_product_aliases() {
        let product = convert_product(&json!({
            "_id": "abc",
            "name": "Collagen",
            "price": "24.99",
            "image": "c.png",
            "isNew": true,
            "features": ["vegan", 3, "gluten free"],
            "reviewCount": 12
        }))
        .unwrap();

        assert_eq!(product.id.as_str(), "abc");
        assert_eq!(product.image_url.as_deref(), Some("c.png"));
        assert_eq!(product.price.amount(), Decimal::new(2499, 2));
        assert!(product.is_new);
        assert!(!product.is_limited);
        assert_eq!(product.features, vec!["vegan", "gluten free"]);
        assert_eq!(product.review_count, Some(12));

        assert!(convert_product(&json!({ "name": "no id" })).is_none());
    }

    #[test]
    fn test_convert_product_page_shapes() {
        let query = ProductQuery::default();

        let page = convert_product_page(
            &json!({ "items": [{ "id": "1" }], "totalCount": 13, "pageNumber": 2, "pageSize": 6 }),
            &query,
        );
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total_count, 13);
        assert_eq!(page.page_number, 2);
        assert!(page.has_next());

        let legacy = convert_product_page(
            &json!({ "products": [{ "id": "1" }, { "id": "2" }], "total": 2, "currentPage": 1, "hasMore": false }),
            &query,
        );
        assert_eq!(legacy.items.len(), 2);
        assert_eq!(legacy.page_size, 6);
        assert_eq!(legacy.has_more, Some(false));

        let bare = convert_product_page(&json!([{ "id": "1" }]), &query);
        assert_eq!(bare.total_count, 1);
        assert_eq!(bare.page_number, 1);
    }

    #[test]
    fn test_convert_categories() {
        let categories = convert_categories(&json!([
            { "id": 1, "name": "Marine" },
            { "name": "no id" },
            { "_id": "c2", "Name": "Bone" }
        ]));
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].id.as_str(), "1");
        assert_eq!(categories[1].name, "Bone");
    }
}
