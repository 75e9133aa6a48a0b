//! Remote cart store port and the product shapes accepted by `add_item`.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use vitashop_core::{
    CartId, CartLine, CartSnapshot, PLACEHOLDER_IMAGE_URL, Price, ProductId, Quantity,
    UNKNOWN_PRODUCT_NAME,
};

use crate::api::{ApiError, Product};

/// Remote storage for carts, keyed by cart identifier.
///
/// [`crate::api::ApiClient`] is the HTTP implementation; tests use
/// in-memory fakes.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Fetch the cart, already normalized.
    async fn fetch(&self, cart_id: &CartId) -> Result<CartSnapshot, ApiError>;

    /// Replace the whole remote cart with `snapshot`.
    async fn replace(&self, cart_id: &CartId, snapshot: &CartSnapshot) -> Result<(), ApiError>;

    /// Delete one line.
    async fn delete_line(&self, cart_id: &CartId, product_id: &ProductId) -> Result<(), ApiError>;

    /// Delete the whole cart.
    async fn delete_cart(&self, cart_id: &CartId) -> Result<(), ApiError>;
}

/// Anything that can be put in the cart.
///
/// Product records from different sources disagree on key names, so the
/// identifier is taken from the first of `id`, `_id`, `productId` that is
/// present and non-empty. Deserializes from any of those JSON shapes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRef {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<String>,
    #[serde(rename = "_id", default, deserialize_with = "lenient_id")]
    pub underscore_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub product_id: Option<String>,
    pub name: Option<String>,
    pub product_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_price")]
    pub price: Option<Price>,
    pub image_url: Option<String>,
    pub image: Option<String>,
}

fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_price<'de, D>(deserializer: D) -> Result<Option<Price>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.map(|v| Price::coerce(Some(&v))))
}

fn first_non_empty<'a>(candidates: &[Option<&'a str>]) -> Option<&'a str> {
    candidates
        .iter()
        .flatten()
        .copied()
        .find(|s| !s.is_empty())
}

impl ProductRef {
    /// The canonical product identifier, if any key carries one.
    #[must_use]
    pub fn canonical_id(&self) -> Option<ProductId> {
        first_non_empty(&[
            self.id.as_deref(),
            self.underscore_id.as_deref(),
            self.product_id.as_deref(),
        ])
        .map(ProductId::new)
    }

    /// Build a new cart line with defaults applied. Quantity is left at one.
    #[must_use]
    pub(crate) fn to_line(&self, product_id: ProductId) -> CartLine {
        CartLine {
            product_id,
            product_name: first_non_empty(&[self.name.as_deref(), self.product_name.as_deref()])
                .unwrap_or(UNKNOWN_PRODUCT_NAME)
                .to_string(),
            price: self.price.unwrap_or(Price::ZERO),
            quantity: Quantity::ONE,
            image_url: first_non_empty(&[self.image_url.as_deref(), self.image.as_deref()])
                .unwrap_or(PLACEHOLDER_IMAGE_URL)
                .to_string(),
        }
    }
}

impl From<&Product> for ProductRef {
    fn from(product: &Product) -> Self {
        Self {
            id: Some(product.id.to_string()),
            name: Some(product.name.clone()),
            price: Some(product.price),
            image_url: product.image_url.clone(),
            ..Self::default()
        }
    }
}

impl From<&CartLine> for ProductRef {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: Some(line.product_id.to_string()),
            product_name: Some(line.product_name.clone()),
            price: Some(line.price),
            image_url: Some(line.image_url.clone()),
            ..Self::default()
        }
    }
}
