//! Remote cart store over HTTP.

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use tracing::instrument;
use vitashop_core::{CartId, CartSnapshot, ProductId};

use super::wire::{self, CartPayload};
use super::{ApiClient, ApiError};
use crate::cart::CartStore;

#[async_trait]
impl CartStore for ApiClient {
    /// `GET /carts/{cartId}`
    #[instrument(skip(self), fields(cart_id = %cart_id))]
    async fn fetch(&self, cart_id: &CartId) -> Result<CartSnapshot, ApiError> {
        let url = self.endpoint(&["carts", cart_id.as_str()])?;
        let body: Value = self.send_json(self.request(Method::GET, url).await).await?;
        Ok(wire::normalize_cart(&body))
    }

    /// `POST /carts` with the whole cart.
    #[instrument(skip(self, snapshot), fields(cart_id = %cart_id, lines = snapshot.len()))]
    async fn replace(&self, cart_id: &CartId, snapshot: &CartSnapshot) -> Result<(), ApiError> {
        let url = self.endpoint(&["carts"])?;
        let payload = CartPayload::new(cart_id, snapshot);
        self.send_empty(self.request(Method::POST, url).await.json(&payload))
            .await
    }

    /// `DELETE /carts/{cartId}/items/{productId}`
    #[instrument(skip(self), fields(cart_id = %cart_id, product_id = %product_id))]
    async fn delete_line(&self, cart_id: &CartId, product_id: &ProductId) -> Result<(), ApiError> {
        let url = self.endpoint(&["carts", cart_id.as_str(), "items", product_id.as_str()])?;
        self.send_empty(self.request(Method::DELETE, url).await)
            .await
    }

    /// `DELETE /carts?id={cartId}`
    #[instrument(skip(self), fields(cart_id = %cart_id))]
    async fn delete_cart(&self, cart_id: &CartId) -> Result<(), ApiError> {
        let mut url = self.endpoint(&["carts"])?;
        url.query_pairs_mut().append_pair("id", cart_id.as_str());
        self.send_empty(self.request(Method::DELETE, url).await)
            .await
    }
}
