//! Order submission and lookup over HTTP.

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, instrument};

use vitashop_core::OrderId;

use super::types::{Order, OrderResult};
use super::wire::{self, CheckoutPayload};
use super::{ApiClient, ApiError};
use crate::checkout::{CheckoutRequest, OrderService};

#[async_trait]
impl OrderService for ApiClient {
    /// `POST /orders/checkout`
    #[instrument(skip_all, fields(cart_id = %request.cart_id))]
    async fn checkout(&self, request: &CheckoutRequest) -> Result<OrderResult, ApiError> {
        let url = self.endpoint(&["orders", "checkout"])?;
        let payload = CheckoutPayload::from(request);
        let body: Value = self
            .send_json(self.request(Method::POST, url).await.json(&payload))
            .await?;
        wire::convert_order_result(body)
    }
}

impl ApiClient {
    /// `GET /orders/{id}`
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the server answers 404 or the body has
    /// no order identifier.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn get_order(&self, id: &OrderId) -> Result<Order, ApiError> {
        let url = self.endpoint(&["orders", id.as_str()])?;
        let body: Value = match self.send_json(self.request(Method::GET, url).await).await {
            Ok(body) => body,
            Err(ApiError::Api { status: 404, .. }) => {
                return Err(ApiError::NotFound(format!("Order not found: {id}")));
            }
            Err(e) => return Err(e),
        };

        wire::convert_order(&body).ok_or_else(|| ApiError::NotFound(format!("Order not found: {id}")))
    }

    /// `GET /orders/user-orders`
    ///
    /// The server picks the customer from the bearer token, so this needs a
    /// configured auth token.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not JSON.
    #[instrument(skip(self))]
    pub async fn get_user_orders(&self) -> Result<Vec<Order>, ApiError> {
        let url = self.endpoint(&["orders", "user-orders"])?;
        let body: Value = self.send_json(self.request(Method::GET, url).await).await?;
        let orders = wire::convert_orders(&body);
        debug!(count = orders.len(), "Loaded customer orders");
        Ok(orders)
    }
}
