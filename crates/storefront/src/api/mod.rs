//! HTTP client for the remote storefront API.
//!
//! # Architecture
//!
//! - One shared `reqwest::Client` behind an `Arc`, cheap to clone
//! - Endpoint URLs are built from the configured base URL by appending path
//!   segments, so callers never format URLs by hand
//! - Requests to `/api/` paths carry the bearer token from local storage
//! - Product lookups are cached in memory via `moka` (5 minute TTL)
//! - Cart and order calls are never cached
//!
//! # Endpoints
//!
//! - [`catalog`] - products and categories
//! - [`carts`] - the remote cart store (implements [`crate::cart::CartStore`])
//! - [`orders`] - checkout submission (implements [`crate::checkout::OrderService`])
//! - [`wire`] - payload shapes and the field-casing adapter

mod cache;
pub mod carts;
pub mod catalog;
pub mod orders;
pub mod types;
pub mod wire;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::Method;
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::config::StorefrontConfig;
use crate::storage::{LocalStorage, keys};

use cache::{CacheKey, CacheValue};

pub use types::{
    Category, Order, OrderItem, OrderResult, Product, ProductPage, ProductQuery,
    fallback_categories,
};

/// Path marker identifying requests that carry the bearer token.
const API_PATH_MARKER: &str = "/api/";

/// Errors that can occur when talking to the remote API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connection, timeout, TLS, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Response parsed but is missing required data.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The configured base URL cannot take path segments.
    #[error("Invalid URL: {0}")]
    Url(String),
}

impl ApiError {
    /// Human-readable message supplied by the server, if any.
    ///
    /// The body of an error response may be a bare string, a JSON string, or
    /// a JSON object with a `message`, `error`, or `title` field.
    #[must_use]
    pub fn server_message(&self) -> Option<String> {
        let Self::Api { message, .. } = self else {
            return None;
        };
        let trimmed = message.trim();
        if trimmed.is_empty() {
            return None;
        }

        match serde_json::from_str::<serde_json::Value>(trimmed) {
            Ok(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s),
            Ok(serde_json::Value::Object(map)) => ["message", "error", "title"]
                .iter()
                .find_map(|key| map.get(*key).and_then(serde_json::Value::as_str))
                .filter(|s| !s.trim().is_empty())
                .map(str::to_string),
            Ok(_) => None,
            Err(_) => Some(trimmed.to_string()),
        }
    }

    /// HTTP status of a remote error response.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Client for the remote storefront API.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    storage: LocalStorage,
    cache: Cache<CacheKey, CacheValue>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// The bearer token is read from `storage` on every request, so a token
    /// written after construction is picked up immediately.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &StorefrontConfig, storage: LocalStorage) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.api_url.clone(),
                storage,
                cache,
            }),
        })
    }

    /// Base URL all endpoints are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Build an endpoint URL by appending path segments to the base URL.
    ///
    /// Segments are percent-encoded, so IDs may contain any characters.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::Url(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Start a request, attaching the bearer token for API paths.
    async fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        let is_api_request = url.path().contains(API_PATH_MARKER);
        let mut builder = self.inner.client.request(method, url);

        if is_api_request
            && let Some(token) = self.inner.storage.get_secret(keys::AUTH_TOKEN).await
        {
            builder = builder.bearer_auth(token.expose_secret());
        }

        builder
    }

    /// Send a request and turn non-success statuses into [`ApiError::Api`].
    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::warn!(
                status = %status,
                body = %message.chars().take(500).collect::<String>(),
                "API returned non-success status"
            );
            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }

    /// Send a request and decode a JSON body.
    async fn send_json<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = self.send(builder).await?;
        let text = response.text().await?;

        serde_json::from_str(&text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %text.chars().take(500).collect::<String>(),
                "Failed to parse API response"
            );
            ApiError::Parse(e)
        })
    }

    /// Send a request whose response body is ignored.
    async fn send_empty(&self, builder: reqwest::RequestBuilder) -> Result<(), ApiError> {
        let response = self.send(builder).await?;
        debug!(status = %response.status(), "Request succeeded");
        Ok(())
    }
}
