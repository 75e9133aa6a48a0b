//! Storefront client state shared across front-end commands.

use std::sync::Arc;

use secrecy::ExposeSecret;
use tracing::{info, instrument};

use crate::api::ApiClient;
use crate::cart::CartSync;
use crate::checkout::CheckoutSession;
use crate::config::StorefrontConfig;
use crate::error::Result;
use crate::favorites::Favorites;
use crate::storage::{LocalStorage, keys};

/// Everything a front end needs: configuration, storage, the API client, and
/// the synchronized cart.
///
/// This struct is cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct Storefront {
    inner: Arc<StorefrontInner>,
}

struct StorefrontInner {
    config: StorefrontConfig,
    storage: LocalStorage,
    api: ApiClient,
    cart: CartSync,
}

impl Storefront {
    /// Open local storage, build the API client, and load the cart.
    ///
    /// A configured auth token is written to storage before anything is
    /// fetched.
    ///
    /// # Errors
    ///
    /// Returns an error if local storage cannot be opened or written, or the
    /// HTTP client cannot be built. A failed cart fetch is not an error.
    #[instrument(skip_all, fields(api_url = %config.api_url))]
    pub async fn connect(config: StorefrontConfig) -> Result<Self> {
        let storage = LocalStorage::open(&config.data_dir).await?;
        Self::with_storage(config, storage).await
    }

    /// Like [`Storefront::connect`] but with an existing storage handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the auth token cannot be stored or the HTTP
    /// client cannot be built.
    pub async fn with_storage(config: StorefrontConfig, storage: LocalStorage) -> Result<Self> {
        if let Some(token) = &config.auth_token {
            storage
                .set(keys::AUTH_TOKEN, token.expose_secret())
                .await?;
        }

        let api = ApiClient::new(&config, storage.clone())?;
        let cart = CartSync::initialize(&storage, Arc::new(api.clone())).await;

        info!(
            cart_id = %cart.cart_id(),
            lines = cart.snapshot().len(),
            "Storefront ready"
        );

        Ok(Self {
            inner: Arc::new(StorefrontInner {
                config,
                storage,
                api,
                cart,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn storage(&self) -> &LocalStorage {
        &self.inner.storage
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    #[must_use]
    pub fn cart(&self) -> &CartSync {
        &self.inner.cart
    }

    /// Start a checkout for the current cart.
    #[must_use]
    pub fn checkout(&self) -> CheckoutSession {
        CheckoutSession::new(self.inner.cart.clone(), Arc::new(self.inner.api.clone()))
    }

    /// Load the favorites set.
    pub async fn favorites(&self) -> Favorites {
        Favorites::load(self.inner.storage.clone()).await
    }
}
