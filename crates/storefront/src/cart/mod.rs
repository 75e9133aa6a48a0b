//! Cart synchronization.
//!
//! [`CartSync`] owns the client's view of the cart and keeps it in step with
//! the remote cart store:
//!
//! - The cart identifier is generated once and kept in local storage
//! - Reads are served from the latest published [`CartSnapshot`]
//! - Adds and quantity changes send the whole cart (`POST /carts`) and
//!   publish exactly what was sent once the store accepts it
//! - Removes and clears call the store's delete endpoints first
//! - A failed remote call leaves the published snapshot untouched
//!
//! Mutations are serialized through a FIFO lock held across the whole
//! read-modify-write, so each one starts from the snapshot the previous one
//! published.

mod store;
#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use rust_decimal::Decimal;
use thiserror::Error;
use tokio::sync::{Mutex, watch};
use tracing::{debug, error, info, instrument, warn};
use vitashop_core::{CartId, CartSnapshot, ProductId, Quantity};

use crate::api::ApiError;
use crate::storage::{LocalStorage, keys};

pub use store::{CartStore, ProductRef};

/// Errors returned by cart mutations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The product passed to `add_item` carries no identifier.
    #[error("Product has no identifier")]
    MissingProductId,

    /// The remote store rejected or failed the change.
    #[error("Cart sync failed: {0}")]
    Sync(#[from] ApiError),
}

/// Client-side cart, synchronized with a [`CartStore`].
///
/// Cheaply cloneable; clones share the same state.
#[derive(Clone)]
pub struct CartSync {
    inner: Arc<CartSyncInner>,
}

struct CartSyncInner {
    cart_id: CartId,
    store: Arc<dyn CartStore>,
    snapshot: watch::Sender<CartSnapshot>,
    mutations: Mutex<()>,
}

impl CartSync {
    /// Create a cart for `cart_id` with an empty snapshot. Nothing is fetched.
    #[must_use]
    pub fn new(cart_id: CartId, store: Arc<dyn CartStore>) -> Self {
        let (snapshot, _) = watch::channel(CartSnapshot::empty());
        Self {
            inner: Arc::new(CartSyncInner {
                cart_id,
                store,
                snapshot,
                mutations: Mutex::new(()),
            }),
        }
    }

    /// Obtain or create the cart identifier, then load the remote cart.
    ///
    /// Never fails. If the identifier cannot be persisted the generated one
    /// is still used for this session; if the fetch fails the cart starts
    /// empty.
    #[instrument(skip_all)]
    pub async fn initialize(storage: &LocalStorage, store: Arc<dyn CartStore>) -> Self {
        let cart_id = match storage
            .get(keys::CART_ID)
            .await
            .filter(|id| !id.trim().is_empty())
        {
            Some(id) => CartId::new(id),
            None => {
                let id = CartId::generate();
                match storage.set(keys::CART_ID, id.as_str()).await {
                    Ok(()) => info!(cart_id = %id, "Created cart identifier"),
                    Err(e) => warn!(
                        cart_id = %id,
                        error = %e,
                        "Failed to persist cart identifier; using it for this session only"
                    ),
                }
                id
            }
        };

        let cart = Self::new(cart_id, store);
        cart.refresh().await;
        cart
    }

    /// Re-fetch the remote cart and publish it.
    ///
    /// On failure the cart is reset to empty.
    #[instrument(skip(self), fields(cart_id = %self.inner.cart_id))]
    pub async fn refresh(&self) {
        let _guard = self.inner.mutations.lock().await;

        let snapshot = match self.inner.store.fetch(&self.inner.cart_id).await {
            Ok(snapshot) => {
                debug!(lines = snapshot.len(), "Cart loaded");
                snapshot
            }
            Err(e) => {
                warn!(error = %e, "Failed to load cart; starting empty");
                CartSnapshot::empty()
            }
        };

        self.inner.snapshot.send_replace(snapshot);
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add `quantity` units of `product`.
    ///
    /// An existing line for the same product is incremented; otherwise a new
    /// line is appended. There is no upper bound on quantity here.
    ///
    /// # Errors
    ///
    /// Returns `CartError::MissingProductId` if `product` has no identifier,
    /// or `CartError::Sync` if the store rejects the new cart.
    #[instrument(skip(self, product), fields(cart_id = %self.inner.cart_id, quantity = %quantity))]
    pub async fn add_item(&self, product: &ProductRef, quantity: Quantity) -> Result<(), CartError> {
        let Some(product_id) = product.canonical_id() else {
            warn!("Refusing to add a product without an identifier");
            return Err(CartError::MissingProductId);
        };

        let _guard = self.inner.mutations.lock().await;
        let line = product.to_line(product_id);
        let next = self.snapshot().with_added(line, quantity);
        self.write_through(next).await
    }

    /// Set the quantity of an existing line.
    ///
    /// A quantity below one, or a product not in the cart, is logged and
    /// ignored without contacting the store.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Sync` if the store rejects the new cart.
    #[instrument(skip(self), fields(cart_id = %self.inner.cart_id))]
    pub async fn update_quantity(
        &self,
        product_id: &ProductId,
        quantity: i64,
    ) -> Result<(), CartError> {
        let Some(quantity) = u32::try_from(quantity).ok().and_then(Quantity::new) else {
            warn!("Ignoring invalid quantity");
            return Ok(());
        };

        let _guard = self.inner.mutations.lock().await;
        let Some(next) = self.snapshot().with_quantity(product_id, quantity) else {
            warn!("Product not in cart; nothing to update");
            return Ok(());
        };
        self.write_through(next).await
    }

    /// Remove a line from the remote cart, then locally.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Sync` if the delete fails; the snapshot is left
    /// as it was.
    #[instrument(skip(self), fields(cart_id = %self.inner.cart_id))]
    pub async fn remove_item(&self, product_id: &ProductId) -> Result<(), CartError> {
        let _guard = self.inner.mutations.lock().await;

        if let Err(e) = self
            .inner
            .store
            .delete_line(&self.inner.cart_id, product_id)
            .await
        {
            error!(error = %e, "Failed to remove cart line");
            return Err(e.into());
        }

        let next = self.snapshot().without(product_id);
        self.inner.snapshot.send_replace(next);
        Ok(())
    }

    /// Delete the whole remote cart, then empty the snapshot.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Sync` if the delete fails; the snapshot is left
    /// as it was.
    #[instrument(skip(self), fields(cart_id = %self.inner.cart_id))]
    pub async fn clear(&self) -> Result<(), CartError> {
        let _guard = self.inner.mutations.lock().await;

        if let Err(e) = self.inner.store.delete_cart(&self.inner.cart_id).await {
            error!(error = %e, "Failed to clear cart");
            return Err(e.into());
        }

        self.inner.snapshot.send_replace(CartSnapshot::empty());
        info!("Cart cleared");
        Ok(())
    }

    /// Send `next` as the whole cart and publish it on success.
    ///
    /// Callers must hold the mutation lock.
    async fn write_through(&self, next: CartSnapshot) -> Result<(), CartError> {
        match self.inner.store.replace(&self.inner.cart_id, &next).await {
            Ok(()) => {
                debug!(lines = next.len(), "Cart saved");
                self.inner.snapshot.send_replace(next);
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Failed to save cart");
                Err(e.into())
            }
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    #[must_use]
    pub fn cart_id(&self) -> &CartId {
        &self.inner.cart_id
    }

    /// The latest published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        self.inner.snapshot.borrow().clone()
    }

    /// Observe every snapshot published from now on.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartSnapshot> {
        self.inner.snapshot.subscribe()
    }

    /// Sum of price x quantity. No I/O.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.inner.snapshot.borrow().total_price()
    }

    /// Sum of quantities. No I/O.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.inner.snapshot.borrow().item_count()
    }

    /// Number of distinct lines, as shown on the cart badge. No I/O.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.inner.snapshot.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.snapshot.borrow().is_empty()
    }
}

impl std::fmt::Debug for CartSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartSync")
            .field("cart_id", &self.inner.cart_id)
            .field("lines", &self.inner.snapshot.borrow().len())
            .finish_non_exhaustive()
    }
}
