//! Favorite products, kept in local storage.
//!
//! Stored under [`keys::FAVORITES`] as a JSON list of product IDs.

use std::collections::BTreeSet;

use tracing::{debug, instrument, warn};
use vitashop_core::ProductId;

use crate::storage::{LocalStorage, StorageError, keys};

/// The customer's favorite products.
#[derive(Debug, Clone)]
pub struct Favorites {
    storage: LocalStorage,
    ids: BTreeSet<ProductId>,
}

impl Favorites {
    /// Load favorites from storage.
    ///
    /// A missing or unreadable value loads as the empty set.
    #[instrument(skip_all)]
    pub async fn load(storage: LocalStorage) -> Self {
        let ids = match storage.get(keys::FAVORITES).await {
            None => BTreeSet::new(),
            Some(raw) => serde_json::from_str::<Vec<ProductId>>(&raw).map_or_else(
                |e| {
                    warn!(error = %e, "Stored favorites are corrupt; starting empty");
                    BTreeSet::new()
                },
                |ids| ids.into_iter().collect(),
            ),
        };

        debug!(count = ids.len(), "Favorites loaded");
        Self { storage, ids }
    }

    /// Add or remove `id` and persist. Returns whether it is now a favorite.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be written; the in-memory set is
    /// left unchanged in that case.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn toggle(&mut self, id: &ProductId) -> Result<bool, StorageError> {
        let mut next = self.ids.clone();
        let added = if next.remove(id) {
            false
        } else {
            next.insert(id.clone());
            true
        };

        let ids: Vec<&ProductId> = next.iter().collect();
        let raw = serde_json::to_string(&ids).map_err(|source| StorageError::Corrupt {
            path: self.storage.path().map(ToOwned::to_owned).unwrap_or_default(),
            source,
        })?;
        self.storage.set(keys::FAVORITES, raw).await?;

        self.ids = next;
        Ok(added)
    }

    #[must_use]
    pub fn contains(&self, id: &ProductId) -> bool {
        self.ids.contains(id)
    }

    /// Favorite IDs in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &ProductId> {
        self.ids.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
