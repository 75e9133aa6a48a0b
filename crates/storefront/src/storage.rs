//! Durable client-local key/value storage.
//!
//! Stores string values under string keys in a single JSON object file
//! (`<data_dir>/storage.json`). Every write replaces the file atomically by
//! writing a sibling temp file and renaming it over the original.
//!
//! An in-memory variant is available for tests and throwaway sessions.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use secrecy::SecretString;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// File name of the storage document inside the data directory.
pub const STORAGE_FILE: &str = "storage.json";

/// Well-known storage keys.
pub mod keys {
    /// Key for the locally generated cart identifier.
    pub const CART_ID: &str = "cart_id";

    /// Key for the favorites set, stored as a JSON list of product IDs.
    pub const FAVORITES: &str = "favoriteProducts";

    /// Key for the API bearer token.
    pub const AUTH_TOKEN: &str = "authToken";
}

/// Errors that can occur when reading or writing local storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The storage file exists but is not a JSON object of strings.
    #[error("Corrupt storage file {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Client-local key/value store.
///
/// Cheaply cloneable; clones share the same entries and file.
#[derive(Clone)]
pub struct LocalStorage {
    inner: Arc<LocalStorageInner>,
}

struct LocalStorageInner {
    path: Option<PathBuf>,
    entries: RwLock<BTreeMap<String, String>>,
}

impl LocalStorage {
    /// Open (or create) the storage file in `data_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created, the file cannot
    /// be read, or its contents are not a JSON object of strings.
    #[instrument(skip_all, fields(data_dir = %data_dir.display()))]
    pub async fn open(data_dir: &Path) -> Result<Self, StorageError> {
        tokio::fs::create_dir_all(data_dir)
            .await
            .map_err(|source| StorageError::Io {
                path: data_dir.to_path_buf(),
                source,
            })?;

        let path = data_dir.join(STORAGE_FILE);
        let entries = match tokio::fs::read_to_string(&path).await {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => {
                serde_json::from_str(&text).map_err(|source| StorageError::Corrupt {
                    path: path.clone(),
                    source,
                })?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(StorageError::Io { path, source }),
        };

        debug!(entries = entries.len(), "Local storage opened");

        Ok(Self {
            inner: Arc::new(LocalStorageInner {
                path: Some(path),
                entries: RwLock::new(entries),
            }),
        })
    }

    /// Create a storage that lives only as long as the process.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(LocalStorageInner {
                path: None,
                entries: RwLock::new(BTreeMap::new()),
            }),
        }
    }

    /// Path of the backing file, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.inner.path.as_deref()
    }

    /// Get the value stored under `key`.
    pub async fn get(&self, key: &str) -> Option<String> {
        self.inner.entries.read().await.get(key).cloned()
    }

    /// Get the value stored under `key`, wrapped as a secret.
    pub async fn get_secret(&self, key: &str) -> Option<SecretString> {
        self.get(key).await.map(SecretString::from)
    }

    /// Store `value` under `key` and persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage file cannot be written. The in-memory
    /// value is only updated once the write succeeded.
    pub async fn set(&self, key: &str, value: impl Into<String>) -> Result<(), StorageError> {
        let mut entries = self.inner.entries.write().await;
        let mut next = entries.clone();
        next.insert(key.to_string(), value.into());
        self.persist(&next).await?;
        *entries = next;
        Ok(())
    }

    /// Remove `key` and persist. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage file cannot be written.
    pub async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.inner.entries.write().await;
        if !entries.contains_key(key) {
            return Ok(());
        }
        let mut next = entries.clone();
        next.remove(key);
        self.persist(&next).await?;
        *entries = next;
        Ok(())
    }

    async fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let Some(path) = &self.inner.path else {
            return Ok(());
        };

        let body = serde_json::to_vec_pretty(entries).map_err(|source| StorageError::Corrupt {
            path: path.clone(),
            source,
        })?;

        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, body)
            .await
            .map_err(|source| StorageError::Io {
                path: tmp.clone(),
                source,
            })?;
        tokio::fs::rename(&tmp, path)
            .await
            .map_err(|source| StorageError::Io {
                path: path.clone(),
                source,
            })?;

        Ok(())
    }
}

impl std::fmt::Debug for LocalStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Values may hold the auth token, so only the location is shown.
        f.debug_struct("LocalStorage")
            .field("path", &self.inner.path)
            .finish_non_exhaustive()
    }
}
