//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type for front ends built on this crate.
//! Failures caused by the remote service or local disk are reported to
//! Sentry via [`AppError::capture`]; customer mistakes are not.

use thiserror::Error;

use crate::api::ApiError;
use crate::cart::CartError;
use crate::checkout::CheckoutError;
use crate::config::ConfigError;
use crate::storage::StorageError;

/// Application-level error type for the storefront client.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Local storage could not be read or written.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Remote API call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Cart change failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Checkout did not produce an order.
    #[error("{0}")]
    Checkout(#[from] CheckoutError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad input from the user.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl AppError {
    /// Whether this error points at a fault rather than a user mistake.
    #[must_use]
    pub const fn is_fault(&self) -> bool {
        match self {
            Self::Config(_) | Self::Storage(_) | Self::Api(_) => true,
            Self::Cart(err) => matches!(err, CartError::Sync(_)),
            Self::Checkout(err) => matches!(err, CheckoutError::Order { .. }),
            Self::NotFound(_) | Self::InvalidInput(_) => false,
        }
    }

    /// Log the error and, for faults, send it to Sentry.
    pub fn capture(&self) {
        if self.is_fault() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Storefront error"
            );
        } else {
            tracing::warn!(error = %self, "Request rejected");
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added item", Some(&[("product_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
