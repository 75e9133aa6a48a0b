//! Storefront client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `VITASHOP_API_URL` - Base URL of the remote API (default: `https://localhost:44353/api`)
//! - `VITASHOP_DATA_DIR` - Directory holding client-local storage (default: `.vitashop`)
//! - `VITASHOP_PAGE_SIZE` - Products per listing page (default: 6)
//! - `VITASHOP_REQUEST_TIMEOUT_SECS` - Per-request timeout; unset means no timeout
//! - `VITASHOP_AUTH_TOKEN` - Bearer token; when set it is written to local storage
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Default remote API base URL.
pub const DEFAULT_API_URL: &str = "https://localhost:44353/api";

/// Default products per listing page.
pub const DEFAULT_PAGE_SIZE: u32 = 6;

const DEFAULT_DATA_DIR: &str = ".vitashop";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
///
/// Implements `Debug` manually to redact the auth token.
#[derive(Clone)]
pub struct StorefrontConfig {
    /// Base URL of the remote API; endpoint paths are appended to it
    pub api_url: Url,
    /// Directory holding the local storage file
    pub data_dir: PathBuf,
    /// Default page size for product listings
    pub page_size: u32,
    /// Optional per-request timeout
    pub request_timeout: Option<Duration>,
    /// Bearer token to seed into local storage
    pub auth_token: Option<SecretString>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl std::fmt::Debug for StorefrontConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontConfig")
            .field("api_url", &self.api_url.as_str())
            .field("data_dir", &self.data_dir)
            .field("page_size", &self.page_size)
            .field("request_timeout", &self.request_timeout)
            .field(
                "auth_token",
                &self.auth_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("sentry_dsn", &self.sentry_dsn)
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_url = parse_api_url(&get_env_or_default("VITASHOP_API_URL", DEFAULT_API_URL))
            .map_err(|e| ConfigError::InvalidEnvVar("VITASHOP_API_URL".to_string(), e))?;
        let data_dir = PathBuf::from(get_env_or_default("VITASHOP_DATA_DIR", DEFAULT_DATA_DIR));
        let page_size = parse_page_size(&get_env_or_default(
            "VITASHOP_PAGE_SIZE",
            &DEFAULT_PAGE_SIZE.to_string(),
        ))
        .map_err(|e| ConfigError::InvalidEnvVar("VITASHOP_PAGE_SIZE".to_string(), e))?;
        let request_timeout = get_optional_env("VITASHOP_REQUEST_TIMEOUT_SECS")
            .map(|v| parse_timeout(&v))
            .transpose()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("VITASHOP_REQUEST_TIMEOUT_SECS".to_string(), e)
            })?;
        let auth_token = get_optional_env("VITASHOP_AUTH_TOKEN").map(SecretString::from);
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            api_url,
            data_dir,
            page_size,
            request_timeout,
            auth_token,
            sentry_dsn,
        })
    }

    /// Configuration pointing at `api_url` with every other field defaulted.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `api_url` is not an absolute http(s) URL.
    pub fn for_api(api_url: &str, data_dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: parse_api_url(api_url)
                .map_err(|e| ConfigError::InvalidEnvVar("api_url".to_string(), e))?,
            data_dir: data_dir.into(),
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout: None,
            auth_token: None,
            sentry_dsn: None,
        })
    }

    /// Replace the API base URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `api_url` is not an absolute http(s) URL.
    pub fn with_api_url(mut self, api_url: &str) -> Result<Self, ConfigError> {
        self.api_url = parse_api_url(api_url)
            .map_err(|e| ConfigError::InvalidEnvVar("api_url".to_string(), e))?;
        Ok(self)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable, treating blank values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse and check the API base URL.
fn parse_api_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw.trim()).map_err(|e| e.to_string())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme '{}'", url.scheme()));
    }
    if url.cannot_be_a_base() {
        return Err("URL cannot be used as a base".to_string());
    }
    Ok(url)
}

/// Parse a positive page size.
fn parse_page_size(raw: &str) -> Result<u32, String> {
    match raw.trim().parse::<u32>() {
        Ok(0) => Err("page size must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

/// Parse a timeout given in whole seconds.
fn parse_timeout(raw: &str) -> Result<Duration, String> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err("timeout must be at least 1 second".to_string()),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(e) => Err(e.to_string()),
    }
}
