//! Catalog client configuration.
//!
//! Defaults point at the public catalog. Override via environment variables
//! or explicit construction for tests.

use url::Url;
use zeroize::Zeroizing;

/// Default catalog API root.
pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for connecting to the movie catalog.
///
/// `Debug` redacts the access token.
#[derive(Clone)]
pub struct CatalogConfig {
    /// API root, e.g. `https://api.themoviedb.org/3`.
    pub base_url: Url,
    /// Bearer token sent on every request.
    pub access_token: Zeroizing<String>,
    /// `language` query parameter for listings, details and search.
    /// `None` leaves the catalog default.
    pub language: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for CatalogConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogConfig")
            .field("base_url", &self.base_url)
            .field("access_token", &"[REDACTED]")
            .field("language", &self.language)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl CatalogConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `API_ACCESS_TOKEN` (required)
    /// - `CATALOG_API_URL` (default: `https://api.themoviedb.org/3`)
    /// - `CATALOG_LANGUAGE` (default: unset)
    /// - `CATALOG_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        let access_token = std::env::var("API_ACCESS_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or(ConfigError::MissingToken)?;

        Ok(Self {
            base_url: env_url("CATALOG_API_URL", DEFAULT_BASE_URL)?,
            access_token: Zeroizing::new(access_token),
            language: std::env::var("CATALOG_LANGUAGE")
                .ok()
                .filter(|l| !l.trim().is_empty()),
            timeout_secs: std::env::var("CATALOG_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Configuration pointing at an arbitrary base URL, for tests and local stubs.
    pub fn with_base_url(base_url: &str, token: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: Url::parse(base_url)
                .map_err(|e| ConfigError::InvalidUrl(base_url.to_string(), e.to_string()))?,
            access_token: Zeroizing::new(token.to_string()),
            language: None,
            timeout_secs: 5,
        })
    }
}

fn env_url(var: &str, default: &str) -> Result<Url, ConfigError> {
    let raw = std::env::var(var).unwrap_or_else(|_| default.to_string());
    Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("API_ACCESS_TOKEN environment variable is required")]
    MissingToken,
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
}
