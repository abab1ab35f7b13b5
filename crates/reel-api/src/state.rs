//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor.
//!
//! ## Architecture
//!
//! - **Accounts**: the in-memory user store behind sign-up, sign-in, email
//!   lookup and profile edits.
//! - **Sessions**: opaque session tokens, stored as digests.
//! - **OAuth states**: single-use `state` values for federated sign-in.
//! - **Catalog client**: typed client for the external movie catalog.
//!   `None` when no access token is configured; movie routes answer 503.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::RwLock;
use reel_catalog::CatalogClient;
use url::Url;

use crate::accounts::{AccountService, LinkSettings};
use crate::mailer::{LogMailer, Mailer};
use crate::middleware::rate_limit::RateLimitConfig;
use crate::oauth::{oauth_state_ttl, GoogleOAuthConfig, OAuthState};
use crate::sessions::SessionStore;
use crate::tokens::OneTimeTokens;

// -- Generic In-Memory Store --------------------------------------------------

/// Thread-safe, cloneable in-memory key-value store.
///
/// The lock is `parking_lot` and is never held across an `.await`.
#[derive(Debug)]
pub struct Store<K, T> {
    data: Arc<RwLock<HashMap<K, T>>>,
}

impl<K, T> Clone for Store<K, T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

impl<K: Eq + Hash, T: Clone + Send + Sync> Store<K, T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Snapshot of every value.
    pub fn list(&self) -> Vec<T> {
        self.data.read().values().cloned().collect()
    }

    /// Insert a record, returning the previous value if the key existed.
    pub fn insert(&self, key: K, value: T) -> Option<T> {
        self.data.write().insert(key, value)
    }

    /// Insert only when the key is absent. Returns `false` if it was taken.
    pub fn insert_new(&self, key: K, value: T) -> bool {
        let mut guard = self.data.write();
        if guard.contains_key(&key) {
            return false;
        }
        guard.insert(key, value);
        true
    }

    /// Retrieve a record by key.
    pub fn get(&self, key: &K) -> Option<T> {
        self.data.read().get(key).cloned()
    }

    /// Update a record in place. Returns the updated record, or `None` if not found.
    pub fn update(&self, key: &K, f: impl FnOnce(&mut T)) -> Option<T> {
        let mut guard = self.data.write();
        guard.get_mut(key).map(|entry| {
            f(entry);
            entry.clone()
        })
    }

    /// Atomically read-validate-update a record under one write lock.
    ///
    /// Returns `None` if the record doesn't exist, or `Some(result)` with
    /// the closure's `Result`.
    pub fn try_update<R, E>(
        &self,
        key: &K,
        f: impl FnOnce(&mut T) -> Result<R, E>,
    ) -> Option<Result<R, E>> {
        self.data.write().get_mut(key).map(f)
    }

    /// Remove a record by key.
    pub fn remove(&self, key: &K) -> Option<T> {
        self.data.write().remove(key)
    }

    /// Keep only the records matching the predicate. Returns how many were dropped.
    pub fn retain(&self, mut keep: impl FnMut(&K, &T) -> bool) -> usize {
        let mut guard = self.data.write();
        let before = guard.len();
        guard.retain(|k, v| keep(k, v));
        before - guard.len()
    }

    /// Return the number of records.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: Eq + Hash, T: Clone + Send + Sync> Default for Store<K, T> {
    fn default() -> Self {
        Self::new()
    }
}

// -- Configuration ------------------------------------------------------------

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Externally reachable base URL without a trailing slash, used for
    /// links in emails and OAuth redirects.
    pub public_url: String,
    /// Where the verification link sends the browser after success.
    pub verification_callback: String,
    /// Google OAuth client. `None` disables social sign-in.
    pub google: Option<GoogleOAuthConfig>,
    /// Request rate limit.
    pub rate_limit: RateLimitConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            public_url: DEFAULT_PUBLIC_URL.to_string(),
            verification_callback: DEFAULT_VERIFICATION_CALLBACK.to_string(),
            google: None,
            rate_limit: RateLimitConfig::default(),
        }
    }
}

const DEFAULT_PUBLIC_URL: &str = "http://localhost:8080";
const DEFAULT_VERIFICATION_CALLBACK: &str = "/movies";

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `PORT` (default: 8080)
    /// - `PUBLIC_URL` (default: `http://localhost:8080`)
    /// - `EMAIL_VERIFICATION_CALLBACK_URL` (default: `/movies`)
    /// - `GOOGLE_CLIENT_ID` / `GOOGLE_CLIENT_SECRET` (both required to enable Google)
    /// - `RATE_LIMIT_MAX_REQUESTS` / `RATE_LIMIT_WINDOW_SECS` (default: 120 / 60)
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let raw_url = std::env::var("PUBLIC_URL").unwrap_or_else(|_| DEFAULT_PUBLIC_URL.into());
        Url::parse(&raw_url)
            .map_err(|e| ConfigError::InvalidUrl("PUBLIC_URL".into(), e.to_string()))?;
        let public_url = raw_url.trim_end_matches('/').to_string();

        let verification_callback = std::env::var("EMAIL_VERIFICATION_CALLBACK_URL")
            .unwrap_or_else(|_| DEFAULT_VERIFICATION_CALLBACK.into());

        let google = match (
            std::env::var("GOOGLE_CLIENT_ID").ok(),
            std::env::var("GOOGLE_CLIENT_SECRET").ok(),
        ) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => {
                Some(GoogleOAuthConfig::new(id, secret, &public_url))
            }
            _ => None,
        };

        let defaults = RateLimitConfig::default();
        let rate_limit = RateLimitConfig {
            max_requests: env_number("RATE_LIMIT_MAX_REQUESTS").unwrap_or(defaults.max_requests),
            window_secs: env_number("RATE_LIMIT_WINDOW_SECS").unwrap_or(defaults.window_secs),
        };

        Ok(Self {
            port,
            public_url,
            verification_callback,
            google,
            rate_limit,
        })
    }
}

fn env_number(var: &str) -> Option<u64> {
    std::env::var(var).ok().and_then(|v| v.parse().ok())
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
}

// -- Application State --------------------------------------------------------

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub accounts: AccountService,
    pub sessions: SessionStore,
    pub oauth_states: OneTimeTokens<OAuthState>,
    pub catalog: Option<CatalogClient>,
}

impl AppState {
    /// Default configuration, log mailer, no catalog client.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default(), None, Arc::new(LogMailer))
    }

    /// Build state from explicit parts.
    pub fn with_config(
        config: AppConfig,
        catalog: Option<CatalogClient>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        let sessions = SessionStore::new();
        let links = LinkSettings {
            public_url: config.public_url.clone(),
            verification_callback: config.verification_callback.clone(),
        };
        Self {
            accounts: AccountService::new(mailer, links, sessions.clone()),
            sessions,
            oauth_states: OneTimeTokens::new(oauth_state_ttl()),
            catalog,
            config: Arc::new(config),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("sessions", &self.sessions.len())
            .field("catalog", &self.catalog.is_some())
            .finish()
    }
}
