//! # reel-catalog -- Typed client for the external movie catalog
//!
//! Provides typed access to the small slice of the catalog API the
//! application proxies:
//! - **Movies**: popular listing, details with credits, title search
//! - **Genres**: single genre lookup
//!
//! ## Architecture
//!
//! This crate is the only place that talks to the catalog. The API server
//! wraps it in thin proxy routes; nothing else holds the access token.
//!
//! Requests are never retried here. A failed call surfaces as a
//! [`CatalogError`] and the caller decides what the user sees.

pub mod config;
pub mod error;
pub mod genres;
pub mod movies;

pub use config::{CatalogConfig, ConfigError};
pub use error::CatalogError;

use std::time::Duration;

use serde::de::DeserializeOwned;

/// Top-level catalog client. Holds one sub-client per resource.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    movies: movies::MovieClient,
    genres: genres::GenreClient,
}

impl CatalogClient {
    /// Create a new catalog client from configuration.
    pub fn new(config: CatalogConfig) -> Result<Self, CatalogError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                let mut auth = reqwest::header::HeaderValue::from_str(&format!(
                    "Bearer {}",
                    config.access_token.as_str()
                ))
                .map_err(|_| CatalogError::Config(ConfigError::MissingToken))?;
                auth.set_sensitive(true);
                headers.insert(reqwest::header::AUTHORIZATION, auth);
                headers.insert(
                    reqwest::header::ACCEPT,
                    reqwest::header::HeaderValue::from_static("application/json"),
                );
                headers
            })
            .build()
            .map_err(|e| CatalogError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        let api = Api {
            http,
            base_url: config.base_url,
        };
        Ok(Self {
            movies: movies::MovieClient::new(api.clone(), config.language),
            genres: genres::GenreClient::new(api),
        })
    }

    /// Access the movies client.
    pub fn movies(&self) -> &movies::MovieClient {
        &self.movies
    }

    /// Access the genres client.
    pub fn genres(&self) -> &genres::GenreClient {
        &self.genres
    }
}

/// Shared transport for the sub-clients.
#[derive(Debug, Clone)]
pub(crate) struct Api {
    http: reqwest::Client,
    base_url: url::Url,
}

impl Api {
    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.as_str().trim_end_matches('/'))
    }

    /// `GET` a JSON resource. A 404 becomes `Ok(None)`.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Option<T>, CatalogError> {
        let url = self.url(path);
        tracing::debug!(endpoint, "catalog request");

        let resp = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| CatalogError::Http {
                endpoint: endpoint.into(),
                source: e,
            })?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(endpoint, status, "catalog returned an error status");
            return Err(CatalogError::Api {
                endpoint: endpoint.into(),
                status,
                body,
            });
        }

        resp.json()
            .await
            .map(Some)
            .map_err(|e| CatalogError::Deserialization {
                endpoint: endpoint.into(),
                source: e,
            })
    }

    /// `GET` a JSON resource that must exist. A 404 is an API error.
    pub(crate) async fn get_required<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, CatalogError> {
        self.get_json(endpoint, path, query)
            .await?
            .ok_or_else(|| CatalogError::Api {
                endpoint: endpoint.into(),
                status: 404,
                body: String::new(),
            })
    }
}
