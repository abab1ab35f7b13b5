//! Typed client for the catalog's movie resources.
//!
//! | Method | Path                 | Operation                   |
//! |--------|----------------------|-----------------------------|
//! | GET    | `/movie/popular`     | Popular listing             |
//! | GET    | `/movie/{id}`        | Details, credits appended   |
//! | GET    | `/search/movie`      | Title search                |

use reel_core::{MovieDetails, MoviePage, MovieSummary};

use crate::error::CatalogError;
use crate::Api;

/// Client for catalog movie endpoints.
#[derive(Debug, Clone)]
pub struct MovieClient {
    api: Api,
    language: Option<String>,
}

impl MovieClient {
    pub(crate) fn new(api: Api, language: Option<String>) -> Self {
        Self { api, language }
    }

    fn with_language<'a>(&'a self, mut query: Vec<(&'a str, &'a str)>) -> Vec<(&'a str, &'a str)> {
        if let Some(lang) = &self.language {
            query.push(("language", lang.as_str()));
        }
        query
    }

    /// First page of currently popular movies.
    ///
    /// Calls `GET {base_url}/movie/popular`.
    pub async fn popular(&self) -> Result<MoviePage<MovieSummary>, CatalogError> {
        let query = self.with_language(Vec::new());
        self.api
            .get_required("GET /movie/popular", "/movie/popular", &query)
            .await
    }

    /// Movie details with cast and crew. `None` when the catalog has no such movie.
    ///
    /// Calls `GET {base_url}/movie/{id}?append_to_response=credits`.
    pub async fn get(&self, id: u64) -> Result<Option<MovieDetails>, CatalogError> {
        let endpoint = format!("GET /movie/{id}");
        let query = self.with_language(vec![("append_to_response", "credits")]);
        self.api
            .get_json(&endpoint, &format!("/movie/{id}"), &query)
            .await
    }

    /// Search movies by title. The query is URL-encoded.
    ///
    /// Calls `GET {base_url}/search/movie?query={query}`.
    pub async fn search(&self, query: &str) -> Result<MoviePage<MovieSummary>, CatalogError> {
        let params = self.with_language(vec![("query", query)]);
        self.api
            .get_required("GET /search/movie", "/search/movie", &params)
            .await
    }
}
