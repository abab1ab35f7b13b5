//! Typed client for catalog genres.

use reel_core::Genre;

use crate::error::CatalogError;
use crate::Api;

/// Language used for genre names.
pub const GENRE_LANGUAGE: &str = "pl";

/// Client for catalog genre endpoints.
#[derive(Debug, Clone)]
pub struct GenreClient {
    api: Api,
}

impl GenreClient {
    pub(crate) fn new(api: Api) -> Self {
        Self { api }
    }

    /// Look up a movie genre by id. `None` when the catalog does not know it.
    ///
    /// Calls `GET {base_url}/genre/movie/{id}?language=pl`.
    pub async fn get(&self, id: u64) -> Result<Option<Genre>, CatalogError> {
        let endpoint = format!("GET /genre/movie/{id}");
        self.api
            .get_json(
                &endpoint,
                &format!("/genre/movie/{id}"),
                &[("language", GENRE_LANGUAGE)],
            )
            .await
    }
}
