//! # Movie Catalog Proxy
//!
//! Read-only pass-through to the external movie catalog via
//! [`reel_catalog::CatalogClient`]. Payloads keep the catalog's snake_case
//! field names.
//!
//! Returns 503 when no catalog access token is configured and 502 with a
//! generic message when the catalog call fails.

use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use reel_catalog::CatalogClient;
use reel_core::{Genre, MovieDetails, MoviePage, MovieSummary};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::AppError;
use crate::extractors::extract_query;
use crate::state::AppState;

/// Query for the movie search.
#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchQuery {
    /// Free-text title query. Must not be blank.
    pub query: String,
}

/// Build the movies router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/movies", get(popular_movies))
        .route("/v1/movies/search", get(search_movies))
        .route("/v1/movies/genre/:id", get(get_genre))
        .route("/v1/movies/:id", get(get_movie))
}

/// Extract the catalog client or return 503.
fn require_catalog(state: &AppState) -> Result<&CatalogClient, AppError> {
    state.catalog.as_ref().ok_or_else(|| {
        AppError::service_unavailable("movie catalog not configured: set API_ACCESS_TOKEN")
    })
}

fn numeric_id(id: Result<Path<u64>, PathRejection>) -> Result<u64, AppError> {
    id.map(|Path(id)| id)
        .map_err(|e| AppError::BadRequest(e.body_text()))
}

/// GET /v1/movies -- Popular movies.
#[utoipa::path(
    get,
    path = "/v1/movies",
    responses(
        (status = 200, description = "Page of popular movies", body = serde_json::Value),
        (status = 502, description = "Catalog error", body = crate::error::ErrorBody),
        (status = 503, description = "Catalog not configured", body = crate::error::ErrorBody),
    ),
    tag = "movies"
)]
pub(crate) async fn popular_movies(
    State(state): State<AppState>,
) -> Result<Json<MoviePage<MovieSummary>>, AppError> {
    let catalog = require_catalog(&state)?;
    let page = catalog.movies().popular().await?;
    Ok(Json(page))
}

/// GET /v1/movies/search -- Search movies by title.
#[utoipa::path(
    get,
    path = "/v1/movies/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching movies, possibly none", body = serde_json::Value),
        (status = 400, description = "Missing query parameter", body = crate::error::ErrorBody),
        (status = 422, description = "Blank query", body = crate::error::ErrorBody),
        (status = 502, description = "Catalog error", body = crate::error::ErrorBody),
        (status = 503, description = "Catalog not configured", body = crate::error::ErrorBody),
    ),
    tag = "movies"
)]
pub(crate) async fn search_movies(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<MoviePage<MovieSummary>>, AppError> {
    let SearchQuery { query } = extract_query(query)?;
    let query = query.trim();
    if query.is_empty() {
        return Err(AppError::InvalidField {
            field: "query",
            message: "query must not be empty".into(),
        });
    }
    let catalog = require_catalog(&state)?;
    let page = catalog.movies().search(query).await?;
    Ok(Json(page))
}

/// GET /v1/movies/:id -- Movie details with credits.
#[utoipa::path(
    get,
    path = "/v1/movies/{id}",
    params(("id" = u64, Path, description = "Catalog movie ID")),
    responses(
        (status = 200, description = "Movie details", body = serde_json::Value),
        (status = 404, description = "Unknown movie", body = crate::error::ErrorBody),
        (status = 502, description = "Catalog error", body = crate::error::ErrorBody),
        (status = 503, description = "Catalog not configured", body = crate::error::ErrorBody),
    ),
    tag = "movies"
)]
pub(crate) async fn get_movie(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<Json<MovieDetails>, AppError> {
    let id = numeric_id(id)?;
    let catalog = require_catalog(&state)?;
    catalog
        .movies()
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("movie {id} not found")))
}

/// GET /v1/movies/genre/:id -- Genre name (Polish).
#[utoipa::path(
    get,
    path = "/v1/movies/genre/{id}",
    params(("id" = u64, Path, description = "Catalog genre ID")),
    responses(
        (status = 200, description = "Genre", body = serde_json::Value),
        (status = 404, description = "Unknown genre", body = crate::error::ErrorBody),
        (status = 502, description = "Catalog error", body = crate::error::ErrorBody),
        (status = 503, description = "Catalog not configured", body = crate::error::ErrorBody),
    ),
    tag = "movies"
)]
pub(crate) async fn get_genre(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<Json<Genre>, AppError> {
    let id = numeric_id(id)?;
    let catalog = require_catalog(&state)?;
    catalog
        .genres()
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("genre {id} not found")))
}
