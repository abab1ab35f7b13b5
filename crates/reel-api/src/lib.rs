//! # reel-api -- Accounts, Sessions and Catalog Proxy
//!
//! HTTP backend for the Reel movie browser. Owns the user store, email
//! verification, sessions and the email existence lookup that drives the
//! progressive sign-in form, and proxies read-only movie data from the
//! external catalog.
//!
//! ## API Surface
//!
//! | Prefix           | Module                  | Domain                       |
//! |------------------|-------------------------|------------------------------|
//! | `/v1/auth/*`     | [`routes::auth`]        | Sign-up, sign-in, sessions   |
//! | `/v1/users/*`    | [`routes::users`]       | Email lookup, record fetch   |
//! | `/v1/profile`    | [`routes::profile`]     | Own profile                  |
//! | `/v1/movies/*`   | [`routes::movies`]      | Catalog proxy                |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → SessionMiddleware → RateLimitMiddleware → Handler
//! ```
//!
//! ## OpenAPI
//!
//! Generated via utoipa derive macros at `/openapi.json`.

pub mod accounts;
pub mod auth;
pub mod error;
pub mod extractors;
pub mod mailer;
pub mod middleware;
pub mod oauth;
pub mod openapi;
pub mod password;
pub mod routes;
pub mod sessions;
pub mod state;
pub mod tokens;

use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::get;
use axum::{Extension, Json, Router};

use crate::middleware::metrics::{ApiMetrics, MetricsSnapshot};
use crate::middleware::rate_limit::RateLimiter;
use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
///
/// Health probes (`/health/*`) are mounted outside the session and rate
/// limit middleware.
pub fn app(state: AppState) -> Router {
    let metrics = ApiMetrics::new();
    let limiter = RateLimiter::new(state.config.rate_limit.clone());

    let api = Router::new()
        .merge(routes::auth::router())
        .merge(routes::users::router())
        .merge(routes::profile::router())
        .merge(routes::movies::router())
        .merge(openapi::router())
        .layer(from_fn(middleware::rate_limit::rate_limit_middleware))
        .layer(from_fn_with_state(state.clone(), auth::session_middleware))
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(middleware::tracing_layer::layer())
        .layer(Extension(metrics.clone()))
        .layer(Extension(limiter))
        .with_state(state);

    let health = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness))
        .route("/health/metrics", get(metrics_snapshot))
        .layer(Extension(metrics));

    Router::new().merge(health).merge(api)
}

/// Liveness probe. Always 200 while the process runs.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe.
async fn readiness() -> &'static str {
    "ready"
}

/// Request counters as JSON.
async fn metrics_snapshot(Extension(metrics): Extension<ApiMetrics>) -> Json<MetricsSnapshot> {
    Json(metrics.snapshot())
}
