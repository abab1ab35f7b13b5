//! # API Route Modules
//!
//! - `auth` -- sign-up, email verification, email/password and social
//!   sign-in, password reset, sign-out and the current session.
//! - `users` -- email existence lookup and the account record fetch.
//! - `profile` -- the signed-in user's own record and display name edits.
//! - `movies` -- read-only proxy to the external movie catalog.

pub mod auth;
pub mod movies;
pub mod profile;
pub mod users;

use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

/// `{ "status": true }` acknowledgement.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    pub status: bool,
}

impl StatusResponse {
    pub fn ok() -> Json<Self> {
        Json(Self { status: true })
    }
}

/// JSON response that also sets a cookie.
pub(crate) fn with_cookie<T: Serialize>(cookie: String, body: T) -> Response {
    ([(header::SET_COOKIE, cookie)], Json(body)).into_response()
}
