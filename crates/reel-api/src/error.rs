//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps account, validation and catalog errors to HTTP status codes and
//! JSON error bodies with a machine-readable code. Internal and upstream
//! details are logged, never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::accounts::AccountError;

/// Structured JSON error response body.
///
/// Every error response uses this shape. `details` is only filled for
/// field-level validation failures.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "INVALID_CREDENTIALS").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional details, present only for client errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorBody {
    /// Body with a code and message and no details.
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.to_string(),
                message: message.into(),
                details: None,
            },
        }
    }
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request validation failed (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// A specific form field failed validation (422).
    #[error("validation error: {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },

    /// Request is malformed: missing parameter or unparseable body (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Missing or unknown session (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Email/password pair rejected (401).
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Credentials are right but the email is not verified yet (403).
    #[error("Email is not verified")]
    EmailNotVerified,

    /// Caller may not access the resource (403).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Conflict with current resource state (409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Single-use token is unknown, used or expired (400).
    #[error("invalid or expired token")]
    InvalidToken,

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),

    /// The movie catalog returned an error or is unreachable (502).
    #[error("upstream catalog error: {0}")]
    UpstreamError(String),

    /// Service dependency not configured (503).
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) | Self::InvalidField { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR")
            }
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::InvalidCredentials => (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS"),
            Self::EmailNotVerified => (StatusCode::FORBIDDEN, "EMAIL_NOT_VERIFIED"),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::InvalidToken => (StatusCode::BAD_REQUEST, "INVALID_TOKEN"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            Self::UpstreamError(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
            Self::ServiceUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE"),
        }
    }

    /// Construct an upstream error (502 Bad Gateway).
    pub fn upstream(msg: String) -> Self {
        Self::UpstreamError(msg)
    }

    /// Construct a service unavailable error (503).
    pub fn service_unavailable(msg: &str) -> Self {
        Self::ServiceUnavailable(msg.to_string())
    }

    /// Construct a not-found error (404).
    pub fn not_found(msg: String) -> Self {
        Self::NotFound(msg)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            Self::UpstreamError(_) => "Failed to fetch data".to_string(),
            Self::InvalidField { message, .. } => message.clone(),
            other => other.to_string(),
        };

        match &self {
            Self::Internal(_) => tracing::error!(error = %self, "internal server error"),
            Self::UpstreamError(_) => tracing::error!(error = %self, "upstream catalog error"),
            Self::ServiceUnavailable(_) => tracing::warn!(error = %self, "service unavailable"),
            _ => {}
        }

        let details = match &self {
            Self::InvalidField { field, .. } => Some(serde_json::json!({ "field": field })),
            _ => None,
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Domain validation failures name the offending field.
impl From<reel_core::ValidationError> for AppError {
    fn from(err: reel_core::ValidationError) -> Self {
        Self::InvalidField {
            field: err.field(),
            message: err.to_string(),
        }
    }
}

impl From<AccountError> for AppError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::Validation(e) => e.into(),
            AccountError::DuplicateEmail(_) => {
                Self::Conflict("an account with this email already exists".into())
            }
            AccountError::InvalidCredentials => Self::InvalidCredentials,
            AccountError::EmailNotVerified => Self::EmailNotVerified,
            AccountError::InvalidToken => Self::InvalidToken,
            AccountError::UnsafeRedirect(target) => Self::InvalidField {
                field: "redirectTo",
                message: format!("redirect target must be a relative path: \"{target}\""),
            },
            AccountError::NotFound(id) => Self::NotFound(format!("user {id} not found")),
            AccountError::Hashing(msg) => Self::Internal(format!("password hashing: {msg}")),
            AccountError::Mail(e) => Self::Internal(format!("mail delivery: {e}")),
        }
    }
}

/// Catalog failures are upstream errors. A missing token is a 503.
impl From<reel_catalog::CatalogError> for AppError {
    fn from(err: reel_catalog::CatalogError) -> Self {
        match err {
            reel_catalog::CatalogError::Config(e) => Self::ServiceUnavailable(e.to_string()),
            other => Self::upstream(other.to_string()),
        }
    }
}
