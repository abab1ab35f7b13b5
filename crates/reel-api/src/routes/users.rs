//! # Users
//!
//! Email existence lookup used by the progressive sign-in form, and the
//! account record fetch.

use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use reel_core::{AccountIdentity, AccountRecord, UserId};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::auth::CurrentSession;
use crate::error::AppError;
use crate::extractors::extract_query;
use crate::state::AppState;

/// Public view of an account record.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub email_verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<AccountRecord> for UserView {
    fn from(record: AccountRecord) -> Self {
        Self {
            id: *record.id.as_uuid(),
            name: record.name,
            email: record.email.as_str().to_string(),
            email_verified: record.email_verified,
            image: record.image,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Query for the email existence lookup.
#[derive(Debug, Deserialize, IntoParams)]
pub struct LookupQuery {
    /// Address to look up.
    pub email: String,
}

/// Existence and verification status of an email address.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LookupResponse {
    pub exists: bool,
    pub verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl From<Option<AccountIdentity>> for LookupResponse {
    fn from(identity: Option<AccountIdentity>) -> Self {
        match identity {
            Some(identity) => Self {
                exists: true,
                verified: identity.verified,
                display_name: Some(identity.display_name),
            },
            None => Self {
                exists: false,
                verified: false,
                display_name: None,
            },
        }
    }
}

/// Build the users router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/users/lookup", get(lookup_email))
        .route("/v1/users/:id", get(get_user))
}

/// GET /v1/users/lookup -- Does an account exist for this email, and is it verified?
#[utoipa::path(
    get,
    path = "/v1/users/lookup",
    params(LookupQuery),
    responses(
        (status = 200, description = "Lookup result", body = LookupResponse),
        (status = 400, description = "Missing email parameter", body = crate::error::ErrorBody),
        (status = 422, description = "Malformed email", body = crate::error::ErrorBody),
        (status = 429, description = "Rate limited", body = crate::error::ErrorBody),
    ),
    tag = "users"
)]
pub(crate) async fn lookup_email(
    State(state): State<AppState>,
    query: Result<Query<LookupQuery>, QueryRejection>,
) -> Result<Json<LookupResponse>, AppError> {
    let query = extract_query(query)?;
    let identity = state.accounts.lookup(&query.email)?;
    Ok(Json(identity.into()))
}

/// GET /v1/users/:id -- Fetch an account record. Callers may only fetch their own.
#[utoipa::path(
    get,
    path = "/v1/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Account record", body = UserView),
        (status = 401, description = "Not signed in", body = crate::error::ErrorBody),
        (status = 403, description = "Another user's record", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "users"
)]
pub(crate) async fn get_user(
    State(state): State<AppState>,
    current: CurrentSession,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<UserView>, AppError> {
    let Path(id) = id.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let user_id = UserId::from_uuid(id);
    if user_id != current.user_id() {
        return Err(AppError::Forbidden("cannot read another user's record".into()));
    }
    state
        .accounts
        .get(user_id)
        .map(|record| Json(record.into()))
        .ok_or_else(|| AppError::not_found(format!("user {user_id} not found")))
}
