//! # Profile
//!
//! The signed-in user's own record. Only the display name is editable.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::auth::CurrentSession;
use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::routes::users::UserView;
use crate::state::AppState;

/// Profile update request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    /// New display name, 1 to 50 characters.
    pub name: String,
}

impl Validate for UpdateProfileRequest {
    fn validate(&self) -> Result<(), reel_core::ValidationError> {
        reel_core::validate_display_name(&self.name).map(|_| ())
    }
}

/// Build the profile router.
pub fn router() -> Router<AppState> {
    Router::new().route("/v1/profile", get(get_profile).patch(update_profile))
}

/// GET /v1/profile -- The current user's account record.
#[utoipa::path(
    get,
    path = "/v1/profile",
    responses(
        (status = 200, description = "Current user", body = UserView),
        (status = 401, description = "Not signed in", body = crate::error::ErrorBody),
    ),
    tag = "profile"
)]
pub(crate) async fn get_profile(
    State(state): State<AppState>,
    current: CurrentSession,
) -> Result<Json<UserView>, AppError> {
    state
        .accounts
        .get(current.user_id())
        .map(|record| Json(record.into()))
        .ok_or_else(|| AppError::Unauthorized("account no longer exists".into()))
}

/// PATCH /v1/profile -- Change the display name.
#[utoipa::path(
    patch,
    path = "/v1/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated user", body = UserView),
        (status = 401, description = "Not signed in", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid name", body = crate::error::ErrorBody),
    ),
    tag = "profile"
)]
pub(crate) async fn update_profile(
    State(state): State<AppState>,
    current: CurrentSession,
    body: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<Json<UserView>, AppError> {
    let req = extract_validated_json(body)?;
    let record = state.accounts.update_profile(current.user_id(), &req.name)?;
    Ok(Json(record.into()))
}
