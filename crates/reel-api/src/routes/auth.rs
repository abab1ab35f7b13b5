//! # Authentication Routes
//!
//! Email/password accounts with mandatory email verification, social sign-in
//! bootstrap, password reset and session management.
//!
//! A successful sign-in (or email verification) returns the session token in
//! the body and as the `reel.session_token` cookie.

use std::str::FromStr;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use reel_core::{EmailAddress, SignUpForm, SocialProvider, ValidationError};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::accounts::is_safe_redirect;
use crate::auth::{clear_session_cookie, session_cookie, CurrentSession};
use crate::error::AppError;
use crate::extractors::{extract_json, extract_query, extract_validated_json, Validate};
use crate::oauth::{start_authorization, OAuthError};
use crate::routes::users::UserView;
use crate::routes::{with_cookie, StatusResponse};
use crate::sessions::SessionRecord;
use crate::state::AppState;

// ── DTOs ────────────────────────────────────────────────────────────────────

/// Sign-up request.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl From<SignUpRequest> for SignUpForm {
    fn from(req: SignUpRequest) -> Self {
        SignUpForm {
            name: req.name,
            email: req.email,
            password: req.password,
            confirm_password: req.confirm_password,
        }
    }
}

/// Wrapper for a single user record.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub user: UserView,
}

/// Email/password sign-in request.
#[derive(Deserialize, ToSchema)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// A newly opened session.
#[derive(Serialize, ToSchema)]
pub struct SignInResponse {
    /// Session token. Also set as the `reel.session_token` cookie.
    pub token: String,
    pub user: UserView,
    pub session: SessionRecord,
}

/// Social sign-in request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SocialSignInRequest {
    /// Provider id, e.g. `google`.
    pub provider: String,
    /// Relative path to land on after the provider flow.
    #[serde(rename = "callbackURL")]
    pub callback_url: Option<String>,
}

impl Validate for SocialSignInRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        SocialProvider::from_str(&self.provider).map(|_| ())
    }
}

/// Where the browser should go next.
#[derive(Debug, Serialize, ToSchema)]
pub struct SocialSignInResponse {
    pub url: String,
    pub redirect: bool,
}

/// Query of the link in the verification email.
#[derive(Debug, Deserialize, IntoParams)]
pub struct VerifyEmailQuery {
    pub token: String,
    #[serde(rename = "callbackURL")]
    pub callback_url: Option<String>,
}

/// Verified user, returned when no callback is given.
#[derive(Serialize, ToSchema)]
pub struct VerifyEmailResponse {
    pub status: bool,
    pub user: UserView,
    pub token: String,
}

/// A request carrying only an email address.
#[derive(Debug, Deserialize, ToSchema)]
pub struct EmailRequest {
    pub email: String,
}

impl Validate for EmailRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        EmailAddress::parse(&self.email).map(|_| ())
    }
}

/// Password reset request.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordRequest {
    pub email: String,
    /// Relative path of the page the reset link opens.
    pub redirect_to: Option<String>,
}

/// New password with a reset token.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// The current session and its user.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub session: SessionRecord,
    pub user: UserView,
}

// ── Router ──────────────────────────────────────────────────────────────────

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/auth/sign-up/email", post(sign_up))
        .route("/v1/auth/sign-in/email", post(sign_in))
        .route("/v1/auth/sign-in/social", post(sign_in_social))
        .route("/v1/auth/verify-email", get(verify_email))
        .route("/v1/auth/send-verification-email", post(send_verification_email))
        .route("/v1/auth/forgot-password", post(forgot_password))
        .route("/v1/auth/reset-password", post(reset_password))
        .route("/v1/auth/sign-out", post(sign_out))
        .route("/v1/auth/session", get(get_session))
}

fn secure_cookies(state: &AppState) -> bool {
    state.config.public_url.starts_with("https://")
}

// ── Handlers ────────────────────────────────────────────────────────────────

/// POST /v1/auth/sign-up/email -- Create an account and send the verification link.
#[utoipa::path(
    post,
    path = "/v1/auth/sign-up/email",
    request_body = SignUpRequest,
    responses(
        (status = 201, description = "Account created, verification email sent", body = UserResponse),
        (status = 409, description = "Email already registered", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid form field", body = crate::error::ErrorBody),
    ),
    tag = "auth"
)]
pub(crate) async fn sign_up(
    State(state): State<AppState>,
    body: Result<Json<SignUpRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let req = extract_json(body)?;
    let record = state.accounts.sign_up(req.into())?;
    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            user: record.into(),
        }),
    ))
}

/// POST /v1/auth/sign-in/email -- Open a session with email and password.
#[utoipa::path(
    post,
    path = "/v1/auth/sign-in/email",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in", body = SignInResponse),
        (status = 401, description = "Invalid email or password", body = crate::error::ErrorBody),
        (status = 403, description = "Email not verified", body = crate::error::ErrorBody),
        (status = 422, description = "Malformed email", body = crate::error::ErrorBody),
    ),
    tag = "auth"
)]
pub(crate) async fn sign_in(
    State(state): State<AppState>,
    body: Result<Json<SignInRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let req = extract_json(body)?;
    let record = state.accounts.sign_in(&req.email, &req.password)?;
    let issued = state.sessions.create(record.id);
    tracing::info!(user_id = %record.id, "signed in");

    let cookie = session_cookie(&issued.token, secure_cookies(&state));
    Ok(with_cookie(
        cookie,
        SignInResponse {
            token: issued.token.as_str().to_string(),
            user: record.into(),
            session: issued.session,
        },
    ))
}

/// POST /v1/auth/sign-in/social -- Start a federated sign-in.
#[utoipa::path(
    post,
    path = "/v1/auth/sign-in/social",
    request_body = SocialSignInRequest,
    responses(
        (status = 200, description = "Provider authorization URL", body = SocialSignInResponse),
        (status = 422, description = "Unknown provider or unsafe callback", body = crate::error::ErrorBody),
        (status = 503, description = "Provider not configured", body = crate::error::ErrorBody),
    ),
    tag = "auth"
)]
pub(crate) async fn sign_in_social(
    State(state): State<AppState>,
    body: Result<Json<SocialSignInRequest>, JsonRejection>,
) -> Result<Json<SocialSignInResponse>, AppError> {
    let req = extract_validated_json(body)?;
    let provider = SocialProvider::from_str(&req.provider)?;

    let callback_url = req.callback_url.unwrap_or_else(|| "/".to_string());
    if !is_safe_redirect(&callback_url) {
        return Err(AppError::InvalidField {
            field: "callbackURL",
            message: format!("callback must be a relative path: \"{callback_url}\""),
        });
    }

    let url = start_authorization(
        state.config.google.as_ref(),
        &state.oauth_states,
        provider,
        callback_url,
    )
    .map_err(|e| match &e {
        OAuthError::NotConfigured(_) => AppError::ServiceUnavailable(e.to_string()),
        OAuthError::Url(_) => AppError::Internal(e.to_string()),
    })?;

    Ok(Json(SocialSignInResponse {
        url: url.to_string(),
        redirect: true,
    }))
}

/// GET /v1/auth/verify-email -- Redeem the link from the verification email.
///
/// Success signs the user in. With a safe `callbackURL` the browser is
/// redirected there; on failure it is redirected with `?error=INVALID_TOKEN`.
#[utoipa::path(
    get,
    path = "/v1/auth/verify-email",
    params(VerifyEmailQuery),
    responses(
        (status = 200, description = "Email verified", body = VerifyEmailResponse),
        (status = 303, description = "Redirect to the callback URL"),
        (status = 400, description = "Invalid or expired token", body = crate::error::ErrorBody),
    ),
    tag = "auth"
)]
pub(crate) async fn verify_email(
    State(state): State<AppState>,
    query: Result<Query<VerifyEmailQuery>, QueryRejection>,
) -> Result<Response, AppError> {
    let query = extract_query(query)?;
    let callback = query
        .callback_url
        .filter(|target| is_safe_redirect(target));

    let record = match state.accounts.verify_email(&query.token) {
        Ok(record) => record,
        Err(e) => {
            return match callback {
                Some(target) => {
                    let sep = if target.contains('?') { '&' } else { '?' };
                    Ok(Redirect::to(&format!("{target}{sep}error=INVALID_TOKEN")).into_response())
                }
                None => Err(e.into()),
            };
        }
    };

    let issued = state.sessions.create(record.id);
    let cookie = session_cookie(&issued.token, secure_cookies(&state));
    let response = match callback {
        Some(target) => ([(header::SET_COOKIE, cookie)], Redirect::to(&target)).into_response(),
        None => with_cookie(
            cookie,
            VerifyEmailResponse {
                status: true,
                user: record.into(),
                token: issued.token.as_str().to_string(),
            },
        ),
    };
    Ok(response)
}

/// POST /v1/auth/send-verification-email -- Re-send the verification link.
#[utoipa::path(
    post,
    path = "/v1/auth/send-verification-email",
    request_body = EmailRequest,
    responses(
        (status = 200, description = "Sent if the account exists and is unverified", body = StatusResponse),
        (status = 422, description = "Malformed email", body = crate::error::ErrorBody),
    ),
    tag = "auth"
)]
pub(crate) async fn send_verification_email(
    State(state): State<AppState>,
    body: Result<Json<EmailRequest>, JsonRejection>,
) -> Result<Json<StatusResponse>, AppError> {
    let req = extract_validated_json(body)?;
    state.accounts.resend_verification(&req.email)?;
    Ok(StatusResponse::ok())
}

/// POST /v1/auth/forgot-password -- Mail a password reset link.
///
/// Answers the same whether or not the account exists.
#[utoipa::path(
    post,
    path = "/v1/auth/forgot-password",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset link sent if the account exists", body = StatusResponse),
        (status = 422, description = "Malformed email or unsafe redirect", body = crate::error::ErrorBody),
    ),
    tag = "auth"
)]
pub(crate) async fn forgot_password(
    State(state): State<AppState>,
    body: Result<Json<ForgotPasswordRequest>, JsonRejection>,
) -> Result<Json<StatusResponse>, AppError> {
    let req = extract_json(body)?;
    state
        .accounts
        .request_password_reset(&req.email, req.redirect_to.as_deref())?;
    Ok(StatusResponse::ok())
}

/// POST /v1/auth/reset-password -- Set a new password and end all sessions.
#[utoipa::path(
    post,
    path = "/v1/auth/reset-password",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = StatusResponse),
        (status = 400, description = "Invalid or expired token", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid password", body = crate::error::ErrorBody),
    ),
    tag = "auth"
)]
pub(crate) async fn reset_password(
    State(state): State<AppState>,
    body: Result<Json<ResetPasswordRequest>, JsonRejection>,
) -> Result<Json<StatusResponse>, AppError> {
    let req = extract_json(body)?;
    state
        .accounts
        .reset_password(&req.token, &req.new_password, &req.confirm_password)?;
    Ok(StatusResponse::ok())
}

/// POST /v1/auth/sign-out -- End the current session.
#[utoipa::path(
    post,
    path = "/v1/auth/sign-out",
    responses(
        (status = 200, description = "Signed out", body = StatusResponse),
        (status = 401, description = "Not signed in", body = crate::error::ErrorBody),
    ),
    tag = "auth"
)]
pub(crate) async fn sign_out(State(state): State<AppState>, current: CurrentSession) -> Response {
    state.sessions.revoke(&current.token);
    tracing::info!(user_id = %current.user_id(), "signed out");
    with_cookie(clear_session_cookie(), StatusResponse { status: true })
}

/// GET /v1/auth/session -- The current session and its user.
#[utoipa::path(
    get,
    path = "/v1/auth/session",
    responses(
        (status = 200, description = "Current session", body = SessionResponse),
        (status = 401, description = "Not signed in", body = crate::error::ErrorBody),
    ),
    tag = "auth"
)]
pub(crate) async fn get_session(
    State(state): State<AppState>,
    current: CurrentSession,
) -> Result<Json<SessionResponse>, AppError> {
    let record = state
        .accounts
        .get(current.user_id())
        .ok_or_else(|| AppError::Unauthorized("account no longer exists".into()))?;
    Ok(Json(SessionResponse {
        session: current.session,
        user: record.into(),
    }))
}
