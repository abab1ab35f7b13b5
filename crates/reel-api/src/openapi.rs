//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI spec,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Reel API",
        version = "0.1.0",
        description = "Accounts with email verification, progressive sign-in support, sessions, profile, and a read-only movie catalog proxy.",
        license(name = "MIT")
    ),
    paths(
        // Auth
        crate::routes::auth::sign_up,
        crate::routes::auth::sign_in,
        crate::routes::auth::sign_in_social,
        crate::routes::auth::verify_email,
        crate::routes::auth::send_verification_email,
        crate::routes::auth::forgot_password,
        crate::routes::auth::reset_password,
        crate::routes::auth::sign_out,
        crate::routes::auth::get_session,
        // Users
        crate::routes::users::lookup_email,
        crate::routes::users::get_user,
        // Profile
        crate::routes::profile::get_profile,
        crate::routes::profile::update_profile,
        // Movies
        crate::routes::movies::popular_movies,
        crate::routes::movies::search_movies,
        crate::routes::movies::get_movie,
        crate::routes::movies::get_genre,
    ),
    components(schemas(
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        crate::sessions::SessionRecord,
        crate::routes::StatusResponse,
        crate::routes::users::UserView,
        crate::routes::users::LookupResponse,
        crate::routes::auth::SignUpRequest,
        crate::routes::auth::UserResponse,
        crate::routes::auth::SignInRequest,
        crate::routes::auth::SignInResponse,
        crate::routes::auth::SocialSignInRequest,
        crate::routes::auth::SocialSignInResponse,
        crate::routes::auth::VerifyEmailResponse,
        crate::routes::auth::EmailRequest,
        crate::routes::auth::ForgotPasswordRequest,
        crate::routes::auth::ResetPasswordRequest,
        crate::routes::auth::SessionResponse,
        crate::routes::profile::UpdateProfileRequest,
    )),
    tags(
        (name = "auth", description = "Sign-up, verification, sign-in and sessions"),
        (name = "users", description = "Email lookup and account records"),
        (name = "profile", description = "The signed-in user's profile"),
        (name = "movies", description = "Movie catalog proxy"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json -- Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
