//! # reel-client -- Headless Client Core for Reel
//!
//! State machines behind the Reel front end, without any rendering:
//!
//! - [`signin::SignInController`]: the two-stage email-then-password form.
//! - [`search::SearchBox`]: debounced movie search with stale-response
//!   suppression.
//! - [`profile::ProfileView`]: the signed-in user's record with a local
//!   edit draft.
//!
//! Components depend on the traits in [`collaborators`] only.
//! [`http::ApiClient`] implements all of them against reel-api.
//!
//! ```text
//! SignInController ──▶ EmailLookup, CredentialSessionService ─┐
//! SearchBox        ──▶ MovieSearch                            ├─▶ ApiClient ──▶ reel-api
//! ProfileView      ──▶ AccountFetch, ProfileUpdate           ─┘
//! ```
//!
//! The established session is an explicit [`SessionContext`] value.

pub mod collaborators;
pub mod error;
pub mod http;
pub mod notice;
pub mod profile;
pub mod search;
pub mod session;
pub mod signin;

pub use error::ClientError;
pub use http::{ApiClient, ApiClientConfig};
pub use session::SessionContext;
