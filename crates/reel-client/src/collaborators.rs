//! # Collaborator Seams
//!
//! The components in this crate talk to the outside world only through these
//! traits. [`crate::http::ApiClient`] implements all of them against
//! reel-api; tests substitute in-memory fakes.

use async_trait::async_trait;
use reel_core::{AccountRecord, EmailAddress, LookupResult, MovieSummary, SocialProvider, UserId};

use crate::error::ClientError;
use crate::session::SessionContext;

/// Email existence lookup.
///
/// An `Ok` result whose `error` field is set is a server-side failure and is
/// treated like a transport error.
#[async_trait]
pub trait EmailLookup: Send + Sync + 'static {
    async fn lookup(&self, email: &EmailAddress) -> Result<LookupResult, ClientError>;
}

/// Why a sign-in attempt failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignInFailure {
    /// Email and password do not match an account.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),
    /// Anything else: transport, unverified account, server error.
    #[error("sign-in failed: {0}")]
    Other(String),
}

/// Where to send the browser to continue a federated sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FederatedRedirect {
    pub url: String,
}

/// Credential and federated session establishment.
#[async_trait]
pub trait CredentialSessionService: Send + Sync + 'static {
    async fn sign_in(
        &self,
        email: &EmailAddress,
        password: &str,
    ) -> Result<SessionContext, SignInFailure>;

    async fn sign_in_federated(
        &self,
        provider: SocialProvider,
    ) -> Result<FederatedRedirect, SignInFailure>;
}

/// Title search. An empty list is a valid answer.
#[async_trait]
pub trait MovieSearch: Send + Sync + 'static {
    async fn search(&self, query: &str) -> Result<Vec<MovieSummary>, ClientError>;
}

/// Authoritative account record by id. `None` when the account is unknown.
#[async_trait]
pub trait AccountFetch: Send + Sync + 'static {
    async fn fetch_account(&self, id: UserId) -> Result<Option<AccountRecord>, ClientError>;
}

/// Display name change for the signed-in user.
#[async_trait]
pub trait ProfileUpdate: Send + Sync + 'static {
    async fn update_name(&self, name: &str) -> Result<AccountRecord, ClientError>;
}
