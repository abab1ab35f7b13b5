//! # Federated Sign-In
//!
//! Starts the OAuth 2.0 authorization-code flow with a social provider:
//! a single-use `state` value is stored and the provider's authorization URL
//! is returned for the browser to follow. Exchanging the returned code is
//! left to the external identity provider integration, which redeems the
//! `state` through [`OneTimeTokens::consume`]. States that are never redeemed
//! expire after [`oauth_state_ttl`] and are purged when the table fills.

use chrono::Duration;
use reel_core::SocialProvider;
use url::Url;
use zeroize::Zeroizing;

use crate::tokens::OneTimeTokens;

/// Lifetime of an OAuth `state` value.
pub fn oauth_state_ttl() -> Duration {
    Duration::minutes(10)
}

const GOOGLE_AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_SCOPES: &str = "openid email profile";

/// Google OAuth client credentials.
///
/// `Debug` redacts the client secret.
#[derive(Clone)]
pub struct GoogleOAuthConfig {
    pub client_id: String,
    pub client_secret: Zeroizing<String>,
    /// Where Google sends the browser back to.
    pub redirect_uri: String,
}

impl std::fmt::Debug for GoogleOAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleOAuthConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("redirect_uri", &self.redirect_uri)
            .finish()
    }
}

impl GoogleOAuthConfig {
    /// Credentials with the callback derived from the public base URL.
    pub fn new(client_id: String, client_secret: String, public_url: &str) -> Self {
        Self {
            client_id,
            client_secret: Zeroizing::new(client_secret),
            redirect_uri: format!(
                "{}/v1/auth/callback/google",
                public_url.trim_end_matches('/')
            ),
        }
    }

    /// Authorization URL carrying the given `state`.
    pub fn authorization_url(&self, state: &str) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(GOOGLE_AUTHORIZE_URL)?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", GOOGLE_SCOPES)
            .append_pair("state", state);
        Ok(url)
    }
}

/// What a pending `state` value remembers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthState {
    pub provider: SocialProvider,
    /// Relative path to land on after the flow completes.
    pub callback_url: String,
}

/// Outcome of starting a federated sign-in.
#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    #[error("{0} sign-in is not configured")]
    NotConfigured(SocialProvider),
    #[error("failed to build authorization URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Register a `state` and build the provider's authorization URL.
pub fn start_authorization(
    google: Option<&GoogleOAuthConfig>,
    states: &OneTimeTokens<OAuthState>,
    provider: SocialProvider,
    callback_url: String,
) -> Result<Url, OAuthError> {
    let config = match provider {
        SocialProvider::Google => google.ok_or(OAuthError::NotConfigured(provider))?,
    };
    let state = states.issue(OAuthState {
        provider,
        callback_url,
    });
    let url = config.authorization_url(&state)?;
    tracing::info!(provider = %provider, "federated sign-in started");
    Ok(url)
}
