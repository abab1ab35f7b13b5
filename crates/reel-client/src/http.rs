//! # HTTP Collaborators
//!
//! [`ApiClient`] implements every collaborator trait against reel-api.
//!
//! | Trait                        | Method | Path                          |
//! |------------------------------|--------|-------------------------------|
//! | [`EmailLookup`]              | GET    | `/v1/users/lookup?email=`     |
//! | [`CredentialSessionService`] | POST   | `/v1/auth/sign-in/email`      |
//! | [`CredentialSessionService`] | POST   | `/v1/auth/sign-in/social`     |
//! | [`MovieSearch`]              | GET    | `/v1/movies/search?query=`    |
//! | [`AccountFetch`]             | GET    | `/v1/users/{id}`              |
//! | [`ProfileUpdate`]            | PATCH  | `/v1/profile`                 |
//!
//! Error bodies have the shape `{"error": {"code", "message"}}`. A 401 with
//! code `INVALID_CREDENTIALS` is the only sign-in failure classified as
//! invalid credentials.

use std::time::Duration;

use async_trait::async_trait;
use reel_core::{
    AccountRecord, EmailAddress, LookupResult, MoviePage, MovieSummary, SocialProvider, UserId,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;
use zeroize::Zeroizing;

use crate::collaborators::{
    AccountFetch, CredentialSessionService, EmailLookup, FederatedRedirect, MovieSearch,
    ProfileUpdate, SignInFailure,
};
use crate::error::ClientError;
use crate::session::SessionContext;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Where federated sign-in returns to when no callback is given.
pub const DEFAULT_SOCIAL_CALLBACK: &str = "/movies";

/// Connection settings for [`ApiClient`].
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    pub base_url: Url,
    pub timeout_secs: u64,
}

impl ApiClientConfig {
    /// Settings for the given base URL with the default timeout.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ClientError::Config(format!("invalid base URL \"{base_url}\": {e}")))?;
        Ok(Self {
            base_url,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        })
    }

    /// Read `REEL_API_URL` (default `http://localhost:8080`) and
    /// `REEL_API_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ClientError> {
        let base = std::env::var("REEL_API_URL").unwrap_or_else(|_| "http://localhost:8080".into());
        let mut config = Self::new(&base)?;
        if let Ok(raw) = std::env::var("REEL_API_TIMEOUT_SECS") {
            config.timeout_secs = raw.parse().map_err(|_| {
                ClientError::Config(format!("REEL_API_TIMEOUT_SECS must be an integer, got \"{raw}\""))
            })?;
        }
        Ok(config)
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorPayload,
}

#[derive(Deserialize)]
struct ErrorPayload {
    code: String,
    message: String,
}

#[derive(Deserialize)]
struct SignInPayload {
    token: String,
    user: AccountRecord,
}

#[derive(Deserialize)]
struct SocialPayload {
    url: String,
}

/// Typed client for reel-api.
///
/// Cheap to clone. Authenticated calls use the token attached with
/// [`ApiClient::with_session`].
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    session_token: Option<Zeroizing<String>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("session_token", &self.session_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl ApiClient {
    pub fn new(config: ApiClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ClientError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;
        Ok(Self {
            http,
            base_url: config.base_url,
            session_token: None,
        })
    }

    /// A copy of this client that authenticates as the given session.
    pub fn with_session(&self, session: &SessionContext) -> Self {
        Self {
            session_token: Some(session.token.clone()),
            ..self.clone()
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.as_str().trim_end_matches('/'))
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.session_token {
            Some(token) => request.bearer_auth(token.as_str()),
            None => request,
        }
    }

    async fn send(
        &self,
        endpoint: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ClientError> {
        let resp = request.send().await.map_err(|e| ClientError::Http {
            endpoint: endpoint.into(),
            source: e,
        })?;
        if resp.status().is_success() {
            Ok(resp)
        } else {
            Err(api_error(endpoint, resp).await)
        }
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let resp = self.send(endpoint, request).await?;
        decode(endpoint, resp).await
    }
}

async fn api_error(endpoint: &str, resp: reqwest::Response) -> ClientError {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    let (code, message) = match serde_json::from_str::<ErrorEnvelope>(&body) {
        Ok(envelope) => (Some(envelope.error.code), envelope.error.message),
        Err(_) => (None, body),
    };
    tracing::debug!(endpoint, status, code = ?code, "API call failed");
    ClientError::Api {
        endpoint: endpoint.into(),
        status,
        code,
        message,
    }
}

async fn decode<T: DeserializeOwned>(
    endpoint: &str,
    resp: reqwest::Response,
) -> Result<T, ClientError> {
    resp.json().await.map_err(|e| ClientError::Deserialization {
        endpoint: endpoint.into(),
        source: e,
    })
}

fn classify_sign_in(err: ClientError) -> SignInFailure {
    match err {
        ClientError::Api {
            status: 401,
            code: Some(code),
            message,
            ..
        } if code == "INVALID_CREDENTIALS" => SignInFailure::InvalidCredentials(message),
        other => SignInFailure::Other(other.to_string()),
    }
}

#[async_trait]
impl EmailLookup for ApiClient {
    async fn lookup(&self, email: &EmailAddress) -> Result<LookupResult, ClientError> {
        let request = self
            .http
            .get(self.url("/v1/users/lookup"))
            .query(&[("email", email.as_str())]);
        self.send_json("GET /v1/users/lookup", request).await
    }
}

#[async_trait]
impl CredentialSessionService for ApiClient {
    async fn sign_in(
        &self,
        email: &EmailAddress,
        password: &str,
    ) -> Result<SessionContext, SignInFailure> {
        let endpoint = "POST /v1/auth/sign-in/email";
        let request = self.http.post(self.url("/v1/auth/sign-in/email")).json(
            &serde_json::json!({ "email": email.as_str(), "password": password }),
        );
        let payload: SignInPayload = self
            .send_json(endpoint, request)
            .await
            .map_err(classify_sign_in)?;
        tracing::debug!(user = %payload.user.id, "signed in");
        Ok(SessionContext::new(payload.token, payload.user))
    }

    async fn sign_in_federated(
        &self,
        provider: SocialProvider,
    ) -> Result<FederatedRedirect, SignInFailure> {
        let endpoint = "POST /v1/auth/sign-in/social";
        let request = self.http.post(self.url("/v1/auth/sign-in/social")).json(
            &serde_json::json!({
                "provider": provider.as_str(),
                "callbackURL": DEFAULT_SOCIAL_CALLBACK,
            }),
        );
        let payload: SocialPayload = self
            .send_json(endpoint, request)
            .await
            .map_err(|e| SignInFailure::Other(e.to_string()))?;
        Ok(FederatedRedirect { url: payload.url })
    }
}

#[async_trait]
impl MovieSearch for ApiClient {
    async fn search(&self, query: &str) -> Result<Vec<MovieSummary>, ClientError> {
        let request = self
            .http
            .get(self.url("/v1/movies/search"))
            .query(&[("query", query)]);
        let page: MoviePage<MovieSummary> =
            self.send_json("GET /v1/movies/search", request).await?;
        Ok(page.results)
    }
}

#[async_trait]
impl AccountFetch for ApiClient {
    async fn fetch_account(&self, id: UserId) -> Result<Option<AccountRecord>, ClientError> {
        let endpoint = format!("GET /v1/users/{id}");
        let request = self.authorized(self.http.get(self.url(&format!("/v1/users/{id}"))));
        match self.send_json(&endpoint, request).await {
            Ok(record) => Ok(Some(record)),
            Err(ClientError::Api { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl ProfileUpdate for ApiClient {
    async fn update_name(&self, name: &str) -> Result<AccountRecord, ClientError> {
        let request = self
            .authorized(self.http.patch(self.url("/v1/profile")))
            .json(&serde_json::json!({ "name": name }));
        self.send_json("PATCH /v1/profile", request).await
    }
}
