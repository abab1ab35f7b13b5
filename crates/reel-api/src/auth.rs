//! # Session Authentication
//!
//! The session middleware resolves the caller's session once per request and
//! injects a [`CurrentSession`] into the request extensions. It never rejects:
//! public routes work without a session, and handlers that need one take
//! [`CurrentSession`] as an extractor, which answers 401 when it is absent.
//!
//! ## Token sources
//!
//! ```text
//! Authorization: Bearer {token}        -- API clients
//! Cookie: reel.session_token={token}   -- browsers
//! ```
//!
//! The header wins when both are present.

use axum::extract::{Request, State};
use axum::http::request::Parts;
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;
use reel_core::UserId;
use zeroize::Zeroizing;

use crate::error::AppError;
use crate::sessions::{session_ttl, SessionRecord, SESSION_COOKIE};
use crate::state::AppState;

// ── CurrentSession ──────────────────────────────────────────────────────────

/// The session resolved for this request.
///
/// `Debug` redacts the token.
#[derive(Clone)]
pub struct CurrentSession {
    pub session: SessionRecord,
    /// Raw token the caller presented, needed to revoke the session.
    pub token: Zeroizing<String>,
}

impl CurrentSession {
    pub fn user_id(&self) -> UserId {
        self.session.user_id
    }
}

impl std::fmt::Debug for CurrentSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrentSession")
            .field("session", &self.session)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Extracts the session the middleware injected. Returns 401 if there is none.
#[axum::async_trait]
impl<S: Send + Sync> axum::extract::FromRequestParts<S> for CurrentSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentSession>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("sign-in required".into()))
    }
}

// ── Token extraction ────────────────────────────────────────────────────────

/// The session token presented with a request, if any.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

// ── Cookies ─────────────────────────────────────────────────────────────────

/// `Set-Cookie` value carrying a session token.
pub fn session_cookie(token: &str, secure: bool) -> String {
    let mut cookie = format!(
        "{SESSION_COOKIE}={token}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        session_ttl().num_seconds()
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that deletes the session cookie.
pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0")
}

// ── Middleware ──────────────────────────────────────────────────────────────

/// Resolve the presented session token and inject [`CurrentSession`].
///
/// Unknown and expired tokens are ignored; the request continues anonymous.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = session_token(request.headers()) {
        match state.sessions.resolve(&token) {
            Some(session) => {
                request.extensions_mut().insert(CurrentSession {
                    session,
                    token: Zeroizing::new(token),
                });
            }
            None => tracing::debug!("presented session token is unknown or expired"),
        }
    }
    next.run(request).await
}
