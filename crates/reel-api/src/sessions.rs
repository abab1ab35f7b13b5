//! # Sessions
//!
//! Server-side session table. Clients hold the raw token; the table is keyed
//! by its digest. A session lives for 30 days and its expiry slides forward
//! when it is used more than a day after the last refresh.

use chrono::{DateTime, Duration, Utc};
use reel_core::UserId;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::state::Store;
use crate::tokens::{generate_token, token_digest};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "reel.session_token";

/// Session lifetime.
pub fn session_ttl() -> Duration {
    Duration::days(30)
}

/// Minimum age before a used session has its expiry extended.
pub fn refresh_after() -> Duration {
    Duration::days(1)
}

/// A live session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: Uuid,
    #[schema(value_type = String)]
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// A newly created session together with the raw token handed to the client.
///
/// `Debug` redacts the token.
pub struct IssuedSession {
    pub token: Zeroizing<String>,
    pub session: SessionRecord,
}

impl std::fmt::Debug for IssuedSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuedSession")
            .field("token", &"[REDACTED]")
            .field("session", &self.session)
            .finish()
    }
}

/// Session table keyed by token digest.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    by_digest: Store<String, SessionRecord>,
}

impl SessionStore {
    /// Empty session table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a session for the user.
    pub fn create(&self, user_id: UserId) -> IssuedSession {
        self.create_at(user_id, Utc::now())
    }

    /// Open a session as of `now`.
    pub fn create_at(&self, user_id: UserId, now: DateTime<Utc>) -> IssuedSession {
        let token = Zeroizing::new(generate_token());
        let session = SessionRecord {
            id: Uuid::new_v4(),
            user_id,
            created_at: now,
            updated_at: now,
            expires_at: now + session_ttl(),
        };
        self.by_digest.insert(token_digest(&token), session.clone());
        tracing::debug!(session_id = %session.id, user_id = %user_id, "session created");
        IssuedSession { token, session }
    }

    /// Look up the session for a token, refreshing its expiry when due.
    pub fn resolve(&self, token: &str) -> Option<SessionRecord> {
        self.resolve_at(token, Utc::now())
    }

    /// Look up a session as of `now`. Expired sessions are removed.
    pub fn resolve_at(&self, token: &str, now: DateTime<Utc>) -> Option<SessionRecord> {
        let digest = token_digest(token);
        let outcome = self.by_digest.try_update(&digest, |session| {
            if now >= session.expires_at {
                return Err(());
            }
            if now - session.updated_at >= refresh_after() {
                session.updated_at = now;
                session.expires_at = now + session_ttl();
            }
            Ok(session.clone())
        })?;
        match outcome {
            Ok(session) => Some(session),
            Err(()) => {
                self.by_digest.remove(&digest);
                None
            }
        }
    }

    /// End the session for a token. Returns whether one existed.
    pub fn revoke(&self, token: &str) -> bool {
        self.by_digest.remove(&token_digest(token)).is_some()
    }

    /// End every session of a user. Returns how many were ended.
    pub fn revoke_all(&self, user_id: UserId) -> usize {
        let dropped = self.by_digest.retain(|_, s| s.user_id != user_id);
        if dropped > 0 {
            tracing::info!(user_id = %user_id, dropped, "sessions revoked");
        }
        dropped
    }

    /// Number of stored sessions.
    pub fn len(&self) -> usize {
        self.by_digest.len()
    }

    /// Whether no sessions are stored.
    pub fn is_empty(&self) -> bool {
        self.by_digest.is_empty()
    }
}
