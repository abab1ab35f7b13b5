//! # Opaque Tokens
//!
//! Random bearer secrets and the single-use token table behind email
//! verification, password reset and OAuth `state` values.
//!
//! A token is 32 random bytes, hex-encoded. Only its SHA-256 digest is ever
//! stored, so a dump of the tables cannot be replayed.

use chrono::{DateTime, Duration, Utc};
use rand_core::{OsRng, RngCore};
use sha2::{Digest, Sha256};

use crate::state::Store;

/// Number of random bytes in a token.
const TOKEN_BYTES: usize = 32;

/// Default bound on outstanding tokens per table.
pub const DEFAULT_CAPACITY: usize = 10_000;

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Generate a fresh random token.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    to_hex(&bytes)
}

/// Hex SHA-256 digest of a token, used as its storage key.
pub fn token_digest(token: &str) -> String {
    to_hex(&Sha256::digest(token.as_bytes()))
}

#[derive(Debug, Clone)]
struct Pending<T> {
    payload: T,
    expires_at: DateTime<Utc>,
}

/// Single-use tokens carrying a payload, with a fixed lifetime.
///
/// Issuing into a full table first drops expired tokens, then the tokens
/// closest to expiry, so the table never grows past its capacity.
#[derive(Debug)]
pub struct OneTimeTokens<T> {
    pending: Store<String, Pending<T>>,
    ttl: Duration,
    capacity: usize,
}

impl<T> Clone for OneTimeTokens<T> {
    fn clone(&self) -> Self {
        Self {
            pending: self.pending.clone(),
            ttl: self.ttl,
            capacity: self.capacity,
        }
    }
}

impl<T: Clone + Send + Sync> OneTimeTokens<T> {
    /// Empty table whose tokens live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self::with_capacity(ttl, DEFAULT_CAPACITY)
    }

    /// Empty table holding at most `capacity` outstanding tokens.
    pub fn with_capacity(ttl: Duration, capacity: usize) -> Self {
        Self {
            pending: Store::new(),
            ttl,
            capacity: capacity.max(1),
        }
    }

    /// Issue a token for the payload.
    pub fn issue(&self, payload: T) -> String {
        self.issue_at(payload, Utc::now())
    }

    /// Issue a token as of `now`.
    pub fn issue_at(&self, payload: T, now: DateTime<Utc>) -> String {
        if self.pending.len() >= self.capacity {
            self.make_room(now);
        }
        let token = generate_token();
        self.pending.insert(
            token_digest(&token),
            Pending {
                payload,
                expires_at: now + self.ttl,
            },
        );
        token
    }

    /// Redeem a token. It is removed whether or not it has expired.
    pub fn consume(&self, token: &str) -> Option<T> {
        self.consume_at(token, Utc::now())
    }

    /// Redeem a token as of `now`.
    pub fn consume_at(&self, token: &str, now: DateTime<Utc>) -> Option<T> {
        let entry = self.pending.remove(&token_digest(token))?;
        (now < entry.expires_at).then_some(entry.payload)
    }

    /// Drop every token whose payload matches. Returns how many were dropped.
    pub fn revoke_where(&self, mut matches: impl FnMut(&T) -> bool) -> usize {
        self.pending.retain(|_, entry| !matches(&entry.payload))
    }

    /// Drop expired tokens. Returns how many were dropped.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        self.pending.retain(|_, entry| now < entry.expires_at)
    }

    fn make_room(&self, now: DateTime<Utc>) {
        let purged = self.purge_expired(now);
        if self.pending.len() < self.capacity {
            tracing::debug!(purged, "purged expired one-time tokens");
            return;
        }
        let oldest = self
            .pending
            .list()
            .into_iter()
            .map(|entry| entry.expires_at)
            .min();
        if let Some(cutoff) = oldest {
            let evicted = self.pending.retain(|_, entry| entry.expires_at > cutoff);
            tracing::warn!(purged, evicted, "one-time token table full, evicted oldest");
        }
    }

    /// Number of outstanding tokens.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether no tokens are outstanding.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
