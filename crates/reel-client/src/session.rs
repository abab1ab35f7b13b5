//! # Session Context
//!
//! The established session is an explicit value handed to the components
//! that need it. Nothing in this crate reads it from ambient state.

use reel_core::{AccountRecord, UserId};
use zeroize::Zeroizing;

/// Bearer token plus the signed-in user's record.
#[derive(Clone)]
pub struct SessionContext {
    /// Opaque bearer token. Zeroized on drop.
    pub token: Zeroizing<String>,
    /// Account record returned at sign-in.
    pub user: AccountRecord,
}

impl SessionContext {
    pub fn new(token: impl Into<String>, user: AccountRecord) -> Self {
        Self {
            token: Zeroizing::new(token.into()),
            user,
        }
    }

    /// Identifier of the signed-in user.
    pub fn user_id(&self) -> UserId {
        self.user.id
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("token", &"[REDACTED]")
            .field("user", &self.user.id)
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::Utc;
    use reel_core::{AccountRecord, EmailAddress, UserId};

    pub(crate) fn account(name: &str, email: &str) -> AccountRecord {
        let now = Utc::now();
        AccountRecord {
            id: UserId::new(),
            name: name.to_string(),
            email: EmailAddress::parse(email).unwrap(),
            email_verified: true,
            image: None,
            created_at: now,
            updated_at: now,
        }
    }
}
