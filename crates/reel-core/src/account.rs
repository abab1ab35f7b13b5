//! # Account Contracts
//!
//! Wire shapes shared by the API server and the client. All of them use
//! camelCase field names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::{EmailAddress, UserId};

/// The authoritative user record as stored by the account store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRecord {
    /// Account identifier.
    pub id: UserId,
    /// Display name chosen at sign-up.
    pub name: String,
    /// Normalized email address.
    pub email: EmailAddress,
    /// Whether the email address has been confirmed.
    pub email_verified: bool,
    /// Avatar URL, when the account has one.
    #[serde(default)]
    pub image: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl AccountRecord {
    /// Read-only identity projection of this record.
    pub fn identity(&self) -> AccountIdentity {
        AccountIdentity {
            email: self.email.clone(),
            display_name: self.name.clone(),
            verified: self.email_verified,
        }
    }
}

/// Identity of an account as reported by the email lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountIdentity {
    /// Normalized email address.
    pub email: EmailAddress,
    /// Display name.
    pub display_name: String,
    /// Whether the email address has been confirmed.
    pub verified: bool,
}

/// Response of the email existence lookup.
///
/// `verified` and `display_name` are only meaningful when `exists` is true.
/// `error` is set when the lookup itself failed on the server side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupResult {
    /// Whether an account with the email exists.
    pub exists: bool,
    /// Whether that account is verified.
    #[serde(default)]
    pub verified: bool,
    /// Display name of the account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Server-side lookup failure description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LookupResult {
    /// A lookup that found the given account.
    pub fn found(identity: &AccountIdentity) -> Self {
        Self {
            exists: true,
            verified: identity.verified,
            display_name: Some(identity.display_name.clone()),
            error: None,
        }
    }

    /// A lookup that found nothing.
    pub fn not_found() -> Self {
        Self::default()
    }

    /// A lookup that failed on the server side.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }
}
