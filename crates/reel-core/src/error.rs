//! # Error Types
//!
//! Validation errors raised while constructing domain values. They carry the
//! rejected input (never a password) so callers can echo it back to the user.

use thiserror::Error;

/// Input failed a domain validation rule.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Email is empty after trimming.
    #[error("email is required")]
    EmptyEmail,

    /// Email does not have a plausible `local@domain.tld` shape.
    #[error("invalid email address: \"{0}\"")]
    InvalidEmail(String),

    /// Display name is empty after trimming.
    #[error("name is required")]
    EmptyName,

    /// Display name exceeds the maximum length.
    #[error("name must be at most {max} characters")]
    NameTooLong {
        /// Maximum number of characters.
        max: usize,
    },

    /// Password is empty.
    #[error("password is required")]
    EmptyPassword,

    /// Password is shorter than the minimum length.
    #[error("password must be at least {min} characters")]
    PasswordTooShort {
        /// Minimum number of characters.
        min: usize,
    },

    /// Password is longer than the maximum length.
    #[error("password must be at most {max} characters")]
    PasswordTooLong {
        /// Maximum number of characters.
        max: usize,
    },

    /// Password confirmation does not match the password.
    #[error("passwords don't match")]
    PasswordMismatch,

    /// Social provider identifier is not supported.
    #[error("unknown sign-in provider: \"{0}\"")]
    UnknownProvider(String),
}

impl ValidationError {
    /// Name of the form field the error belongs to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyEmail | Self::InvalidEmail(_) => "email",
            Self::EmptyName | Self::NameTooLong { .. } => "name",
            Self::EmptyPassword | Self::PasswordTooShort { .. } | Self::PasswordTooLong { .. } => {
                "password"
            }
            Self::PasswordMismatch => "confirmPassword",
            Self::UnknownProvider(_) => "provider",
        }
    }
}
