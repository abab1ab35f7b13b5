//! # Credential Rules
//!
//! Length rules for display names and passwords, and the sign-up form that
//! combines them with email validation. Lengths are counted in characters,
//! not bytes.

use serde::Deserialize;

use crate::error::ValidationError;
use crate::identity::EmailAddress;

/// Maximum display name length.
pub const NAME_MAX_LEN: usize = 50;

/// Minimum password length.
pub const PASSWORD_MIN_LEN: usize = 8;

/// Maximum password length.
pub const PASSWORD_MAX_LEN: usize = 32;

/// Trim and check a display name.
pub fn validate_display_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if trimmed.chars().count() > NAME_MAX_LEN {
        return Err(ValidationError::NameTooLong { max: NAME_MAX_LEN });
    }
    Ok(trimmed.to_string())
}

/// Check a password against the length rules. Passwords are never trimmed.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    let len = password.chars().count();
    if len == 0 {
        return Err(ValidationError::EmptyPassword);
    }
    if len < PASSWORD_MIN_LEN {
        return Err(ValidationError::PasswordTooShort {
            min: PASSWORD_MIN_LEN,
        });
    }
    if len > PASSWORD_MAX_LEN {
        return Err(ValidationError::PasswordTooLong {
            max: PASSWORD_MAX_LEN,
        });
    }
    Ok(())
}

/// Check a password and its confirmation.
pub fn validate_password_pair(password: &str, confirm: &str) -> Result<(), ValidationError> {
    validate_password(password)?;
    if password != confirm {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

/// Raw sign-up form as submitted by the user.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpForm {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Password.
    pub password: String,
    /// Password confirmation.
    pub confirm_password: String,
}

impl std::fmt::Debug for SignUpForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignUpForm")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("confirm_password", &"[REDACTED]")
            .finish()
    }
}

impl SignUpForm {
    /// Apply every rule, reporting the first violation in field order.
    pub fn validate(self) -> Result<ValidatedSignUp, ValidationError> {
        let name = validate_display_name(&self.name)?;
        let email = EmailAddress::parse(&self.email)?;
        validate_password_pair(&self.password, &self.confirm_password)?;
        Ok(ValidatedSignUp {
            name,
            email,
            password: self.password,
        })
    }
}

/// A sign-up form that passed validation.
#[derive(Clone)]
pub struct ValidatedSignUp {
    /// Trimmed display name.
    pub name: String,
    /// Normalized email address.
    pub email: EmailAddress,
    /// Password, unchanged.
    pub password: String,
}

impl std::fmt::Debug for ValidatedSignUp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatedSignUp")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}
