//! # Account Service
//!
//! In-memory user store and the email/password flows built on it:
//! sign-up with email verification, sign-in, email lookup, password reset
//! and profile edits.
//!
//! ## Invariants
//!
//! - Accounts are keyed by normalized email; the email never changes after
//!   sign-up, so the id-to-email index cannot go stale.
//! - Passwords are stored only as argon2id PHC strings.
//! - Verification and reset tokens are single-use. Using any of them
//!   invalidates the user's other outstanding tokens of the same kind.
//! - A password reset ends every session of the user.

use std::sync::Arc;

use chrono::{Duration, Utc};
use reel_core::{
    validate_display_name, validate_password_pair, AccountIdentity, AccountRecord, EmailAddress,
    SignUpForm, UserId, ValidatedSignUp, ValidationError,
};

use crate::mailer::{MailError, Mailer, OutgoingEmail};
use crate::password::{hash_password, verify_password};
use crate::sessions::SessionStore;
use crate::state::Store;
use crate::tokens::OneTimeTokens;

/// Lifetime of an email verification link.
pub fn verification_ttl() -> Duration {
    Duration::hours(24)
}

/// Lifetime of a password reset link.
pub fn reset_ttl() -> Duration {
    Duration::hours(1)
}

/// Page the reset link opens when the caller names none.
pub const DEFAULT_RESET_PATH: &str = "/reset-password";

/// Path of the email verification endpoint.
pub const VERIFY_EMAIL_PATH: &str = "/v1/auth/verify-email";

/// Errors from account operations.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("an account for {0} already exists")]
    DuplicateEmail(EmailAddress),
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Email is not verified")]
    EmailNotVerified,
    #[error("invalid or expired token")]
    InvalidToken,
    #[error("redirect target must be a relative path: {0}")]
    UnsafeRedirect(String),
    #[error("user {0} not found")]
    NotFound(UserId),
    #[error("password hashing failed: {0}")]
    Hashing(String),
    #[error(transparent)]
    Mail(#[from] MailError),
}

/// Whether a redirect target stays on this site.
pub fn is_safe_redirect(target: &str) -> bool {
    target.starts_with('/') && !target.starts_with("//") && !target.contains('\\')
}

/// Where links in outgoing mail point.
#[derive(Debug, Clone)]
pub struct LinkSettings {
    /// Public base URL without a trailing slash.
    pub public_url: String,
    /// Page opened after a successful email verification.
    pub verification_callback: String,
}

#[derive(Clone)]
struct StoredAccount {
    record: AccountRecord,
    password_hash: String,
}

/// The account store and its flows.
#[derive(Clone)]
pub struct AccountService {
    accounts: Store<EmailAddress, StoredAccount>,
    emails: Store<UserId, EmailAddress>,
    verifications: OneTimeTokens<UserId>,
    resets: OneTimeTokens<UserId>,
    sessions: SessionStore,
    mailer: Arc<dyn Mailer>,
    links: LinkSettings,
}

impl AccountService {
    /// Empty store sending mail through `mailer`. `sessions` is the table
    /// password resets revoke from.
    pub fn new(mailer: Arc<dyn Mailer>, links: LinkSettings, sessions: SessionStore) -> Self {
        Self {
            accounts: Store::new(),
            emails: Store::new(),
            verifications: OneTimeTokens::new(verification_ttl()),
            resets: OneTimeTokens::new(reset_ttl()),
            sessions,
            mailer,
            links,
        }
    }

    fn link(&self, path: &str, params: &[(&str, &str)]) -> String {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params)
            .finish();
        format!("{}{path}?{query}", self.links.public_url)
    }

    // ── Sign-up & verification ──────────────────────────────────────

    /// Create an unverified account and mail its verification link.
    ///
    /// A mail failure is logged; the account still exists and the link can
    /// be re-sent.
    pub fn sign_up(&self, form: SignUpForm) -> Result<AccountRecord, AccountError> {
        let ValidatedSignUp {
            name,
            email,
            password,
        } = form.validate()?;

        if self.accounts.get(&email).is_some() {
            return Err(AccountError::DuplicateEmail(email));
        }

        let password_hash = hash_password(&password).map_err(AccountError::Hashing)?;
        let now = Utc::now();
        let record = AccountRecord {
            id: UserId::new(),
            name,
            email: email.clone(),
            email_verified: false,
            image: None,
            created_at: now,
            updated_at: now,
        };

        let stored = StoredAccount {
            record: record.clone(),
            password_hash,
        };
        if !self.accounts.insert_new(email.clone(), stored) {
            return Err(AccountError::DuplicateEmail(email));
        }
        self.emails.insert(record.id, email);
        tracing::info!(user_id = %record.id, "account created");

        if let Err(e) = self.send_verification(&record) {
            tracing::warn!(user_id = %record.id, error = %e, "verification email not sent");
        }
        Ok(record)
    }

    fn send_verification(&self, record: &AccountRecord) -> Result<(), AccountError> {
        let token = self.verifications.issue(record.id);
        let link = self.link(
            VERIFY_EMAIL_PATH,
            &[
                ("token", token.as_str()),
                ("callbackURL", self.links.verification_callback.as_str()),
            ],
        );
        self.mailer.send(OutgoingEmail::new(
            record.email.as_str(),
            "Verify your email address",
            &format!("Click the link to verify your email: {link}"),
        ))?;
        Ok(())
    }

    /// Send a fresh verification link to an unverified account.
    ///
    /// Unknown and already verified addresses succeed silently.
    pub fn resend_verification(&self, email: &str) -> Result<(), AccountError> {
        let email = EmailAddress::parse(email)?;
        match self.accounts.get(&email) {
            Some(account) if !account.record.email_verified => {
                self.send_verification(&account.record)
            }
            _ => Ok(()),
        }
    }

    /// Redeem a verification token and mark the account verified.
    pub fn verify_email(&self, token: &str) -> Result<AccountRecord, AccountError> {
        let user_id = self
            .verifications
            .consume(token)
            .ok_or(AccountError::InvalidToken)?;
        let email = self.emails.get(&user_id).ok_or(AccountError::InvalidToken)?;
        let account = self
            .accounts
            .update(&email, |account| {
                account.record.email_verified = true;
                account.record.updated_at = Utc::now();
            })
            .ok_or(AccountError::InvalidToken)?;
        self.verifications.revoke_where(|id| *id == user_id);
        tracing::info!(user_id = %user_id, "email verified");
        Ok(account.record)
    }

    // ── Sign-in & lookup ────────────────────────────────────────────

    /// Check an email/password pair.
    ///
    /// Unknown email and wrong password are indistinguishable. The
    /// verification check runs only after the password matched.
    pub fn sign_in(&self, email: &str, password: &str) -> Result<AccountRecord, AccountError> {
        let email = EmailAddress::parse(email)?;
        if password.is_empty() {
            return Err(ValidationError::EmptyPassword.into());
        }

        let account = self
            .accounts
            .get(&email)
            .ok_or(AccountError::InvalidCredentials)?;
        if !verify_password(password, &account.password_hash) {
            tracing::info!(user_id = %account.record.id, "sign-in rejected: wrong password");
            return Err(AccountError::InvalidCredentials);
        }
        if !account.record.email_verified {
            return Err(AccountError::EmailNotVerified);
        }
        Ok(account.record)
    }

    /// Existence and verification status of an email address.
    pub fn lookup(&self, email: &str) -> Result<Option<AccountIdentity>, AccountError> {
        let email = EmailAddress::parse(email)?;
        Ok(self.accounts.get(&email).map(|a| a.record.identity()))
    }

    /// Account record by id.
    pub fn get(&self, user_id: UserId) -> Option<AccountRecord> {
        let email = self.emails.get(&user_id)?;
        self.accounts.get(&email).map(|a| a.record)
    }

    // ── Password reset ──────────────────────────────────────────────

    /// Mail a reset link if the account exists. Always succeeds for a
    /// well-formed address so callers cannot probe for accounts.
    pub fn request_password_reset(
        &self,
        email: &str,
        redirect_to: Option<&str>,
    ) -> Result<(), AccountError> {
        let email = EmailAddress::parse(email)?;
        let path = redirect_to.unwrap_or(DEFAULT_RESET_PATH);
        if !is_safe_redirect(path) {
            return Err(AccountError::UnsafeRedirect(path.to_string()));
        }

        let Some(account) = self.accounts.get(&email) else {
            tracing::debug!("password reset requested for unknown address");
            return Ok(());
        };

        let token = self.resets.issue(account.record.id);
        let link = self.link(path, &[("token", token.as_str())]);
        let sent = self.mailer.send(OutgoingEmail::new(
            account.record.email.as_str(),
            "Reset your password",
            &format!("Click the link to reset your password: {link}"),
        ));
        if let Err(e) = sent {
            self.resets.consume(&token);
            tracing::warn!(user_id = %account.record.id, error = %e, "reset email not sent");
        }
        Ok(())
    }

    /// Set a new password with a reset token and end all sessions of the user.
    pub fn reset_password(
        &self,
        token: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<UserId, AccountError> {
        validate_password_pair(new_password, confirm_password)?;

        let user_id = self.resets.consume(token).ok_or(AccountError::InvalidToken)?;
        let email = self.emails.get(&user_id).ok_or(AccountError::InvalidToken)?;
        let password_hash = hash_password(new_password).map_err(AccountError::Hashing)?;
        self.accounts
            .update(&email, |account| {
                account.password_hash = password_hash;
                account.record.updated_at = Utc::now();
            })
            .ok_or(AccountError::InvalidToken)?;

        self.resets.revoke_where(|id| *id == user_id);
        self.sessions.revoke_all(user_id);
        tracing::info!(user_id = %user_id, "password reset");
        Ok(user_id)
    }

    // ── Profile ─────────────────────────────────────────────────────

    /// Change the display name, the only user-editable field.
    pub fn update_profile(&self, user_id: UserId, name: &str) -> Result<AccountRecord, AccountError> {
        let name = validate_display_name(name)?;
        let email = self
            .emails
            .get(&user_id)
            .ok_or(AccountError::NotFound(user_id))?;
        self.accounts
            .update(&email, |account| {
                account.record.name = name;
                account.record.updated_at = Utc::now();
            })
            .map(|a| a.record)
            .ok_or(AccountError::NotFound(user_id))
    }
}
