//! # User-Facing Messages
//!
//! Field errors and transient notices shown by the sign-in form. Copy is in
//! Polish, matching the rest of the product.

use reel_core::ValidationError;

/// Path of the password reset page.
pub const FORGOT_PASSWORD_PATH: &str = "/forgot-password";

/// Form field an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Email,
    Password,
}

/// Error annotation on a single form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

impl FieldError {
    pub fn email(message: impl Into<String>) -> Self {
        Self {
            field: Field::Email,
            message: message.into(),
        }
    }

    pub fn password(message: impl Into<String>) -> Self {
        Self {
            field: Field::Password,
            message: message.into(),
        }
    }

    /// Email format failure, before any network call.
    pub(crate) fn from_email_validation(err: &ValidationError) -> Self {
        match err {
            ValidationError::EmptyEmail => Self::email("E-mail jest wymagany"),
            _ => Self::email("Nieprawidłowy e-mail"),
        }
    }

    /// Credentials rejected by the session service.
    pub(crate) fn invalid_credentials() -> Self {
        Self::password("Nieprawidłowe dane logowania")
    }

    /// Any other sign-in failure.
    pub(crate) fn sign_in_failed() -> Self {
        Self::password("Wystąpił błąd podczas logowania")
    }
}

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// The user can fix it (wrong address, unverified account, bad password).
    Warning,
    /// Transport or server failure.
    Error,
}

/// Follow-up action offered by a notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoticeAction {
    /// Link to the password reset page.
    ResetPassword { label: String, href: String },
}

/// Transient message shown above the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub description: String,
    pub action: Option<NoticeAction>,
}

impl Notice {
    fn new(kind: NoticeKind, title: &str, description: &str) -> Self {
        Self {
            kind,
            title: title.to_string(),
            description: description.to_string(),
            action: None,
        }
    }

    pub fn account_not_found() -> Self {
        Self::new(
            NoticeKind::Warning,
            "Nie znaleziono konta o podanym adresie e-mail",
            "Sprawdź, czy adres został wpisany poprawnie",
        )
    }

    pub fn account_not_verified() -> Self {
        Self::new(
            NoticeKind::Warning,
            "Konto nie zostało jeszcze aktywowane",
            "Aktywuj konto klikając w link weryfikacyjny wysłany na Twój adres e-mail",
        )
    }

    /// Single message for both not-found and unverified accounts.
    pub fn account_unavailable() -> Self {
        Self::new(
            NoticeKind::Warning,
            "Nie można zalogować się tym adresem e-mail",
            "Sprawdź skrzynkę pocztową lub załóż nowe konto",
        )
    }

    /// Retry-later message for transport and server failures.
    pub fn generic() -> Self {
        Self::new(NoticeKind::Error, "Wystąpił błąd", "Spróbuj ponownie później")
    }

    /// Password problem with a link to the reset page.
    pub fn reset_password() -> Self {
        Self {
            action: Some(NoticeAction::ResetPassword {
                label: "Zmień hasło ↗".to_string(),
                href: FORGOT_PASSWORD_PATH.to_string(),
            }),
            ..Self::new(
                NoticeKind::Warning,
                "Problemy z logowaniem?",
                "Kliknij, aby zresetować hasło",
            )
        }
    }
}
