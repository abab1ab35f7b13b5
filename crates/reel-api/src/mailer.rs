//! # Outgoing Mail
//!
//! The account service sends verification and password-reset links through
//! the [`Mailer`] trait. [`LogMailer`] writes messages to the log for local
//! development; [`MemoryMailer`] keeps an outbox that tests can read.

use std::sync::Arc;

use parking_lot::Mutex;

/// A plain-text email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub text: String,
}

impl OutgoingEmail {
    /// Build a message. The recipient is trimmed and lower-cased; subject and
    /// body are trimmed.
    pub fn new(to: &str, subject: &str, text: &str) -> Self {
        Self {
            to: to.trim().to_lowercase(),
            subject: subject.trim().to_string(),
            text: text.trim().to_string(),
        }
    }
}

/// Mail delivery failure.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("mail transport rejected message to {to}: {reason}")]
    Rejected { to: String, reason: String },
}

/// Delivers outgoing email.
pub trait Mailer: Send + Sync {
    /// Send one message.
    fn send(&self, email: OutgoingEmail) -> Result<(), MailError>;
}

/// Writes each message to the log instead of sending it.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            body = %email.text,
            "outgoing email (log mailer)"
        );
        Ok(())
    }
}

/// Keeps sent messages in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryMailer {
    outbox: Arc<Mutex<Vec<OutgoingEmail>>>,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every message sent so far, oldest first.
    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.outbox.lock().clone()
    }

    /// The most recent message to the given address.
    pub fn last_to(&self, to: &str) -> Option<OutgoingEmail> {
        let to = to.trim().to_lowercase();
        self.outbox.lock().iter().rev().find(|m| m.to == to).cloned()
    }
}

impl Mailer for MemoryMailer {
    fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        self.outbox.lock().push(email);
        Ok(())
    }
}

/// Pull the value of a query parameter out of the first link in a message body.
pub fn link_param(text: &str, name: &str) -> Option<String> {
    let start = text.find("http")?;
    let link = text[start..].split_whitespace().next()?;
    let url = url::Url::parse(link).ok()?;
    url.query_pairs()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
}
