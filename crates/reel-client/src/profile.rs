//! # Profile View
//!
//! Shows the signed-in user's account record. Editing only touches a local
//! draft; cancelling throws the draft away and reloads the record from the
//! server rather than restoring a local copy.

use std::sync::Arc;

use reel_core::{validate_display_name, AccountRecord, ValidationError};

use crate::collaborators::{AccountFetch, ProfileUpdate};
use crate::error::ClientError;
use crate::session::SessionContext;

/// Errors from profile operations.
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The account behind the session no longer exists.
    #[error("account no longer exists")]
    AccountGone,
    /// `save` was called outside edit mode.
    #[error("not editing")]
    NotEditing,
}

pub struct ProfileView {
    session: SessionContext,
    fetch: Arc<dyn AccountFetch>,
    update: Arc<dyn ProfileUpdate>,
    record: AccountRecord,
    draft_name: Option<String>,
}

impl ProfileView {
    /// Starts from the record carried by the session.
    pub fn new(
        session: SessionContext,
        fetch: Arc<dyn AccountFetch>,
        update: Arc<dyn ProfileUpdate>,
    ) -> Self {
        let record = session.user.clone();
        Self {
            session,
            fetch,
            update,
            record,
            draft_name: None,
        }
    }

    pub fn record(&self) -> &AccountRecord {
        &self.record
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn is_editing(&self) -> bool {
        self.draft_name.is_some()
    }

    /// Name as currently rendered: the draft while editing, else the record.
    pub fn display_name(&self) -> &str {
        self.draft_name.as_deref().unwrap_or(&self.record.name)
    }

    /// Reload the authoritative record.
    pub async fn refresh(&mut self) -> Result<(), ProfileError> {
        let record = self
            .fetch
            .fetch_account(self.session.user_id())
            .await?
            .ok_or(ProfileError::AccountGone)?;
        self.record = record;
        Ok(())
    }

    pub fn begin_edit(&mut self) {
        if self.draft_name.is_none() {
            self.draft_name = Some(self.record.name.clone());
        }
    }

    /// Change the draft name. Ignored outside edit mode.
    pub fn set_name(&mut self, name: impl Into<String>) {
        if let Some(draft) = self.draft_name.as_mut() {
            *draft = name.into();
        }
    }

    /// Leave edit mode and reload the record.
    pub async fn cancel(&mut self) -> Result<(), ProfileError> {
        self.draft_name = None;
        self.refresh().await
    }

    /// Persist the draft name. Stays in edit mode on failure.
    pub async fn save(&mut self) -> Result<(), ProfileError> {
        let draft = self.draft_name.as_deref().ok_or(ProfileError::NotEditing)?;
        let name = validate_display_name(draft)?;
        let record = self.update.update_name(&name).await?;
        tracing::debug!(user = %record.id, "profile name updated");
        self.record = record;
        self.draft_name = None;
        Ok(())
    }
}
