//! # Progressive Sign-In
//!
//! Two-stage form: the user first submits an email, which is checked
//! against the account lookup; only a verified account advances to the
//! password stage, greeted by first name.
//!
//! ```text
//! CollectEmail ──submit_email(verified)──▶ CollectPassword ──submit_password──▶ session
//!      ▲                                         │
//!      └────────────── edit_email ───────────────┘
//! ```
//!
//! One submission runs at a time. A submission that arrives while another is
//! pending returns [`Submission::Busy`] without touching any collaborator.
//! The loading flag is owned by an RAII guard, so it is cleared on every exit
//! path, including a panic inside a collaborator and the caller dropping the
//! future.

use std::sync::Arc;

use parking_lot::Mutex;
use reel_core::{greeting_name, EmailAddress, LookupResult, SocialProvider};

use crate::collaborators::{
    CredentialSessionService, EmailLookup, FederatedRedirect, SignInFailure,
};
use crate::error::ClientError;
use crate::notice::{FieldError, Notice};
use crate::session::SessionContext;

/// Which half of the form is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    CollectEmail,
    CollectPassword {
        email: EmailAddress,
        display_first_name: String,
    },
}

/// Controller behaviour switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignInOptions {
    /// Report unknown and unverified accounts with one shared message so the
    /// form does not reveal which addresses are registered.
    pub collapse_account_status: bool,
}

/// Snapshot of the form for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInView {
    pub stage: Stage,
    pub is_loading: bool,
    pub field_error: Option<FieldError>,
    pub notice: Option<Notice>,
}

impl SignInView {
    /// Card heading.
    pub fn title(&self) -> String {
        match &self.stage {
            Stage::CollectEmail => "Zaloguj się".to_string(),
            Stage::CollectPassword {
                display_first_name, ..
            } => format!("Witaj ponownie, {display_first_name} 👋🏻"),
        }
    }

    /// Card subheading.
    pub fn description(&self) -> &'static str {
        match self.stage {
            Stage::CollectEmail => "Wprowadź swój e-mail, aby kontynuować",
            Stage::CollectPassword { .. } => "Wprowadź hasło, aby się zalogować",
        }
    }
}

/// Outcome of a form action.
#[derive(Debug)]
pub enum Submission {
    /// The email was accepted and the password stage is active.
    Advanced,
    /// Credentials accepted. Routing onward is up to the caller.
    SessionEstablished(SessionContext),
    /// Federated flow started; send the browser to the URL.
    Redirect(FederatedRedirect),
    /// Rejected locally or by a collaborator; see the view for the reason.
    Rejected,
    /// Another submission is still pending.
    Busy,
    /// Not applicable in the current stage, or superseded by `edit_email`.
    Ignored,
}

struct FormState {
    stage: Stage,
    loading: bool,
    field_error: Option<FieldError>,
    notice: Option<Notice>,
    /// Bumped by `edit_email` so results of abandoned submissions are dropped.
    epoch: u64,
}

impl FormState {
    fn clear_messages(&mut self) {
        self.field_error = None;
        self.notice = None;
    }
}

/// Holds the loading flag for the lifetime of one submission.
struct LoadingGuard {
    state: Arc<Mutex<FormState>>,
}

impl LoadingGuard {
    fn acquire(state: &Arc<Mutex<FormState>>) -> Option<Self> {
        let mut s = state.lock();
        if s.loading {
            return None;
        }
        s.loading = true;
        Some(Self {
            state: Arc::clone(state),
        })
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.state.lock().loading = false;
    }
}

/// The progressive sign-in form.
///
/// Clones share state, so a clone can be moved into a spawned task while the
/// original keeps rendering.
#[derive(Clone)]
pub struct SignInController {
    lookup: Arc<dyn EmailLookup>,
    sessions: Arc<dyn CredentialSessionService>,
    options: SignInOptions,
    state: Arc<Mutex<FormState>>,
}

impl SignInController {
    pub fn new(
        lookup: Arc<dyn EmailLookup>,
        sessions: Arc<dyn CredentialSessionService>,
        options: SignInOptions,
    ) -> Self {
        Self {
            lookup,
            sessions,
            options,
            state: Arc::new(Mutex::new(FormState {
                stage: Stage::CollectEmail,
                loading: false,
                field_error: None,
                notice: None,
                epoch: 0,
            })),
        }
    }

    pub fn view(&self) -> SignInView {
        let s = self.state.lock();
        SignInView {
            stage: s.stage.clone(),
            is_loading: s.loading,
            field_error: s.field_error.clone(),
            notice: s.notice.clone(),
        }
    }

    /// Check the email and advance to the password stage if it belongs to a
    /// verified account.
    ///
    /// A malformed address is rejected before any collaborator call.
    pub async fn submit_email(&self, raw_email: &str) -> Submission {
        let Some(_guard) = LoadingGuard::acquire(&self.state) else {
            return Submission::Busy;
        };

        let epoch = {
            let mut s = self.state.lock();
            if s.stage != Stage::CollectEmail {
                return Submission::Ignored;
            }
            s.clear_messages();
            s.epoch
        };

        let email = match EmailAddress::parse(raw_email) {
            Ok(email) => email,
            Err(err) => {
                self.state.lock().field_error = Some(FieldError::from_email_validation(&err));
                return Submission::Rejected;
            }
        };

        let outcome = self.lookup.lookup(&email).await;

        let mut s = self.state.lock();
        if s.epoch != epoch {
            return Submission::Ignored;
        }
        match classify_lookup(outcome) {
            LookupOutcome::Verified { display_name } => {
                let display_first_name = greeting_name(display_name.as_deref(), &email);
                s.stage = Stage::CollectPassword {
                    email,
                    display_first_name,
                };
                Submission::Advanced
            }
            LookupOutcome::Missing => {
                let notice = if self.options.collapse_account_status {
                    Notice::account_unavailable()
                } else {
                    Notice::account_not_found()
                };
                s.field_error = Some(FieldError::email(notice.title.clone()));
                s.notice = Some(notice);
                Submission::Rejected
            }
            LookupOutcome::Unverified => {
                let notice = if self.options.collapse_account_status {
                    Notice::account_unavailable()
                } else {
                    Notice::account_not_verified()
                };
                s.field_error = Some(FieldError::email(notice.title.clone()));
                s.notice = Some(notice);
                Submission::Rejected
            }
            LookupOutcome::Failed(reason) => {
                tracing::warn!(%reason, "email lookup failed");
                s.notice = Some(Notice::generic());
                Submission::Rejected
            }
        }
    }

    /// Sign in with the stored email. An empty password is a no-op.
    pub async fn submit_password(&self, password: &str) -> Submission {
        if password.is_empty() {
            return Submission::Ignored;
        }
        let Some(_guard) = LoadingGuard::acquire(&self.state) else {
            return Submission::Busy;
        };

        let (email, epoch) = {
            let mut s = self.state.lock();
            let email = match &s.stage {
                Stage::CollectPassword { email, .. } => email.clone(),
                Stage::CollectEmail => return Submission::Ignored,
            };
            s.clear_messages();
            (email, s.epoch)
        };

        let outcome = self.sessions.sign_in(&email, password).await;

        let mut s = self.state.lock();
        if s.epoch != epoch {
            return Submission::Ignored;
        }
        match outcome {
            Ok(session) => Submission::SessionEstablished(session),
            Err(SignInFailure::InvalidCredentials(_)) => {
                s.field_error = Some(FieldError::invalid_credentials());
                s.notice = Some(Notice::reset_password());
                Submission::Rejected
            }
            Err(SignInFailure::Other(reason)) => {
                tracing::warn!(%reason, "sign-in failed");
                s.field_error = Some(FieldError::sign_in_failed());
                Submission::Rejected
            }
        }
    }

    /// Start a federated sign-in. Failures only raise a notice.
    pub async fn sign_in_with_provider(&self, provider: SocialProvider) -> Submission {
        let Some(_guard) = LoadingGuard::acquire(&self.state) else {
            return Submission::Busy;
        };
        self.state.lock().notice = None;

        match self.sessions.sign_in_federated(provider).await {
            Ok(redirect) => Submission::Redirect(redirect),
            Err(err) => {
                tracing::warn!(%provider, error = %err, "federated sign-in failed");
                self.state.lock().notice = Some(Notice::generic());
                Submission::Rejected
            }
        }
    }

    /// Return to the email stage, discarding the greeting and all messages.
    ///
    /// A call still in flight keeps the form loading. Its result is
    /// discarded, and further submissions answer [`Submission::Busy`] until
    /// it returns.
    pub fn edit_email(&self) {
        let mut s = self.state.lock();
        s.stage = Stage::CollectEmail;
        s.clear_messages();
        s.epoch += 1;
    }

    pub fn dismiss_notice(&self) {
        self.state.lock().notice = None;
    }
}

enum LookupOutcome {
    Verified { display_name: Option<String> },
    Unverified,
    Missing,
    Failed(String),
}

fn classify_lookup(outcome: Result<LookupResult, ClientError>) -> LookupOutcome {
    match outcome {
        Err(err) => LookupOutcome::Failed(err.to_string()),
        Ok(LookupResult {
            error: Some(reason),
            ..
        }) => LookupOutcome::Failed(reason),
        Ok(LookupResult { exists: false, .. }) => LookupOutcome::Missing,
        Ok(LookupResult {
            verified: false, ..
        }) => LookupOutcome::Unverified,
        Ok(LookupResult { display_name, .. }) => LookupOutcome::Verified { display_name },
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use proptest::prelude::*;
    use tokio::sync::Notify;

    use super::*;
    use crate::notice::{Field, NoticeAction};
    use crate::session::fixtures;

    enum LookupScript {
        Found { verified: bool, name: &'static str },
        Missing,
        ServerError,
        Transport,
        Pending(Arc<Notify>),
        Panic,
    }

    struct FakeLookup {
        script: LookupScript,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EmailLookup for FakeLookup {
        async fn lookup(&self, _email: &EmailAddress) -> Result<LookupResult, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.script {
                LookupScript::Found { verified, name } => Ok(LookupResult {
                    exists: true,
                    verified: *verified,
                    display_name: Some(name.to_string()),
                    error: None,
                }),
                LookupScript::Missing => Ok(LookupResult::not_found()),
                LookupScript::ServerError => Ok(LookupResult::failed("store unavailable")),
                LookupScript::Transport => Err(ClientError::Config("connection refused".into())),
                LookupScript::Pending(notify) => {
                    notify.notified().await;
                    Ok(LookupResult {
                        exists: true,
                        verified: true,
                        display_name: Some("Ada Lovelace".into()),
                        error: None,
                    })
                }
                LookupScript::Panic => panic!("lookup exploded"),
            }
        }
    }

    enum SessionScript {
        Accept,
        Invalid,
        Other,
        FederatedDown,
    }

    struct FakeSessions {
        script: SessionScript,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CredentialSessionService for FakeSessions {
        async fn sign_in(
            &self,
            email: &EmailAddress,
            _password: &str,
        ) -> Result<SessionContext, SignInFailure> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.script {
                SessionScript::Accept => Ok(SessionContext::new(
                    "token",
                    fixtures::account("Ada Lovelace", email.as_str()),
                )),
                SessionScript::Invalid => Err(SignInFailure::InvalidCredentials(
                    "Invalid email or password".into(),
                )),
                SessionScript::Other | SessionScript::FederatedDown => {
                    Err(SignInFailure::Other("upstream timeout".into()))
                }
            }
        }

        async fn sign_in_federated(
            &self,
            _provider: SocialProvider,
        ) -> Result<FederatedRedirect, SignInFailure> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.script {
                SessionScript::FederatedDown => Err(SignInFailure::Other("503".into())),
                _ => Ok(FederatedRedirect {
                    url: "https://accounts.google.com/o/oauth2/v2/auth?state=x".into(),
                }),
            }
        }
    }

    fn controller_with(
        lookup: LookupScript,
        sessions: SessionScript,
        options: SignInOptions,
    ) -> (SignInController, Arc<FakeLookup>, Arc<FakeSessions>) {
        let lookup = Arc::new(FakeLookup {
            script: lookup,
            calls: AtomicUsize::new(0),
        });
        let sessions = Arc::new(FakeSessions {
            script: sessions,
            calls: AtomicUsize::new(0),
        });
        let ctrl = SignInController::new(lookup.clone(), sessions.clone(), options);
        (ctrl, lookup, sessions)
    }

    fn controller(
        lookup: LookupScript,
        sessions: SessionScript,
    ) -> (SignInController, Arc<FakeLookup>, Arc<FakeSessions>) {
        controller_with(lookup, sessions, SignInOptions::default())
    }

    async fn at_password_stage(sessions: SessionScript) -> (SignInController, Arc<FakeSessions>) {
        let (ctrl, _, sessions) = controller(
            LookupScript::Found {
                verified: true,
                name: "Ada Lovelace",
            },
            sessions,
        );
        assert!(matches!(
            ctrl.submit_email("ada@example.com").await,
            Submission::Advanced
        ));
        (ctrl, sessions)
    }

    #[tokio::test]
    async fn verified_account_advances_with_first_name() {
        let (ctrl, lookup, _) = controller(
            LookupScript::Found {
                verified: true,
                name: "Ada Lovelace",
            },
            SessionScript::Accept,
        );
        let result = ctrl.submit_email("  Ada@Example.com ").await;
        assert!(matches!(result, Submission::Advanced));
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 1);

        let view = ctrl.view();
        assert_eq!(
            view.stage,
            Stage::CollectPassword {
                email: EmailAddress::parse("ada@example.com").unwrap(),
                display_first_name: "Ada".into(),
            }
        );
        assert_eq!(view.title(), "Witaj ponownie, Ada 👋🏻");
        assert!(!view.is_loading);
        assert!(view.field_error.is_none());
    }

    #[tokio::test]
    async fn blank_display_name_falls_back_to_local_part() {
        let (ctrl, _, _) = controller(
            LookupScript::Found {
                verified: true,
                name: "   ",
            },
            SessionScript::Accept,
        );
        ctrl.submit_email("grace@example.com").await;
        match ctrl.view().stage {
            Stage::CollectPassword {
                display_first_name, ..
            } => assert_eq!(display_first_name, "grace"),
            other => panic!("unexpected stage {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_account_stays_on_email_with_not_found_notice() {
        let (ctrl, _, _) = controller(LookupScript::Missing, SessionScript::Accept);
        assert!(matches!(
            ctrl.submit_email("nobody@example.com").await,
            Submission::Rejected
        ));
        let view = ctrl.view();
        assert_eq!(view.stage, Stage::CollectEmail);
        assert_eq!(view.field_error.unwrap().field, Field::Email);
        assert_eq!(view.notice, Some(Notice::account_not_found()));
    }

    #[tokio::test]
    async fn unverified_account_gets_its_own_notice() {
        let (ctrl, _, _) = controller(
            LookupScript::Found {
                verified: false,
                name: "Ada",
            },
            SessionScript::Accept,
        );
        ctrl.submit_email("ada@example.com").await;
        let view = ctrl.view();
        assert_eq!(view.stage, Stage::CollectEmail);
        assert_eq!(view.field_error.unwrap().field, Field::Email);
        assert_eq!(view.notice, Some(Notice::account_not_verified()));
    }

    #[tokio::test]
    async fn collapsed_mode_merges_not_found_and_unverified() {
        let (missing, _, _) = controller_with(
            LookupScript::Missing,
            SessionScript::Accept,
            SignInOptions {
                collapse_account_status: true,
            },
        );
        let (unverified, _, _) = controller_with(
            LookupScript::Found {
                verified: false,
                name: "Ada",
            },
            SessionScript::Accept,
            SignInOptions {
                collapse_account_status: true,
            },
        );
        missing.submit_email("nobody@example.com").await;
        unverified.submit_email("ada@example.com").await;
        assert_eq!(missing.view().notice, unverified.view().notice);
        assert_eq!(missing.view().notice, Some(Notice::account_unavailable()));
    }

    #[tokio::test]
    async fn lookup_failures_show_generic_notice_without_field_error() {
        for script in [LookupScript::ServerError, LookupScript::Transport] {
            let (ctrl, _, _) = controller(script, SessionScript::Accept);
            assert!(matches!(
                ctrl.submit_email("ada@example.com").await,
                Submission::Rejected
            ));
            let view = ctrl.view();
            assert_eq!(view.stage, Stage::CollectEmail);
            assert!(view.field_error.is_none());
            assert_eq!(view.notice, Some(Notice::generic()));
            assert!(!view.is_loading);
        }
    }

    #[tokio::test]
    async fn malformed_email_is_rejected_without_lookup() {
        let (ctrl, lookup, _) = controller(LookupScript::Missing, SessionScript::Accept);
        assert!(matches!(
            ctrl.submit_email("not-an-email").await,
            Submission::Rejected
        ));
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);
        let err = ctrl.view().field_error.unwrap();
        assert_eq!(err.field, Field::Email);
        assert_eq!(err.message, "Nieprawidłowy e-mail");
    }

    proptest! {
        #[test]
        fn strings_without_at_sign_never_reach_the_lookup(raw in "[a-zA-Z0-9 ._-]{0,40}") {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let (ctrl, lookup, _) = controller(LookupScript::Missing, SessionScript::Accept);
            let result = rt.block_on(ctrl.submit_email(&raw));
            prop_assert!(matches!(result, Submission::Rejected));
            prop_assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);
            prop_assert_eq!(ctrl.view().field_error.map(|e| e.field), Some(Field::Email));
        }
    }

    #[tokio::test]
    async fn correct_password_establishes_session() {
        let (ctrl, sessions) = at_password_stage(SessionScript::Accept).await;
        match ctrl.submit_password("correct horse").await {
            Submission::SessionEstablished(session) => {
                assert_eq!(session.user.email.as_str(), "ada@example.com");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(sessions.calls.load(Ordering::SeqCst), 1);
        assert!(!ctrl.view().is_loading);
    }

    #[tokio::test]
    async fn empty_password_is_a_no_op() {
        let (ctrl, sessions) = at_password_stage(SessionScript::Accept).await;
        assert!(matches!(ctrl.submit_password("").await, Submission::Ignored));
        assert_eq!(sessions.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn invalid_credentials_offer_password_reset() {
        let (ctrl, _) = at_password_stage(SessionScript::Invalid).await;
        assert!(matches!(
            ctrl.submit_password("wrong").await,
            Submission::Rejected
        ));
        let view = ctrl.view();
        let err = view.field_error.unwrap();
        assert_eq!(err.field, Field::Password);
        assert_eq!(err.message, "Nieprawidłowe dane logowania");
        let notice = view.notice.unwrap();
        assert!(matches!(
            notice.action,
            Some(NoticeAction::ResetPassword { .. })
        ));
        assert!(matches!(view.stage, Stage::CollectPassword { .. }));
    }

    #[tokio::test]
    async fn other_sign_in_failure_has_no_reset_action() {
        let (ctrl, _) = at_password_stage(SessionScript::Other).await;
        ctrl.submit_password("whatever").await;
        let view = ctrl.view();
        assert_eq!(
            view.field_error.unwrap().message,
            "Wystąpił błąd podczas logowania"
        );
        assert!(view.notice.is_none());
    }

    #[tokio::test]
    async fn password_before_email_stage_is_ignored() {
        let (ctrl, _, sessions) = controller(LookupScript::Missing, SessionScript::Accept);
        assert!(matches!(
            ctrl.submit_password("secret").await,
            Submission::Ignored
        ));
        assert_eq!(sessions.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn edit_email_resets_everything() {
        let (ctrl, _) = at_password_stage(SessionScript::Invalid).await;
        ctrl.submit_password("wrong").await;
        ctrl.edit_email();
        let view = ctrl.view();
        assert_eq!(view.stage, Stage::CollectEmail);
        assert!(view.field_error.is_none());
        assert!(view.notice.is_none());
        assert_eq!(view.title(), "Zaloguj się");
    }

    #[tokio::test]
    async fn second_submission_while_pending_is_busy() {
        let notify = Arc::new(Notify::new());
        let (ctrl, lookup, _) = controller(
            LookupScript::Pending(notify.clone()),
            SessionScript::Accept,
        );
        let background = ctrl.clone();
        let first = tokio::spawn(async move { background.submit_email("ada@example.com").await });
        while !ctrl.view().is_loading {
            tokio::task::yield_now().await;
        }

        assert!(matches!(
            ctrl.submit_email("ada@example.com").await,
            Submission::Busy
        ));
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 1);

        notify.notify_one();
        assert!(matches!(first.await.unwrap(), Submission::Advanced));
        assert!(!ctrl.view().is_loading);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_future_clears_loading() {
        let notify = Arc::new(Notify::new());
        let (ctrl, _, _) = controller(LookupScript::Pending(notify), SessionScript::Accept);
        let timed_out =
            tokio::time::timeout(Duration::from_millis(50), ctrl.submit_email("ada@example.com"))
                .await;
        assert!(timed_out.is_err());
        assert!(!ctrl.view().is_loading);
    }

    #[tokio::test]
    async fn panicking_lookup_clears_loading() {
        let (ctrl, _, _) = controller(LookupScript::Panic, SessionScript::Accept);
        let background = ctrl.clone();
        let join = tokio::spawn(async move { background.submit_email("ada@example.com").await });
        assert!(join.await.unwrap_err().is_panic());
        assert!(!ctrl.view().is_loading);
    }

    #[tokio::test]
    async fn edit_during_lookup_discards_the_result() {
        let notify = Arc::new(Notify::new());
        let (ctrl, _, _) = controller(
            LookupScript::Pending(notify.clone()),
            SessionScript::Accept,
        );
        let background = ctrl.clone();
        let first = tokio::spawn(async move { background.submit_email("ada@example.com").await });
        while !ctrl.view().is_loading {
            tokio::task::yield_now().await;
        }
        ctrl.edit_email();
        assert!(ctrl.view().is_loading);
        assert!(matches!(
            ctrl.submit_email("grace@example.com").await,
            Submission::Busy
        ));

        notify.notify_one();
        assert!(matches!(first.await.unwrap(), Submission::Ignored));
        assert_eq!(ctrl.view().stage, Stage::CollectEmail);
        assert!(!ctrl.view().is_loading);
    }

    #[tokio::test]
    async fn provider_sign_in_returns_redirect() {
        let (ctrl, _, _) = controller(LookupScript::Missing, SessionScript::Accept);
        match ctrl.sign_in_with_provider(SocialProvider::Google).await {
            Submission::Redirect(redirect) => {
                assert!(redirect.url.starts_with("https://accounts.google.com/"))
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn provider_failure_only_raises_notice() {
        let (ctrl, _) = at_password_stage(SessionScript::FederatedDown).await;
        let before = ctrl.view().stage;
        assert!(matches!(
            ctrl.sign_in_with_provider(SocialProvider::Google).await,
            Submission::Rejected
        ));
        let view = ctrl.view();
        assert_eq!(view.stage, before);
        assert!(view.field_error.is_none());
        assert_eq!(view.notice, Some(Notice::generic()));
    }
}
