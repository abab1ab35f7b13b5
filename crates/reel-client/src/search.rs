//! # Debounced Movie Search
//!
//! [`SearchBox`] turns keystrokes into at most one search request per settled
//! query. Each keystroke restarts the debounce timer. When the timer fires
//! the trimmed input becomes the debounced query, and a non-empty query is
//! dispatched under a fresh generation number. A completion whose generation
//! is no longer current is dropped, and superseded request tasks are aborted.
//!
//! Views are published on a [`tokio::sync::watch`] channel. After
//! [`SearchBox::dispose`] (or drop) nothing is published again.
//!
//! All methods that may start a timer must be called from within a Tokio
//! runtime.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use reel_core::{MovieSummary, PosterSize};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::collaborators::MovieSearch;
use crate::error::ClientError;

/// Delay between the last keystroke and the request.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Placeholder for a suggestion without a poster.
pub const NO_IMAGE: &str = "No image";

/// Placeholder for a suggestion without a release date.
pub const UNKNOWN_YEAR: &str = "Unknown year";

/// Request lifecycle of the current query.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SearchStatus {
    #[default]
    Idle,
    Loading,
    HasResults,
    NoResults,
    /// The request failed. Carries the error message.
    Error(String),
}

/// One row of the suggestion panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub id: u64,
    pub title: String,
    /// Small poster rendition, when the movie has one.
    pub poster_url: Option<String>,
    pub release_year: Option<String>,
}

impl Suggestion {
    pub fn from_summary(movie: &MovieSummary) -> Self {
        Self {
            id: movie.id,
            title: movie.title.clone(),
            poster_url: movie.poster_url(PosterSize::W92),
            release_year: movie.release_year().map(str::to_string),
        }
    }

    pub fn year_label(&self) -> &str {
        self.release_year.as_deref().unwrap_or(UNKNOWN_YEAR)
    }

    /// Poster URL or the placeholder text.
    pub fn poster_label(&self) -> &str {
        self.poster_url.as_deref().unwrap_or(NO_IMAGE)
    }

    /// Route of the movie's detail page.
    pub fn href(&self) -> String {
        format!("/movies/{}", self.id)
    }
}

/// Renderable state of the search box.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchView {
    pub raw_input: String,
    pub debounced_input: String,
    pub results: Vec<MovieSummary>,
    pub status: SearchStatus,
    pub panel_visible: bool,
}

impl SearchView {
    pub fn suggestions(&self) -> Vec<Suggestion> {
        self.results.iter().map(Suggestion::from_summary).collect()
    }

    /// Text shown in the panel when the query matched nothing.
    pub fn empty_message(&self) -> Option<String> {
        (self.status == SearchStatus::NoResults)
            .then(|| format!("Brak wyników dla zapytania {}", self.debounced_input))
    }
}

struct Shared {
    view: SearchView,
    /// Bumped on every keystroke; identifies the live debounce timer.
    input_seq: u64,
    /// Bumped on every dispatch, clear, selection and dispose.
    generation: u64,
    debounce_task: Option<JoinHandle<()>>,
    request_task: Option<JoinHandle<()>>,
    disposed: bool,
}

struct Inner {
    search: Arc<dyn MovieSearch>,
    debounce: Duration,
    state: Mutex<Shared>,
    views: watch::Sender<SearchView>,
}

impl Inner {
    fn publish(&self, shared: &Shared) {
        self.views.send_replace(shared.view.clone());
    }

    fn commit(self: &Arc<Self>, seq: u64) {
        let mut shared = self.state.lock();
        if shared.disposed || shared.input_seq != seq {
            return;
        }
        shared.debounce_task = None;

        let query = shared.view.raw_input.trim().to_string();
        let unchanged = query == shared.view.debounced_input
            && !matches!(shared.view.status, SearchStatus::Error(_));
        if unchanged {
            return;
        }

        shared.view.debounced_input = query.clone();
        shared.generation += 1;
        if let Some(task) = shared.request_task.take() {
            task.abort();
        }

        if query.is_empty() {
            shared.view.results.clear();
            shared.view.status = SearchStatus::Idle;
            shared.view.panel_visible = false;
        } else {
            shared.view.status = SearchStatus::Loading;
            shared.view.panel_visible = true;
            let generation = shared.generation;
            let inner = Arc::clone(self);
            tracing::debug!(%query, generation, "dispatching movie search");
            shared.request_task = Some(tokio::spawn(async move {
                let outcome = inner.search.search(&query).await;
                inner.complete(generation, outcome);
            }));
        }
        self.publish(&shared);
    }

    fn complete(&self, generation: u64, outcome: Result<Vec<MovieSummary>, ClientError>) {
        let mut shared = self.state.lock();
        if shared.disposed || shared.generation != generation {
            tracing::debug!(generation, "dropping stale search response");
            return;
        }
        shared.request_task = None;
        match outcome {
            Ok(results) => {
                shared.view.status = if results.is_empty() {
                    SearchStatus::NoResults
                } else {
                    SearchStatus::HasResults
                };
                shared.view.results = results;
            }
            Err(err) => {
                tracing::warn!(error = %err, "movie search failed");
                shared.view.results.clear();
                shared.view.status = SearchStatus::Error(err.to_string());
            }
        }
        self.publish(&shared);
    }
}

/// Search input with debounced, generation-checked requests.
///
/// Dropping the box disposes it.
pub struct SearchBox {
    inner: Arc<Inner>,
}

impl SearchBox {
    pub fn new(search: Arc<dyn MovieSearch>) -> Self {
        Self::with_debounce(search, DEFAULT_DEBOUNCE)
    }

    pub fn with_debounce(search: Arc<dyn MovieSearch>, debounce: Duration) -> Self {
        let (views, _) = watch::channel(SearchView::default());
        Self {
            inner: Arc::new(Inner {
                search,
                debounce,
                state: Mutex::new(Shared {
                    view: SearchView::default(),
                    input_seq: 0,
                    generation: 0,
                    debounce_task: None,
                    request_task: None,
                    disposed: false,
                }),
                views,
            }),
        }
    }

    /// Record a keystroke and restart the debounce timer.
    pub fn input(&self, text: impl Into<String>) {
        let mut shared = self.inner.state.lock();
        if shared.disposed {
            return;
        }
        shared.view.raw_input = text.into();
        shared.input_seq += 1;
        if let Some(task) = shared.debounce_task.take() {
            task.abort();
        }
        let seq = shared.input_seq;
        let inner = Arc::clone(&self.inner);
        shared.debounce_task = Some(tokio::spawn(async move {
            tokio::time::sleep(inner.debounce).await;
            inner.commit(seq);
        }));
        self.inner.publish(&shared);
    }

    /// Show the panel again if there is a pending or completed query.
    pub fn focus(&self) {
        let mut shared = self.inner.state.lock();
        if shared.disposed {
            return;
        }
        let has_query =
            !shared.view.debounced_input.is_empty() || !shared.view.raw_input.trim().is_empty();
        if has_query && !shared.view.panel_visible {
            shared.view.panel_visible = true;
            self.inner.publish(&shared);
        }
    }

    /// Hide the panel. The query and results are kept.
    pub fn pointer_outside(&self) {
        let mut shared = self.inner.state.lock();
        if shared.disposed || !shared.view.panel_visible {
            return;
        }
        shared.view.panel_visible = false;
        self.inner.publish(&shared);
    }

    /// Choose a suggestion. Hides the panel, clears the list and the settled
    /// query, and returns the chosen movie if it was among the results.
    pub fn select(&self, movie_id: u64) -> Option<MovieSummary> {
        let mut shared = self.inner.state.lock();
        if shared.disposed {
            return None;
        }
        let chosen = shared
            .view
            .results
            .iter()
            .find(|m| m.id == movie_id)
            .cloned();
        shared.generation += 1;
        if let Some(task) = shared.request_task.take() {
            task.abort();
        }
        shared.view.results.clear();
        shared.view.debounced_input.clear();
        shared.view.status = SearchStatus::Idle;
        shared.view.panel_visible = false;
        self.inner.publish(&shared);
        chosen
    }

    pub fn snapshot(&self) -> SearchView {
        self.inner.state.lock().view.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchView> {
        self.inner.views.subscribe()
    }

    /// Cancel the timer and any in-flight request. Idempotent.
    pub fn dispose(&self) {
        let mut shared = self.inner.state.lock();
        if shared.disposed {
            return;
        }
        shared.disposed = true;
        shared.generation += 1;
        if let Some(task) = shared.debounce_task.take() {
            task.abort();
        }
        if let Some(task) = shared.request_task.take() {
            task.abort();
        }
    }
}

impl Drop for SearchBox {
    fn drop(&mut self) {
        self.dispose();
    }
}
