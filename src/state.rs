//! Shell state: the search slot, catalog sections and the detail view
//!
//! Nothing here touches egui or the network. The shell asks a slot for a
//! [`CancelToken`] when it starts a fetch and hands the token back together
//! with the outcome; a slot only accepts outcomes for its current request.

use crate::cancel::{CancelToken, RequestSlot};
use crate::models::{MovieDetail, Section};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded(Vec<MovieDetail>),
    Failed(String),
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }
}

/// Request to hand to a background worker
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub query: String,
    pub token: CancelToken,
}

#[derive(Debug, Default)]
pub struct SearchSlot {
    text: String,
    state: LoadState,
    request: RequestSlot,
}

impl SearchSlot {
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Mutable text for the search box; call [`SearchSlot::text_changed`] after an edit
    pub fn text_mut(&mut self) -> &mut String {
        &mut self.text
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// An active search has non-blank text
    pub fn is_active(&self) -> bool {
        !self.text.trim().is_empty()
    }

    pub fn set_text(&mut self, text: &str) -> Option<SearchRequest> {
        self.text = text.to_string();
        self.text_changed()
    }

    /// Supersede any in-flight search. Returns the new request to dispatch,
    /// or None when the box is now blank and the slot went back to Idle.
    pub fn text_changed(&mut self) -> Option<SearchRequest> {
        if !self.is_active() {
            self.request.cancel();
            self.state = LoadState::Idle;
            return None;
        }

        let token = self.request.begin();
        self.state = LoadState::Loading;
        Some(SearchRequest { query: self.text.trim().to_string(), token })
    }

    /// Apply a finished search. Stale outcomes are dropped; returns whether it was applied.
    pub fn apply(&mut self, token: &CancelToken, outcome: Result<Vec<MovieDetail>, String>) -> bool {
        if !self.request.accepts(token) {
            return false;
        }
        self.request.finish(token);
        self.state = match outcome {
            Ok(movies) => LoadState::Loaded(movies),
            Err(message) => LoadState::Failed(message),
        };
        true
    }
}

/// One of the startup sections (top rated, popular, now playing)
#[derive(Debug)]
pub struct CatalogSlot {
    section: Section,
    state: LoadState,
    request: RequestSlot,
}

impl CatalogSlot {
    pub fn new(section: Section) -> Self {
        Self { section, state: LoadState::Idle, request: RequestSlot::new() }
    }

    pub fn section(&self) -> Section {
        self.section
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn begin(&mut self) -> CancelToken {
        self.state = LoadState::Loading;
        self.request.begin()
    }

    pub fn apply(&mut self, token: &CancelToken, outcome: Result<Vec<MovieDetail>, String>) -> bool {
        if !self.request.accepts(token) {
            return false;
        }
        self.request.finish(token);
        self.state = match outcome {
            Ok(movies) => LoadState::Loaded(movies),
            Err(message) => LoadState::Failed(format!("Failed to fetch {}: {}", self.section.noun(), message)),
        };
        true
    }

    /// Abandon the in-flight fetch, e.g. when the window closes
    pub fn cancel(&mut self) {
        self.request.cancel();
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum DetailView {
    #[default]
    Closed,
    Open(MovieDetail),
}

/// Explicit state owned by the application shell
#[derive(Debug)]
pub struct ShellState {
    pub search: SearchSlot,
    catalog: Vec<CatalogSlot>,
    detail: DetailView,
    status_message: String,
}

impl Default for ShellState {
    fn default() -> Self {
        Self::new()
    }
}

impl ShellState {
    pub fn new() -> Self {
        Self {
            search: SearchSlot::default(),
            catalog: Section::ALL.iter().map(|s| CatalogSlot::new(*s)).collect(),
            detail: DetailView::Closed,
            status_message: "Ready".to_string(),
        }
    }

    pub fn catalog(&self, section: Section) -> &CatalogSlot {
        let idx = Self::catalog_index(section);
        &self.catalog[idx]
    }

    pub fn catalog_mut(&mut self, section: Section) -> &mut CatalogSlot {
        let idx = Self::catalog_index(section);
        &mut self.catalog[idx]
    }

    fn catalog_index(section: Section) -> usize {
        match section {
            Section::TopRated => 0,
            Section::Popular => 1,
            Section::NowPlaying => 2,
        }
    }

    pub fn detail(&self) -> &DetailView {
        &self.detail
    }

    /// Opening another movie replaces the one shown. A movie opened without
    /// an overview (a saved favourite) borrows it from any loaded result.
    pub fn open_detail(&mut self, mut movie: MovieDetail) {
        if movie.overview.is_empty() {
            if let Some(loaded) = self.find_loaded(movie.id()) {
                movie.overview = loaded.overview.clone();
            }
        }
        self.detail = DetailView::Open(movie);
    }

    /// Look up a movie among the search results and catalog sections
    pub fn find_loaded(&self, id: i64) -> Option<&MovieDetail> {
        std::iter::once(&self.search.state)
            .chain(self.catalog.iter().map(|slot| &slot.state))
            .filter_map(|state| match state {
                LoadState::Loaded(movies) => Some(movies),
                _ => None,
            })
            .flatten()
            .find(|movie| movie.id() == id)
    }

    pub fn close_detail(&mut self) {
        self.detail = DetailView::Closed;
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
    }

    /// Cancel everything still in flight
    pub fn cancel_all(&mut self) {
        self.search.request.cancel();
        for slot in &mut self.catalog {
            slot.cancel();
        }
    }
}

/// Notice for an add-to-favourites click
pub fn add_favourite_notice(newly_added: bool) -> &'static str {
    if newly_added {
        "Favourite movies updated."
    } else {
        "Movie is already in your favourites."
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod state_tests;
