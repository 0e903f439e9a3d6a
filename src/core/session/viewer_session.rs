// Per-viewer session state.
//
// Identity, filter selection, loaded feed and revealed comments live here and
// are passed to services explicitly. Two sessions never share state, so any
// number of them can filter and page concurrently.

use crate::core::posts::{FeedState, PostFilter, RequestSequencer};
use std::collections::HashSet;

/// Who is asking. Supplied by the auth collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewer {
    pub user_id: String,
    pub is_admin: bool,
    pub display_name: Option<String>,
}

impl Viewer {
    pub fn visitor(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            is_admin: false,
            display_name: None,
        }
    }

    pub fn admin(user_id: &str, display_name: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            is_admin: true,
            display_name: Some(display_name.to_string()),
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }
}

#[derive(Debug)]
pub struct ViewerSession {
    viewer: Viewer,
    filter: PostFilter,
    feed: FeedState,
    sequencer: RequestSequencer,
    /// Moderated comments this viewer chose to see. Never persisted.
    revealed: HashSet<String>,
}

impl ViewerSession {
    pub fn new(viewer: Viewer) -> Self {
        Self {
            viewer,
            filter: PostFilter::default(),
            feed: FeedState::new(),
            sequencer: RequestSequencer::new(),
            revealed: HashSet::new(),
        }
    }

    pub fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    pub fn filter(&self) -> &PostFilter {
        &self.filter
    }

    pub fn feed(&self) -> &FeedState {
        &self.feed
    }

    /// Split borrow for `FeedService::load`.
    pub fn feed_parts(&mut self) -> (&mut FeedState, &RequestSequencer) {
        (&mut self.feed, &self.sequencer)
    }

    /// `None` or an empty string clears the category.
    pub fn set_category(&mut self, category: Option<&str>) {
        self.filter.category = category.map(str::to_string);
    }

    pub fn set_year(&mut self, year: Option<&str>) {
        self.filter.year = year.map(str::to_string);
    }

    pub fn set_search(&mut self, term: &str) {
        self.filter.search_term = term.to_string();
    }

    pub fn clear_filters(&mut self) {
        self.filter = PostFilter::default();
    }

    pub fn reveal(&mut self, comment_id: &str) {
        self.revealed.insert(comment_id.to_string());
    }

    pub fn hide(&mut self, comment_id: &str) {
        self.revealed.remove(comment_id);
    }

    pub fn is_revealed(&self, comment_id: &str) -> bool {
        self.revealed.contains(comment_id)
    }
}
