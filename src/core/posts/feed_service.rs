// Public post feed - cursor pagination over published posts.
//
// The feed keeps every page fetched so far in a `FeedState` owned by the
// viewer's session. Filtering runs locally over that state, the same way the
// blog grid filters whatever has been loaded.

use super::post_filter::{collect_facets, Facets, PostMatcher};
use super::post_models::{PageCursor, Post, PostFilter};
use super::request_sequencer::{RequestSequencer, RequestTicket};
use crate::core::store::{DocumentStore, PostPage, PostQuery, StoreError};
use chrono_tz::Tz;
use std::collections::HashSet;
use std::sync::Arc;

pub const DEFAULT_INITIAL_PAGE_SIZE: usize = 12;
pub const DEFAULT_LOAD_MORE_SIZE: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    /// Replace everything with the first page.
    Initial,
    /// Append the page after the current cursor.
    More,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSizes {
    pub initial: usize,
    pub more: usize,
}

impl Default for PageSizes {
    fn default() -> Self {
        Self {
            initial: DEFAULT_INITIAL_PAGE_SIZE,
            more: DEFAULT_LOAD_MORE_SIZE,
        }
    }
}

impl PageSizes {
    pub fn for_mode(&self, mode: LoadMode) -> usize {
        match mode {
            LoadMode::Initial => self.initial,
            LoadMode::More => self.more,
        }
    }
}

/// Posts loaded so far for one viewer.
#[derive(Debug, Clone)]
pub struct FeedState {
    posts: Vec<Post>,
    cursor: Option<PageCursor>,
    has_more: bool,
    pages_loaded: usize,
}

impl Default for FeedState {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedState {
    pub fn new() -> Self {
        Self {
            posts: Vec::new(),
            cursor: None,
            has_more: true,
            pages_loaded: 0,
        }
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn cursor(&self) -> Option<&PageCursor> {
        self.cursor.as_ref()
    }

    /// False once a page came back shorter than requested.
    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn pages_loaded(&self) -> usize {
        self.pages_loaded
    }

    /// Build the store query for the next load.
    pub fn next_query(&self, mode: LoadMode, sizes: &PageSizes) -> PostQuery {
        PostQuery {
            published_only: true,
            after: match mode {
                LoadMode::Initial => None,
                LoadMode::More => self.cursor.clone(),
            },
            limit: sizes.for_mode(mode),
        }
    }

    /// Merge a fetched page. Returns how many new posts were added.
    pub fn apply_page(&mut self, mode: LoadMode, page: PostPage, requested: usize) -> usize {
        if mode == LoadMode::Initial {
            self.posts.clear();
            self.cursor = None;
            self.pages_loaded = 0;
        }

        let fetched = page.posts.len();
        let mut seen: HashSet<String> = self.posts.iter().map(|p| p.id.clone()).collect();
        let mut added = 0;

        for post in page.posts {
            // Skip posts we already hold
            if seen.insert(post.id.clone()) {
                self.posts.push(post);
                added += 1;
            }
        }

        if let Some(cursor) = page.next_cursor {
            self.cursor = Some(cursor);
        }
        self.has_more = fetched >= requested && requested > 0;
        self.pages_loaded += 1;

        added
    }
}

/// A page fetched from the store, tagged with the ticket of its request.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub ticket: RequestTicket,
    pub mode: LoadMode,
    pub requested: usize,
    pub page: PostPage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedUpdate {
    Applied { added: usize },
    /// A newer request was issued while this one was in flight.
    Stale,
}

pub struct FeedService<S: DocumentStore> {
    store: Arc<S>,
    sizes: PageSizes,
    year_tz: Tz,
}

impl<S: DocumentStore> FeedService<S> {
    pub fn new(store: Arc<S>, sizes: PageSizes, year_tz: Tz) -> Self {
        Self {
            store,
            sizes,
            year_tz,
        }
    }

    pub fn year_timezone(&self) -> Tz {
        self.year_tz
    }

    /// Issue a ticket and run the query. Does not touch the feed state.
    pub async fn fetch(
        &self,
        feed: &FeedState,
        sequencer: &RequestSequencer,
        mode: LoadMode,
    ) -> Result<FetchedPage, StoreError> {
        let ticket = sequencer.issue();
        let query = feed.next_query(mode, &self.sizes);
        let page = self.store.query_posts(&query).await?;

        tracing::debug!(
            ticket = ticket.value(),
            returned = page.posts.len(),
            limit = query.limit,
            "Fetched feed page"
        );

        Ok(FetchedPage {
            ticket,
            mode,
            requested: query.limit,
            page,
        })
    }

    /// Apply a fetched page unless a newer request superseded it.
    pub fn apply(
        &self,
        feed: &mut FeedState,
        sequencer: &RequestSequencer,
        fetched: FetchedPage,
    ) -> FeedUpdate {
        if !sequencer.is_current(fetched.ticket) {
            tracing::debug!(ticket = fetched.ticket.value(), "Discarding stale feed page");
            return FeedUpdate::Stale;
        }

        let added = feed.apply_page(fetched.mode, fetched.page, fetched.requested);
        FeedUpdate::Applied { added }
    }

    /// Fetch and apply in one step.
    pub async fn load(
        &self,
        feed: &mut FeedState,
        sequencer: &RequestSequencer,
        mode: LoadMode,
    ) -> Result<FeedUpdate, StoreError> {
        if mode == LoadMode::More && !feed.has_more() {
            return Ok(FeedUpdate::Applied { added: 0 });
        }

        let fetched = self.fetch(feed, sequencer, mode).await?;
        Ok(self.apply(feed, sequencer, fetched))
    }

    /// Loaded posts that pass the viewer's filter, in feed order.
    pub fn visible_posts<'a>(&self, feed: &'a FeedState, filter: &PostFilter) -> Vec<&'a Post> {
        PostMatcher::new(filter, self.year_tz).filter(feed.posts())
    }

    pub fn facets(&self, feed: &FeedState) -> Facets {
        collect_facets(feed.posts(), self.year_tz)
    }
}
