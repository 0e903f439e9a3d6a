// Document store port.
//
// The hosted document database is an external collaborator. Core services only
// talk to it through this trait, so the same logic runs against the in-memory
// store in tests and against a real backend in production.

use crate::core::comments::{Comment, NewComment};
use crate::core::posts::{PageCursor, Post, PostCounter};
use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Document not found")]
    NotFound,
    #[error("Storage error: {0}")]
    Storage(String),
}

/// A cursor-paginated query over the posts collection.
///
/// Results are always ordered newest first (`created_at` desc, then `id` desc).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostQuery {
    /// Only return posts with `published == true`.
    pub published_only: bool,
    /// Start strictly after this post (the last item of the previous page).
    pub after: Option<PageCursor>,
    pub limit: usize,
}

/// One page of query results.
#[derive(Debug, Clone, Default)]
pub struct PostPage {
    pub posts: Vec<Post>,
    /// Cursor pointing at the last post of this page, if any.
    pub next_cursor: Option<PageCursor>,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Run a paginated posts query.
    async fn query_posts(&self, query: &PostQuery) -> Result<PostPage, StoreError>;

    async fn get_post(&self, post_id: &str) -> Result<Option<Post>, StoreError>;

    /// Every post including drafts, newest first. Admin use only.
    async fn list_posts(&self) -> Result<Vec<Post>, StoreError>;

    /// Atomically add `delta` to a post counter and return the new value.
    ///
    /// Counters never go below zero.
    async fn increment_post_counter(
        &self,
        post_id: &str,
        counter: PostCounter,
        delta: i64,
    ) -> Result<u64, StoreError>;

    /// Persist a new comment. The store assigns the id and creation time.
    async fn insert_comment(&self, comment: NewComment) -> Result<Comment, StoreError>;

    async fn get_comment(
        &self,
        post_id: &str,
        comment_id: &str,
    ) -> Result<Option<Comment>, StoreError>;

    /// Overwrite an existing comment. Fails with `NotFound` if it was deleted.
    async fn update_comment(&self, comment: &Comment) -> Result<(), StoreError>;

    /// Returns `true` if a comment was removed.
    async fn delete_comment(&self, post_id: &str, comment_id: &str) -> Result<bool, StoreError>;

    /// All comments on a post, newest first.
    async fn list_comments(&self, post_id: &str) -> Result<Vec<Comment>, StoreError>;

    /// Set or clear a user's like marker. Returns `true` if the marker changed.
    async fn set_like(&self, post_id: &str, user_id: &str, liked: bool)
        -> Result<bool, StoreError>;

    async fn has_like(&self, post_id: &str, user_id: &str) -> Result<bool, StoreError>;
}

/// Field deserializer for documents written by other clients, which store
/// explicit `null` where a field was left blank.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + serde::Deserialize<'de>,
{
    let value: Option<T> = serde::Deserialize::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}
