// In-memory implementation of DocumentStore.
//
// Used by tests and by local tooling. Behaves like the hosted document store
// where it matters to the core: newest-first cursor pagination, store-assigned
// comment ids, and counter increments that are atomic per post.

use crate::core::comments::{Comment, NewComment};
use crate::core::posts::{PageCursor, Post, PostCounter};
use crate::core::store::{DocumentStore, PostPage, PostQuery, StoreError};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::{DashMap, DashSet};
use std::cmp::Ordering;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

/// A comment plus its insertion order, which breaks ties between comments
/// created within the same clock tick.
#[derive(Clone, Debug)]
struct StoredComment {
    seq: u64,
    comment: Comment,
}

/// A (post_id, user_id) like marker.
#[derive(Hash, Eq, PartialEq, Clone, Debug)]
struct LikeKey {
    post_id: String,
    user_id: String,
}

impl LikeKey {
    fn new(post_id: &str, user_id: &str) -> Self {
        Self {
            post_id: post_id.to_string(),
            user_id: user_id.to_string(),
        }
    }
}

/// DashMap-backed document store.
///
/// Every counter update runs under the shard lock of its post entry, so
/// concurrent increments never lose updates.
pub struct InMemoryDocumentStore {
    posts: DashMap<String, Post>,
    /// comment_id -> comment
    comments: DashMap<String, StoredComment>,
    likes: DashSet<LikeKey>,
    next_seq: AtomicU64,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            posts: DashMap::new(),
            comments: DashMap::new(),
            likes: DashSet::new(),
            next_seq: AtomicU64::new(0),
        }
    }

    /// Insert or replace a post. Stands in for the admin's editor.
    pub fn insert_post(&self, post: Post) {
        self.posts.insert(post.id.clone(), post);
    }

    pub fn remove_post(&self, post_id: &str) -> Option<Post> {
        let removed = self.posts.remove(post_id).map(|(_, post)| post);
        if removed.is_some() {
            self.comments
                .retain(|_, stored| stored.comment.post_id != post_id);
            self.likes.retain(|key| key.post_id != post_id);
        }
        removed
    }

    /// Every post, newest first.
    pub fn snapshot_posts(&self) -> Vec<Post> {
        let mut posts: Vec<Post> = self.posts.iter().map(|entry| entry.value().clone()).collect();
        posts.sort_by(newest_first);
        posts
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

fn newest_first(a: &Post, b: &Post) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| b.id.cmp(&a.id))
}

/// True if `post` comes strictly after `cursor` in newest-first order.
fn is_after(post: &Post, cursor: &PageCursor) -> bool {
    (&post.created_at, &post.id) < (&cursor.created_at, &cursor.id)
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn query_posts(&self, query: &PostQuery) -> Result<PostPage, StoreError> {
        let posts: Vec<Post> = self
            .snapshot_posts()
            .into_iter()
            .filter(|post| !query.published_only || post.published)
            .filter(|post| query.after.as_ref().map_or(true, |c| is_after(post, c)))
            .take(query.limit)
            .collect();

        let next_cursor = posts.last().map(Post::cursor);
        Ok(PostPage { posts, next_cursor })
    }

    async fn get_post(&self, post_id: &str) -> Result<Option<Post>, StoreError> {
        Ok(self.posts.get(post_id).map(|entry| entry.value().clone()))
    }

    async fn list_posts(&self) -> Result<Vec<Post>, StoreError> {
        Ok(self.snapshot_posts())
    }

    async fn increment_post_counter(
        &self,
        post_id: &str,
        counter: PostCounter,
        delta: i64,
    ) -> Result<u64, StoreError> {
        let mut post = self.posts.get_mut(post_id).ok_or(StoreError::NotFound)?;

        let field = match counter {
            PostCounter::Likes => &mut post.likes,
            PostCounter::Views => &mut post.views,
            PostCounter::CommentCount => &mut post.comment_count,
        };
        *field = if delta >= 0 {
            field.saturating_add(delta as u64)
        } else {
            field.saturating_sub(delta.unsigned_abs())
        };

        Ok(*field)
    }

    async fn insert_comment(&self, new: NewComment) -> Result<Comment, StoreError> {
        if !self.posts.contains_key(&new.post_id) {
            return Err(StoreError::NotFound);
        }

        let comment = Comment {
            id: uuid::Uuid::new_v4().to_string(),
            post_id: new.post_id,
            author_name: new.author_name,
            user_id: new.user_id,
            content: new.content,
            is_admin: new.is_admin,
            moderation: new.moderation,
            admin_reviewed: false,
            reported: false,
            reply: None,
            replied_at: None,
            created_at: Utc::now(),
            updated_at: None,
        };
        let seq = self.next_seq.fetch_add(1, AtomicOrdering::SeqCst);

        self.comments.insert(
            comment.id.clone(),
            StoredComment {
                seq,
                comment: comment.clone(),
            },
        );
        Ok(comment)
    }

    async fn get_comment(
        &self,
        post_id: &str,
        comment_id: &str,
    ) -> Result<Option<Comment>, StoreError> {
        Ok(self
            .comments
            .get(comment_id)
            .filter(|entry| entry.comment.post_id == post_id)
            .map(|entry| entry.comment.clone()))
    }

    async fn update_comment(&self, comment: &Comment) -> Result<(), StoreError> {
        let mut stored = self
            .comments
            .get_mut(&comment.id)
            .filter(|entry| entry.comment.post_id == comment.post_id)
            .ok_or(StoreError::NotFound)?;
        stored.comment = comment.clone();
        Ok(())
    }

    async fn delete_comment(&self, post_id: &str, comment_id: &str) -> Result<bool, StoreError> {
        Ok(self
            .comments
            .remove_if(comment_id, |_, stored| stored.comment.post_id == post_id)
            .is_some())
    }

    async fn list_comments(&self, post_id: &str) -> Result<Vec<Comment>, StoreError> {
        let mut stored: Vec<StoredComment> = self
            .comments
            .iter()
            .filter(|entry| entry.comment.post_id == post_id)
            .map(|entry| entry.value().clone())
            .collect();

        stored.sort_by(|a, b| {
            b.comment
                .created_at
                .cmp(&a.comment.created_at)
                .then_with(|| b.seq.cmp(&a.seq))
        });
        Ok(stored.into_iter().map(|s| s.comment).collect())
    }

    async fn set_like(
        &self,
        post_id: &str,
        user_id: &str,
        liked: bool,
    ) -> Result<bool, StoreError> {
        let key = LikeKey::new(post_id, user_id);
        Ok(if liked {
            self.likes.insert(key)
        } else {
            self.likes.remove(&key).is_some()
        })
    }

    async fn has_like(&self, post_id: &str, user_id: &str) -> Result<bool, StoreError> {
        Ok(self.likes.contains(&LikeKey::new(post_id, user_id)))
    }
}
