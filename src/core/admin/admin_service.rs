// Admin console - dashboard numbers, post lists and the comment review queue.
//
// Read-only. Moderation actions themselves live in `CommentService`.

use crate::core::comments::{Comment, ModerationState};
use crate::core::posts::Post;
use crate::core::store::{DocumentStore, StoreError};
use serde::Serialize;
use std::sync::Arc;

// ============================================================================
// MODELS
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_posts: usize,
    pub published_posts: usize,
    pub draft_posts: usize,
    pub total_comments: usize,
    /// Auto-moderated and not yet looked at by the admin
    pub flagged_comments: usize,
    pub reported_comments: usize,
}

/// Tabs of the comment review screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommentQueue {
    #[default]
    All,
    Flagged,
    Moderated,
    Reported,
}

impl CommentQueue {
    pub fn includes(self, comment: &Comment) -> bool {
        match self {
            CommentQueue::All => true,
            CommentQueue::Flagged => {
                matches!(comment.moderation, ModerationState::AutoModerated { .. })
                    && !comment.admin_reviewed
            }
            CommentQueue::Moderated => comment.is_moderated(),
            CommentQueue::Reported => comment.reported,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PostListFilter {
    #[default]
    All,
    Published,
    Drafts,
}

impl PostListFilter {
    pub fn includes(self, post: &Post) -> bool {
        match self {
            PostListFilter::All => true,
            PostListFilter::Published => post.published,
            PostListFilter::Drafts => !post.published,
        }
    }
}

pub fn filter_queue(comments: &[Comment], queue: CommentQueue) -> Vec<&Comment> {
    comments.iter().filter(|c| queue.includes(c)).collect()
}

// ============================================================================
// SERVICE
// ============================================================================

pub struct AdminService<S: DocumentStore> {
    store: Arc<S>,
}

impl<S: DocumentStore> AdminService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn stats(&self) -> Result<DashboardStats, StoreError> {
        let posts = self.store.list_posts().await?;
        let mut stats = DashboardStats {
            total_posts: posts.len(),
            published_posts: posts.iter().filter(|p| p.published).count(),
            ..Default::default()
        };
        stats.draft_posts = stats.total_posts - stats.published_posts;

        for post in &posts {
            let comments = self.store.list_comments(&post.id).await?;
            stats.total_comments += comments.len();
            stats.flagged_comments += filter_queue(&comments, CommentQueue::Flagged).len();
            stats.reported_comments += filter_queue(&comments, CommentQueue::Reported).len();
        }

        Ok(stats)
    }

    /// Most liked published posts. Ties keep the newest first.
    pub async fn top_posts_by_likes(&self, limit: usize) -> Result<Vec<Post>, StoreError> {
        let mut posts: Vec<Post> = self
            .store
            .list_posts()
            .await?
            .into_iter()
            .filter(|p| p.published)
            .collect();

        // Stable sort over the newest-first listing
        posts.sort_by(|a, b| b.likes.cmp(&a.likes));
        posts.truncate(limit);
        Ok(posts)
    }

    pub async fn list_posts(&self, filter: PostListFilter) -> Result<Vec<Post>, StoreError> {
        let posts = self.store.list_posts().await?;
        Ok(posts.into_iter().filter(|p| filter.includes(p)).collect())
    }

    /// Comments across every post that belong in a queue, newest first.
    pub async fn review_queue(&self, queue: CommentQueue) -> Result<Vec<Comment>, StoreError> {
        let mut queued = Vec::new();
        for post in self.store.list_posts().await? {
            let comments = self.store.list_comments(&post.id).await?;
            queued.extend(comments.into_iter().filter(|c| queue.includes(c)));
        }
        queued.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        tracing::debug!(?queue, count = queued.len(), "Built review queue");
        Ok(queued)
    }
}
