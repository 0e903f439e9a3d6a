// Engagement service - likes and views.
//
// The per-user like marker decides whether the counter moves, so a double
// click from the same viewer can never count twice.

use crate::core::posts::PostCounter;
use crate::core::session::Viewer;
use crate::core::store::{DocumentStore, StoreError};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngagementError {
    #[error("Post not found: {0}")]
    NotFound(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Outcome of a like toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeToggle {
    pub liked: bool,
    /// What was applied to the counter: +1, -1, or 0 if a concurrent toggle got there first
    pub delta: i64,
    /// Server value after the update
    pub likes: u64,
}

pub struct EngagementService<S: DocumentStore> {
    store: Arc<S>,
}

impl<S: DocumentStore> EngagementService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Flip the viewer's like on a post.
    pub async fn toggle_like(
        &self,
        viewer: &Viewer,
        post_id: &str,
    ) -> Result<LikeToggle, EngagementError> {
        let post = self
            .store
            .get_post(post_id)
            .await?
            .ok_or_else(|| EngagementError::NotFound(post_id.to_string()))?;

        let liked = !self.store.has_like(post_id, &viewer.user_id).await?;
        let changed = self.store.set_like(post_id, &viewer.user_id, liked).await?;

        if !changed {
            return Ok(LikeToggle {
                liked,
                delta: 0,
                likes: post.likes,
            });
        }

        let delta = if liked { 1 } else { -1 };
        let likes = self
            .store
            .increment_post_counter(post_id, PostCounter::Likes, delta)
            .await?;

        tracing::debug!(post_id, user_id = %viewer.user_id, liked, likes, "Toggled like");
        Ok(LikeToggle {
            liked,
            delta,
            likes,
        })
    }

    pub async fn has_liked(&self, viewer: &Viewer, post_id: &str) -> Result<bool, EngagementError> {
        Ok(self.store.has_like(post_id, &viewer.user_id).await?)
    }

    /// Count a view. Returns the new total.
    pub async fn record_view(&self, post_id: &str) -> Result<u64, EngagementError> {
        if self.store.get_post(post_id).await?.is_none() {
            return Err(EngagementError::NotFound(post_id.to_string()));
        }
        Ok(self
            .store
            .increment_post_counter(post_id, PostCounter::Views, 1)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::posts::{Categories, Post};
    use crate::infra::store::InMemoryDocumentStore;
    use chrono::Utc;

    fn store() -> Arc<InMemoryDocumentStore> {
        let store = InMemoryDocumentStore::new();
        store.insert_post(Post {
            id: "p1".to_string(),
            title: "Hello".to_string(),
            excerpt: String::new(),
            content: String::new(),
            category: Categories::default(),
            image_url: None,
            published: true,
            likes: 4,
            views: 0,
            comment_count: 0,
            created_at: Utc::now(),
        });
        Arc::new(store)
    }

    #[tokio::test]
    async fn test_toggle_like_twice() {
        let engagement = EngagementService::new(store());
        let viewer = Viewer::visitor("u1");

        let first = engagement.toggle_like(&viewer, "p1").await.unwrap();
        assert_eq!(
            first,
            LikeToggle {
                liked: true,
                delta: 1,
                likes: 5
            }
        );
        assert!(engagement.has_liked(&viewer, "p1").await.unwrap());

        let second = engagement.toggle_like(&viewer, "p1").await.unwrap();
        assert_eq!(
            second,
            LikeToggle {
                liked: false,
                delta: -1,
                likes: 4
            }
        );
        assert!(!engagement.has_liked(&viewer, "p1").await.unwrap());
    }

    #[tokio::test]
    async fn test_many_viewers_like_concurrently() {
        let store = store();
        let engagement = Arc::new(EngagementService::new(store.clone()));

        let mut handles = Vec::new();
        for i in 0..25 {
            let engagement = engagement.clone();
            handles.push(tokio::spawn(async move {
                let viewer = Viewer::visitor(&format!("u{}", i));
                engagement.toggle_like(&viewer, "p1").await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let post = store.get_post("p1").await.unwrap().unwrap();
        assert_eq!(post.likes, 29);
    }

    #[tokio::test]
    async fn test_record_view() {
        let engagement = EngagementService::new(store());

        assert_eq!(engagement.record_view("p1").await.unwrap(), 1);
        assert_eq!(engagement.record_view("p1").await.unwrap(), 2);
        assert!(matches!(
            engagement.record_view("missing").await,
            Err(EngagementError::NotFound(_))
        ));
    }
}
