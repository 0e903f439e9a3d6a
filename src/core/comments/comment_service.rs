// Comment service - submission, listing, reporting and admin actions.
//
// Everything a comment goes through passes the classifier here first.
// Counters move through the store's atomic increment, never read-modify-write.
// The comment write is the operation; the counter update after it is best-effort.

use super::comment_models::{Comment, CommentDraft, ModerationState, NewComment};
use crate::core::moderation::{
    ContentClassifier, RestrictionKind, SubmissionError, ValidationError, VerdictReason,
};
use crate::core::posts::PostCounter;
use crate::core::session::Viewer;
use crate::core::store::{DocumentStore, StoreError};
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;

pub const DEFAULT_ANONYMOUS_LABEL: &str = "Anonymous";

#[derive(Debug, Error)]
pub enum CommentError {
    #[error(transparent)]
    Submission(#[from] SubmissionError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("You are not allowed to do that")]
    Forbidden,

    #[error("A moderation reason is required")]
    InvalidReason,

    #[error("Store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for CommentError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => CommentError::NotFound("document".to_string()),
            other => CommentError::Store(other),
        }
    }
}

/// Summary of a reclassification run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReclassifySummary {
    pub examined: usize,
    pub changed: usize,
    /// Admin-reviewed comments left untouched
    pub skipped: usize,
}

pub struct CommentService<S: DocumentStore> {
    store: Arc<S>,
    classifier: Arc<ContentClassifier>,
    anonymous_label: String,
}

impl<S: DocumentStore> CommentService<S> {
    pub fn new(store: Arc<S>, classifier: Arc<ContentClassifier>) -> Self {
        Self {
            store,
            classifier,
            anonymous_label: DEFAULT_ANONYMOUS_LABEL.to_string(),
        }
    }

    pub fn with_anonymous_label(mut self, label: impl Into<String>) -> Self {
        self.anonymous_label = label.into();
        self
    }

    /// Validate, screen and persist a new comment.
    ///
    /// Restricted submissions are refused and never reach the store.
    /// Moderated ones are stored with their body flagged.
    pub async fn submit_comment(
        &self,
        viewer: &Viewer,
        draft: CommentDraft,
    ) -> Result<Comment, CommentError> {
        let content = draft.content.trim();
        if content.is_empty() {
            return Err(SubmissionError::from(ValidationError::EmptyComment).into());
        }

        if self.store.get_post(&draft.post_id).await?.is_none() {
            return Err(CommentError::NotFound(format!("post {}", draft.post_id)));
        }

        // Form field first, then the saved profile name
        let author_name = [Some(draft.author_name.as_str()), viewer.display_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.anonymous_label.clone());

        // The admin is the one person allowed to use the reserved names
        let verdict = if viewer.is_admin {
            self.classifier.classify_comment(content)
        } else {
            self.classifier.screen_submission(&author_name, content)
        };

        if !verdict.allowed {
            tracing::info!(
                post_id = %draft.post_id,
                user_id = %viewer.user_id,
                rule = verdict.matched_rule.as_deref().unwrap_or("-"),
                reason = %verdict.reason,
                "Refused comment"
            );
            let kind = match verdict.reason {
                VerdictReason::UsernameRestricted => RestrictionKind::Username,
                _ => RestrictionKind::Content,
            };
            return Err(SubmissionError::Restricted(kind).into());
        }

        let moderation = ModerationState::from_verdict(&verdict);
        if moderation.is_moderated() {
            tracing::info!(
                post_id = %draft.post_id,
                rule = verdict.matched_rule.as_deref().unwrap_or("-"),
                "Comment stored as moderated"
            );
        }

        let comment = self
            .store
            .insert_comment(NewComment {
                post_id: draft.post_id.clone(),
                author_name,
                user_id: viewer.user_id.clone(),
                content: content.to_string(),
                is_admin: viewer.is_admin,
                moderation,
            })
            .await?;

        self.adjust_comment_count(&draft.post_id, 1).await;

        Ok(comment)
    }

    /// Comments on a post, newest first.
    pub async fn list_comments(&self, post_id: &str) -> Result<Vec<Comment>, CommentError> {
        Ok(self.store.list_comments(post_id).await?)
    }

    /// Flag a comment for admin review. Anyone may report.
    pub async fn report_comment(
        &self,
        post_id: &str,
        comment_id: &str,
    ) -> Result<Comment, CommentError> {
        let mut comment = self.find(post_id, comment_id).await?;
        if !comment.reported {
            comment.reported = true;
            comment.updated_at = Some(Utc::now());
            self.store.update_comment(&comment).await?;
            tracing::info!(post_id, comment_id, "Comment reported");
        }
        Ok(comment)
    }

    /// Delete a comment. Only its author or the admin may.
    pub async fn delete_comment(
        &self,
        viewer: &Viewer,
        post_id: &str,
        comment_id: &str,
    ) -> Result<(), CommentError> {
        let comment = self.find(post_id, comment_id).await?;
        if !viewer.is_admin && comment.user_id != viewer.user_id {
            return Err(CommentError::Forbidden);
        }

        if self.store.delete_comment(post_id, comment_id).await? {
            self.adjust_comment_count(post_id, -1).await;
            tracing::info!(post_id, comment_id, by_admin = viewer.is_admin, "Comment deleted");
        }
        Ok(())
    }

    /// Admin approval, with an optional reply.
    pub async fn approve_comment(
        &self,
        viewer: &Viewer,
        post_id: &str,
        comment_id: &str,
        reply: Option<String>,
    ) -> Result<Comment, CommentError> {
        require_admin(viewer)?;

        let mut comment = self.find(post_id, comment_id).await?;
        comment.approve(reply, Utc::now());
        self.store.update_comment(&comment).await?;

        tracing::info!(post_id, comment_id, "Comment approved");
        Ok(comment)
    }

    /// Admin override: moderate a comment with a free-text reason.
    pub async fn moderate_comment(
        &self,
        viewer: &Viewer,
        post_id: &str,
        comment_id: &str,
        reason: &str,
    ) -> Result<Comment, CommentError> {
        require_admin(viewer)?;

        let reason = reason.trim();
        if reason.is_empty() {
            return Err(CommentError::InvalidReason);
        }

        let mut comment = self.find(post_id, comment_id).await?;
        comment.mark_moderated(reason.to_string(), Utc::now());
        self.store.update_comment(&comment).await?;

        tracing::info!(post_id, comment_id, reason, "Comment moderated by admin");
        Ok(comment)
    }

    /// Re-run the classifier over a post's comments after a rule change.
    pub async fn reclassify_comments(
        &self,
        viewer: &Viewer,
        post_id: &str,
    ) -> Result<ReclassifySummary, CommentError> {
        require_admin(viewer)?;

        let now = Utc::now();
        let mut summary = ReclassifySummary::default();

        for mut comment in self.store.list_comments(post_id).await? {
            summary.examined += 1;
            if comment.admin_reviewed {
                summary.skipped += 1;
                continue;
            }

            let verdict = self.classifier.classify_comment(&comment.content);
            if comment.apply_verdict(&verdict, now) {
                self.store.update_comment(&comment).await?;
                summary.changed += 1;
            }
        }

        tracing::info!(
            post_id,
            examined = summary.examined,
            changed = summary.changed,
            skipped = summary.skipped,
            "Reclassified comments"
        );
        Ok(summary)
    }

    /// A failed counter write is logged, not returned: the comment write it
    /// follows has already happened.
    async fn adjust_comment_count(&self, post_id: &str, delta: i64) {
        if let Err(err) = self
            .store
            .increment_post_counter(post_id, PostCounter::CommentCount, delta)
            .await
        {
            tracing::warn!(post_id, delta, error = %err, "Failed to update comment count");
        }
    }

    async fn find(&self, post_id: &str, comment_id: &str) -> Result<Comment, CommentError> {
        self.store
            .get_comment(post_id, comment_id)
            .await?
            .ok_or_else(|| CommentError::NotFound(format!("comment {}", comment_id)))
    }
}

fn require_admin(viewer: &Viewer) -> Result<(), CommentError> {
    if viewer.is_admin {
        Ok(())
    } else {
        Err(CommentError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::moderation::{RuleDefinition, RuleSet, RuleTier};
    use crate::core::posts::{Categories, Post};
    use crate::core::store::{PostPage, PostQuery};
    use crate::infra::store::InMemoryDocumentStore;

    fn store_with_post() -> Arc<InMemoryDocumentStore> {
        Arc::new(seeded_store())
    }

    fn seeded_store() -> InMemoryDocumentStore {
        let store = InMemoryDocumentStore::new();
        store.insert_post(Post {
            id: "p1".to_string(),
            title: "Hello".to_string(),
            excerpt: String::new(),
            content: String::new(),
            category: Categories::Joined("Tech".to_string()),
            image_url: None,
            published: true,
            likes: 0,
            views: 0,
            comment_count: 0,
            created_at: Utc::now(),
        });
        store
    }

    fn service(store: Arc<InMemoryDocumentStore>) -> CommentService<InMemoryDocumentStore> {
        CommentService::new(store, Arc::new(ContentClassifier::with_default_rules()))
    }

    fn visitor(id: &str) -> Viewer {
        Viewer::visitor(id)
    }

    fn admin() -> Viewer {
        Viewer::admin("admin-uid", "Admin")
    }

    async fn comment_count(store: &InMemoryDocumentStore) -> u64 {
        store.get_post("p1").await.unwrap().unwrap().comment_count
    }

    #[tokio::test]
    async fn test_clean_comment_is_stored() {
        let store = store_with_post();
        let comments = service(store.clone());

        let comment = comments
            .submit_comment(
                &visitor("u1"),
                CommentDraft::new("p1", "Jamie", "Great post, thanks!"),
            )
            .await
            .unwrap();

        assert_eq!(comment.moderation, ModerationState::Clean);
        assert_eq!(comment.author_name, "Jamie");
        assert_eq!(comment_count(&store).await, 1);
    }

    #[tokio::test]
    async fn test_restricted_comment_is_never_stored() {
        let store = store_with_post();
        let comments = service(store.clone());

        let err = comments
            .submit_comment(
                &visitor("u1"),
                CommentDraft::new("p1", "Jamie", "check this out http://bit.ly/xyz"),
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CommentError::Submission(SubmissionError::Restricted(RestrictionKind::Content))
        ));
        assert!(comments.list_comments("p1").await.unwrap().is_empty());
        assert_eq!(comment_count(&store).await, 0);
    }

    #[tokio::test]
    async fn test_moderated_comment_is_stored_flagged() {
        let comments = service(store_with_post());

        let comment = comments
            .submit_comment(&visitor("u1"), CommentDraft::new("p1", "", "you are so stupid"))
            .await
            .unwrap();

        assert!(comment.is_moderated());
        assert_eq!(comment.moderated_reason().as_deref(), Some("Moderated language"));
        assert_eq!(comment.author_name, DEFAULT_ANONYMOUS_LABEL);
    }

    #[tokio::test]
    async fn test_profile_name_fills_empty_author() {
        let comments = service(store_with_post()).with_anonymous_label("Guest");

        let named = comments
            .submit_comment(
                &visitor("u1").with_display_name("Robin"),
                CommentDraft::new("p1", " ", "Nice read"),
            )
            .await
            .unwrap();
        assert_eq!(named.author_name, "Robin");

        let anonymous = comments
            .submit_comment(&visitor("u2"), CommentDraft::new("p1", "", "Nice read"))
            .await
            .unwrap();
        assert_eq!(anonymous.author_name, "Guest");
    }

    #[tokio::test]
    async fn test_validation_and_username_errors() {
        let comments = service(store_with_post());

        let err = comments
            .submit_comment(&visitor("u1"), CommentDraft::new("p1", "Jamie", "   "))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CommentError::Submission(SubmissionError::Validation(ValidationError::EmptyComment))
        ));

        let err = comments
            .submit_comment(&visitor("u1"), CommentDraft::new("p1", "SuperAdmin", "hello"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CommentError::Submission(SubmissionError::Restricted(RestrictionKind::Username))
        ));

        let err = comments
            .submit_comment(&visitor("u1"), CommentDraft::new("missing", "Jamie", "hello"))
            .await
            .unwrap_err();
        assert!(matches!(err, CommentError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_admin_may_use_reserved_name() {
        let comments = service(store_with_post());

        let comment = comments
            .submit_comment(&admin(), CommentDraft::new("p1", "Admin", "Thanks everyone"))
            .await
            .unwrap();
        assert!(comment.is_admin);
    }

    #[tokio::test]
    async fn test_admin_moderates_clean_comment_off_topic() {
        let comments = service(store_with_post());
        let comment = comments
            .submit_comment(&visitor("u1"), CommentDraft::new("p1", "Jamie", "Nice photos"))
            .await
            .unwrap();

        let moderated = comments
            .moderate_comment(&admin(), "p1", &comment.id, "off-topic")
            .await
            .unwrap();

        assert!(moderated.is_moderated());
        assert_eq!(moderated.moderated_reason().as_deref(), Some("off-topic"));

        let stored = comments.list_comments("p1").await.unwrap();
        assert_eq!(stored[0], moderated);
    }

    #[tokio::test]
    async fn test_moderate_requires_admin_and_reason() {
        let comments = service(store_with_post());
        let comment = comments
            .submit_comment(&visitor("u1"), CommentDraft::new("p1", "Jamie", "Nice"))
            .await
            .unwrap();

        let err = comments
            .moderate_comment(&visitor("u1"), "p1", &comment.id, "spam")
            .await
            .unwrap_err();
        assert!(matches!(err, CommentError::Forbidden));

        let err = comments
            .moderate_comment(&admin(), "p1", &comment.id, "  ")
            .await
            .unwrap_err();
        assert!(matches!(err, CommentError::InvalidReason));
    }

    #[tokio::test]
    async fn test_report_then_approve() {
        let comments = service(store_with_post());
        let comment = comments
            .submit_comment(&visitor("u1"), CommentDraft::new("p1", "Jamie", "you suck"))
            .await
            .unwrap();

        let reported = comments.report_comment("p1", &comment.id).await.unwrap();
        assert!(reported.reported);

        let approved = comments
            .approve_comment(&admin(), "p1", &comment.id, Some("Fair point".to_string()))
            .await
            .unwrap();
        assert!(!approved.is_moderated());
        assert!(!approved.reported);
        assert_eq!(approved.reply.as_deref(), Some("Fair point"));
    }

    #[tokio::test]
    async fn test_delete_owner_or_admin_only() {
        let store = store_with_post();
        let comments = service(store.clone());
        let first = comments
            .submit_comment(&visitor("u1"), CommentDraft::new("p1", "Jamie", "first"))
            .await
            .unwrap();
        let second = comments
            .submit_comment(&visitor("u1"), CommentDraft::new("p1", "Jamie", "second"))
            .await
            .unwrap();
        assert_eq!(comment_count(&store).await, 2);

        let err = comments
            .delete_comment(&visitor("u2"), "p1", &first.id)
            .await
            .unwrap_err();
        assert!(matches!(err, CommentError::Forbidden));

        comments
            .delete_comment(&visitor("u1"), "p1", &first.id)
            .await
            .unwrap();
        comments.delete_comment(&admin(), "p1", &second.id).await.unwrap();

        assert!(comments.list_comments("p1").await.unwrap().is_empty());
        assert_eq!(comment_count(&store).await, 0);
    }

    #[tokio::test]
    async fn test_concurrent_submissions_count_atomically() {
        let store = store_with_post();
        let comments = Arc::new(service(store.clone()));

        let mut handles = Vec::new();
        for i in 0..20 {
            let comments = comments.clone();
            handles.push(tokio::spawn(async move {
                comments
                    .submit_comment(
                        &Viewer::visitor(&format!("u{}", i)),
                        CommentDraft::new("p1", "Reader", "Lovely write-up"),
                    )
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(comment_count(&store).await, 20);
        assert_eq!(comments.list_comments("p1").await.unwrap().len(), 20);
    }

    #[tokio::test]
    async fn test_reclassify_skips_admin_reviewed() {
        let store = store_with_post();
        let lenient = service(store.clone());

        let reviewed = lenient
            .submit_comment(&visitor("u1"), CommentDraft::new("p1", "Jamie", "pineapple pizza"))
            .await
            .unwrap();
        let untouched = lenient
            .submit_comment(&visitor("u2"), CommentDraft::new("p1", "Sam", "pineapple forever"))
            .await
            .unwrap();
        lenient
            .approve_comment(&admin(), "p1", &reviewed.id, None)
            .await
            .unwrap();

        // New rule flags both bodies
        let rules = RuleSet {
            rules: vec![RuleDefinition::pattern(
                "fruit-war",
                RuleTier::Moderated,
                r"\bpineapple\b",
            )],
            reserved_names: vec![],
        };
        let strict = CommentService::new(
            store.clone(),
            Arc::new(ContentClassifier::new(&rules).unwrap()),
        );

        let summary = strict.reclassify_comments(&admin(), "p1").await.unwrap();
        assert_eq!(
            summary,
            ReclassifySummary {
                examined: 2,
                changed: 1,
                skipped: 1
            }
        );

        let reviewed = store.get_comment("p1", &reviewed.id).await.unwrap().unwrap();
        let untouched = store.get_comment("p1", &untouched.id).await.unwrap().unwrap();
        assert!(!reviewed.is_moderated());
        assert!(untouched.is_moderated());
    }

    /// Delegates to the in-memory store but refuses every counter write.
    struct BrokenCounterStore {
        inner: InMemoryDocumentStore,
    }

    #[async_trait::async_trait]
    impl DocumentStore for BrokenCounterStore {
        async fn query_posts(&self, query: &PostQuery) -> Result<PostPage, StoreError> {
            self.inner.query_posts(query).await
        }

        async fn get_post(&self, post_id: &str) -> Result<Option<Post>, StoreError> {
            self.inner.get_post(post_id).await
        }

        async fn list_posts(&self) -> Result<Vec<Post>, StoreError> {
            self.inner.list_posts().await
        }

        async fn increment_post_counter(
            &self,
            _post_id: &str,
            _counter: PostCounter,
            _delta: i64,
        ) -> Result<u64, StoreError> {
            Err(StoreError::Storage("counter unavailable".to_string()))
        }

        async fn insert_comment(&self, comment: NewComment) -> Result<Comment, StoreError> {
            self.inner.insert_comment(comment).await
        }

        async fn get_comment(
            &self,
            post_id: &str,
            comment_id: &str,
        ) -> Result<Option<Comment>, StoreError> {
            self.inner.get_comment(post_id, comment_id).await
        }

        async fn update_comment(&self, comment: &Comment) -> Result<(), StoreError> {
            self.inner.update_comment(comment).await
        }

        async fn delete_comment(&self, post_id: &str, comment_id: &str) -> Result<bool, StoreError> {
            self.inner.delete_comment(post_id, comment_id).await
        }

        async fn list_comments(&self, post_id: &str) -> Result<Vec<Comment>, StoreError> {
            self.inner.list_comments(post_id).await
        }

        async fn set_like(
            &self,
            post_id: &str,
            user_id: &str,
            liked: bool,
        ) -> Result<bool, StoreError> {
            self.inner.set_like(post_id, user_id, liked).await
        }

        async fn has_like(&self, post_id: &str, user_id: &str) -> Result<bool, StoreError> {
            self.inner.has_like(post_id, user_id).await
        }
    }

    #[tokio::test]
    async fn test_counter_failure_does_not_fail_comment_writes() {
        let store = Arc::new(BrokenCounterStore {
            inner: seeded_store(),
        });
        let comments = CommentService::new(store, Arc::new(ContentClassifier::with_default_rules()));

        let comment = comments
            .submit_comment(&visitor("u1"), CommentDraft::new("p1", "Jamie", "Great post"))
            .await
            .unwrap();
        assert_eq!(comments.list_comments("p1").await.unwrap().len(), 1);

        comments
            .delete_comment(&visitor("u1"), "p1", &comment.id)
            .await
            .unwrap();
        assert!(comments.list_comments("p1").await.unwrap().is_empty());
    }
}
