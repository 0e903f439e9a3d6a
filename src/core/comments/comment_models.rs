// Comment domain models.
//
// A comment's rendering is decided by `moderation` and `reported` alone.
// Both only change through the classifier or an admin action.

use crate::core::moderation::{Verdict, VerdictReason};
use crate::core::store::null_as_default;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a comment stands with moderation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ModerationState {
    #[default]
    Clean,
    /// Flagged by the classifier
    AutoModerated { reason: VerdictReason },
    /// Flagged by an admin, with their own wording
    AdminModerated { reason: String },
}

impl ModerationState {
    /// State to persist for an allowed verdict.
    pub fn from_verdict(verdict: &Verdict) -> Self {
        if verdict.should_blur {
            ModerationState::AutoModerated {
                reason: verdict.reason,
            }
        } else {
            ModerationState::Clean
        }
    }

    pub fn is_moderated(&self) -> bool {
        !matches!(self, ModerationState::Clean)
    }

    /// Rebuild the state from the stored `moderated` / `moderatedReason` pair.
    ///
    /// Only admins moderate reviewed comments. An unreviewed one is the
    /// classifier's unless its reason is free text it could not have written.
    fn from_stored(moderated: bool, reason: Option<String>, admin_reviewed: bool) -> Self {
        if !moderated {
            return ModerationState::Clean;
        }
        let reason = reason.unwrap_or_default();
        if admin_reviewed {
            return ModerationState::AdminModerated { reason };
        }
        match VerdictReason::from_label(&reason) {
            Some(reason) => ModerationState::AutoModerated { reason },
            None if reason.trim().is_empty() => ModerationState::AutoModerated {
                reason: VerdictReason::ModeratedLanguage,
            },
            None => ModerationState::AdminModerated { reason },
        }
    }
}

/// A stored comment.
///
/// The document keeps the flat `moderated` / `moderatedReason` fields that
/// every store client reads, and is converted through `CommentDocument`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CommentDocument", into = "CommentDocument")]
pub struct Comment {
    pub id: String,
    pub post_id: String,
    pub author_name: String,
    pub user_id: String,
    pub content: String,
    pub is_admin: bool,
    pub moderation: ModerationState,
    /// Set by any admin action. Reclassification leaves these comments alone.
    pub admin_reviewed: bool,
    pub reported: bool,
    pub reply: Option<String>,
    pub replied_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Wire shape of a comment document.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentDocument {
    #[serde(default, deserialize_with = "null_as_default")]
    id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    post_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    author_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    user_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    content: String,
    #[serde(default, deserialize_with = "null_as_default")]
    is_admin: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    moderated: bool,
    #[serde(default, alias = "moderationReason", skip_serializing_if = "Option::is_none")]
    moderated_reason: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    admin_reviewed: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    reported: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reply: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    replied_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
}

impl From<CommentDocument> for Comment {
    fn from(doc: CommentDocument) -> Self {
        Self {
            moderation: ModerationState::from_stored(
                doc.moderated,
                doc.moderated_reason,
                doc.admin_reviewed,
            ),
            id: doc.id,
            post_id: doc.post_id,
            author_name: doc.author_name,
            user_id: doc.user_id,
            content: doc.content,
            is_admin: doc.is_admin,
            admin_reviewed: doc.admin_reviewed,
            reported: doc.reported,
            reply: doc.reply,
            replied_at: doc.replied_at,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }
}

impl From<Comment> for CommentDocument {
    fn from(comment: Comment) -> Self {
        Self {
            moderated: comment.is_moderated(),
            moderated_reason: comment.moderated_reason(),
            id: comment.id,
            post_id: comment.post_id,
            author_name: comment.author_name,
            user_id: comment.user_id,
            content: comment.content,
            is_admin: comment.is_admin,
            admin_reviewed: comment.admin_reviewed,
            reported: comment.reported,
            reply: comment.reply,
            replied_at: comment.replied_at,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }
}

impl Comment {
    pub fn is_moderated(&self) -> bool {
        self.moderation.is_moderated()
    }

    /// Reason text shown to the admin, `None` when clean.
    pub fn moderated_reason(&self) -> Option<String> {
        match &self.moderation {
            ModerationState::Clean => None,
            ModerationState::AutoModerated { reason } => Some(reason.to_string()),
            ModerationState::AdminModerated { reason } => Some(reason.clone()),
        }
    }

    /// Admin approval. Clears moderation and any pending report.
    pub fn approve(&mut self, reply: Option<String>, now: DateTime<Utc>) {
        self.moderation = ModerationState::Clean;
        self.reported = false;
        self.admin_reviewed = true;

        let reply = reply
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());
        if let Some(text) = reply {
            self.reply = Some(text);
            self.replied_at = Some(now);
        }
        self.updated_at = Some(now);
    }

    /// Admin override. The classifier's opinion no longer matters.
    pub fn mark_moderated(&mut self, reason: String, now: DateTime<Utc>) {
        self.moderation = ModerationState::AdminModerated { reason };
        self.admin_reviewed = true;
        self.updated_at = Some(now);
    }

    /// Apply a fresh classifier verdict. Returns true if the state changed.
    ///
    /// Admin-reviewed comments are never touched. Content that is now
    /// restricted was already stored, so it is moderated rather than removed.
    pub fn apply_verdict(&mut self, verdict: &Verdict, now: DateTime<Utc>) -> bool {
        if self.admin_reviewed {
            return false;
        }

        let next = if verdict.allowed {
            ModerationState::from_verdict(verdict)
        } else {
            ModerationState::AutoModerated {
                reason: verdict.reason,
            }
        };

        if next == self.moderation {
            return false;
        }
        self.moderation = next;
        self.updated_at = Some(now);
        true
    }
}

/// Comment as handed to the store. The store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub post_id: String,
    pub author_name: String,
    pub user_id: String,
    pub content: String,
    pub is_admin: bool,
    pub moderation: ModerationState,
}

/// What a viewer typed into the comment form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentDraft {
    pub post_id: String,
    #[serde(default)]
    pub author_name: String,
    pub content: String,
}

impl CommentDraft {
    pub fn new(post_id: &str, author_name: &str, content: &str) -> Self {
        Self {
            post_id: post_id.to_string(),
            author_name: author_name.to_string(),
            content: content.to_string(),
        }
    }
}
