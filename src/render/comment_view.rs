// Comment view models.
//
// Moderated bodies are withheld here, not blurred later: a withheld view
// carries only a notice, never the text.

use crate::core::comments::Comment;
use crate::core::session::ViewerSession;
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const MODERATED_NOTICE: &str = "Content moderated for respectful communication";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorLabel {
    pub name: String,
    /// Shown with the verified badge
    pub verified: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CommentBody {
    Visible { text: String },
    /// `can_reveal` tells the UI to offer a "show anyway" button
    Withheld { notice: String, can_reveal: bool },
}

impl CommentBody {
    pub fn is_withheld(&self) -> bool {
        matches!(self, CommentBody::Withheld { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: String,
    pub author: AuthorLabel,
    pub body: CommentBody,
    pub reply: Option<String>,
    pub reported: bool,
    /// Owner or admin
    pub can_delete: bool,
    pub created_at: DateTime<Utc>,
}

pub struct CommentRenderer {
    admin_display_name: String,
    anonymous_label: String,
}

impl CommentRenderer {
    pub fn new(admin_display_name: impl Into<String>, anonymous_label: impl Into<String>) -> Self {
        Self {
            admin_display_name: admin_display_name.into(),
            anonymous_label: anonymous_label.into(),
        }
    }

    pub fn render(&self, comment: &Comment, session: &ViewerSession) -> CommentView {
        let viewer = session.viewer();
        let show_text = !comment.is_moderated() || viewer.is_admin || session.is_revealed(&comment.id);

        let body = if show_text {
            CommentBody::Visible {
                text: comment.content.clone(),
            }
        } else {
            CommentBody::Withheld {
                notice: MODERATED_NOTICE.to_string(),
                can_reveal: true,
            }
        };

        CommentView {
            id: comment.id.clone(),
            author: self.author_label(comment),
            body,
            reply: comment.reply.clone(),
            reported: comment.reported,
            can_delete: viewer.is_admin || (!comment.is_admin && comment.user_id == viewer.user_id),
            created_at: comment.created_at,
        }
    }

    pub fn render_all(&self, comments: &[Comment], session: &ViewerSession) -> Vec<CommentView> {
        comments.iter().map(|c| self.render(c, session)).collect()
    }

    fn author_label(&self, comment: &Comment) -> AuthorLabel {
        if comment.is_admin {
            return AuthorLabel {
                name: self.admin_display_name.clone(),
                verified: true,
            };
        }

        let name = comment.author_name.trim();
        AuthorLabel {
            name: if name.is_empty() {
                self.anonymous_label.clone()
            } else {
                name.to_string()
            },
            verified: false,
        }
    }
}
