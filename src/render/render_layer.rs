// The render module turns core data into view models for the blog and admin UIs.
// Nothing here decides moderation; it only applies what core already decided.

#[path = "comment_view.rs"]
pub mod comments;

#[path = "post_card.rs"]
pub mod posts;

pub use comments::{AuthorLabel, CommentBody, CommentRenderer, CommentView};
pub use posts::{post_cards, PostCard};
