// The core module contains all business logic.
// Each feature gets its own submodule.

#[path = "store/document_store.rs"]
pub mod store;

#[path = "posts/mod.rs"]
pub mod posts;

#[path = "moderation/mod.rs"]
pub mod moderation;

#[path = "comments/mod.rs"]
pub mod comments;

#[path = "engagement/mod.rs"]
pub mod engagement;

#[path = "admin/admin_service.rs"]
pub mod admin;

#[path = "session/viewer_session.rs"]
pub mod session;
