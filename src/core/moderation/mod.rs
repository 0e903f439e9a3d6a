// Core moderation module - comment classification and display-name rules.
// Following the same pattern as the posts module.

pub mod default_rules;
pub mod moderation_models;
pub mod moderation_service;

pub use moderation_models::*;
pub use moderation_service::*;
