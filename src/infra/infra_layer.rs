// The infra module contains implementations of core traits.
// Each feature implementation goes in its own submodule.

#[path = "store/mod.rs"]
pub mod store;

#[path = "moderation/mod.rs"]
pub mod moderation;

#[path = "config/mod.rs"]
pub mod config;
