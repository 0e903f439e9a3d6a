// Core posts module - listing, filtering and paging of blog posts.

pub mod feed_service;
pub mod post_filter;
pub mod post_models;
pub mod request_sequencer;

pub use feed_service::*;
pub use post_filter::*;
pub use post_models::*;
pub use request_sequencer::*;
