// Core engagement module - likes, views and their optimistic display.

pub mod engagement_service;
pub mod optimistic_count;

pub use engagement_service::*;
pub use optimistic_count::*;
