// Core comments module - comment lifecycle on top of the classifier.

pub mod comment_models;
pub mod comment_service;

pub use comment_models::*;
pub use comment_service::*;
