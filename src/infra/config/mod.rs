// Runtime configuration.

pub mod engine_settings;

pub use engine_settings::*;
