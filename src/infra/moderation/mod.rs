// Moderation rule table storage.

pub mod json_rule_file;

pub use json_rule_file::JsonRuleFile;
