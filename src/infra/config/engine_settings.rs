// Engine settings from the environment.
//
// Call `dotenv::dotenv()` before `EngineSettings::from_env()` so values from
// a local `.env` file are picked up. Anything missing or unparseable falls
// back to its default with a warning.

use crate::core::comments::DEFAULT_ANONYMOUS_LABEL;
use crate::core::posts::{PageSizes, DEFAULT_INITIAL_PAGE_SIZE, DEFAULT_LOAD_MORE_SIZE};
use chrono_tz::Tz;
use std::path::PathBuf;

pub const DEFAULT_ADMIN_DISPLAY_NAME: &str = "Admin";

#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    /// `None` means the built-in rule table
    pub rules_path: Option<PathBuf>,
    /// Timezone that decides which calendar year a post belongs to
    pub year_timezone: Tz,
    pub page_sizes: PageSizes,
    pub admin_display_name: String,
    pub anonymous_label: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            rules_path: None,
            year_timezone: chrono_tz::UTC,
            page_sizes: PageSizes::default(),
            admin_display_name: DEFAULT_ADMIN_DISPLAY_NAME.to_string(),
            anonymous_label: DEFAULT_ANONYMOUS_LABEL.to_string(),
        }
    }
}

impl EngineSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let year_timezone = match get("BLOG_YEAR_TIMEZONE") {
            Some(name) => name.parse::<Tz>().unwrap_or_else(|_| {
                tracing::warn!(value = %name, "Unknown BLOG_YEAR_TIMEZONE, using UTC");
                chrono_tz::UTC
            }),
            None => defaults.year_timezone,
        };

        let page_size = |key: &str, default: usize| {
            get(key)
                .and_then(|v| v.parse::<usize>().ok())
                .filter(|size| *size > 0)
                .unwrap_or(default)
        };

        Self {
            rules_path: get("MODERATION_RULES_PATH").map(PathBuf::from),
            year_timezone,
            page_sizes: PageSizes {
                initial: page_size("BLOG_INITIAL_PAGE_SIZE", DEFAULT_INITIAL_PAGE_SIZE),
                more: page_size("BLOG_LOAD_MORE_SIZE", DEFAULT_LOAD_MORE_SIZE),
            },
            admin_display_name: get("BLOG_ADMIN_DISPLAY_NAME")
                .unwrap_or(defaults.admin_display_name),
            anonymous_label: get("BLOG_ANONYMOUS_LABEL").unwrap_or(defaults.anonymous_label),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(pairs: &[(&str, &str)]) -> EngineSettings {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EngineSettings::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_empty_environment_gives_defaults() {
        assert_eq!(settings(&[]), EngineSettings::default());
    }

    #[test]
    fn test_values_are_read() {
        let s = settings(&[
            ("MODERATION_RULES_PATH", "config/rules.json"),
            ("BLOG_YEAR_TIMEZONE", "Asia/Manila"),
            ("BLOG_INITIAL_PAGE_SIZE", "24"),
            ("BLOG_LOAD_MORE_SIZE", "8"),
            ("BLOG_ADMIN_DISPLAY_NAME", "The Author"),
            ("BLOG_ANONYMOUS_LABEL", "Guest"),
        ]);

        assert_eq!(s.rules_path, Some(PathBuf::from("config/rules.json")));
        assert_eq!(s.year_timezone, chrono_tz::Asia::Manila);
        assert_eq!(s.page_sizes, PageSizes { initial: 24, more: 8 });
        assert_eq!(s.admin_display_name, "The Author");
        assert_eq!(s.anonymous_label, "Guest");
    }

    #[test]
    fn test_bad_values_fall_back() {
        let s = settings(&[
            ("BLOG_YEAR_TIMEZONE", "Mars/Olympus"),
            ("BLOG_INITIAL_PAGE_SIZE", "lots"),
            ("BLOG_LOAD_MORE_SIZE", "0"),
            ("MODERATION_RULES_PATH", "   "),
        ]);

        assert_eq!(s.year_timezone, chrono_tz::UTC);
        assert_eq!(s.page_sizes, PageSizes::default());
        assert_eq!(s.rules_path, None);
    }
}
