// Post domain models.
//
// These mirror the documents stored in the `posts` collection. Every field
// defaults when absent or `null` so partially-written documents never fail to load.

use crate::core::store::null_as_default;
use chrono::{DateTime, Datelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize};

/// The `category` field as stored.
///
/// Older posts keep a single comma-joined string ("Tech, Tutorial"), newer ones
/// a list. Both shapes are accepted and exposed through the same token view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Categories {
    Joined(String),
    List(Vec<String>),
}

impl Default for Categories {
    fn default() -> Self {
        Categories::Joined(String::new())
    }
}

impl Categories {
    /// Trimmed, non-empty category tokens in stored order.
    pub fn tokens(&self) -> Vec<&str> {
        let raw: Vec<&str> = match self {
            Categories::Joined(joined) => joined.split(',').collect(),
            Categories::List(items) => items.iter().flat_map(|item| item.split(',')).collect(),
        };

        raw.into_iter()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .collect()
    }

    /// Exact (case-sensitive) token match.
    pub fn contains(&self, category: &str) -> bool {
        self.tokens().iter().any(|token| *token == category)
    }

    /// Substring match against the raw field text. `needle` must already be lower-cased.
    pub fn raw_contains_lowercase(&self, needle: &str) -> bool {
        match self {
            Categories::Joined(joined) => joined.to_lowercase().contains(needle),
            Categories::List(items) => items
                .iter()
                .any(|item| item.to_lowercase().contains(needle)),
        }
    }
}

/// A blog post document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub excerpt: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: Categories,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub published: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub likes: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub views: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub comment_count: u64,
    /// Documents written before the server timestamp resolved have no value yet.
    #[serde(default = "Utc::now", deserialize_with = "null_as_now")]
    pub created_at: DateTime<Utc>,
}

fn null_as_now<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<DateTime<Utc>> = Option::deserialize(deserializer)?;
    Ok(value.unwrap_or_else(Utc::now))
}

impl Post {
    /// Calendar year of `created_at` in the given timezone.
    pub fn year_in(&self, tz: &Tz) -> i32 {
        self.created_at.with_timezone(tz).year()
    }

    /// Cursor pointing at this post, for "load more" queries.
    pub fn cursor(&self) -> PageCursor {
        PageCursor {
            created_at: self.created_at,
            id: self.id.clone(),
        }
    }
}

/// Position in the newest-first post ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageCursor {
    pub created_at: DateTime<Utc>,
    pub id: String,
}

/// Server-maintained post counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PostCounter {
    Likes,
    Views,
    CommentCount,
}

impl std::fmt::Display for PostCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PostCounter::Likes => write!(f, "likes"),
            PostCounter::Views => write!(f, "views"),
            PostCounter::CommentCount => write!(f, "commentCount"),
        }
    }
}

/// The viewer's current category / year / search selection.
///
/// Empty strings count as "not set", matching the "All" entries of the filter menus.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostFilter {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub search_term: String,
}

impl PostFilter {
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_year(mut self, year: impl Into<String>) -> Self {
        self.year = Some(year.into());
        self
    }

    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search_term = term.into();
        self
    }

    pub fn active_category(&self) -> Option<&str> {
        active(self.category.as_deref())
    }

    pub fn active_year(&self) -> Option<&str> {
        active(self.year.as_deref())
    }

    /// The term is trimmed, so edge spaces never take part in the match and a
    /// whitespace-only term leaves the search unset.
    pub fn active_search(&self) -> Option<&str> {
        active(Some(self.search_term.as_str()))
    }

    /// True when no filter would exclude anything.
    pub fn is_empty(&self) -> bool {
        self.active_category().is_none()
            && self.active_year().is_none()
            && self.active_search().is_none()
    }
}

fn active(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joined_categories_are_split_and_trimmed() {
        let categories = Categories::Joined(" Tech, Tutorial ,,Rust ".to_string());
        assert_eq!(categories.tokens(), vec!["Tech", "Tutorial", "Rust"]);
        assert!(categories.contains("Tutorial"));
        assert!(!categories.contains("tutorial"));
    }

    #[test]
    fn test_list_categories_deserialize() {
        let post: Post = serde_json::from_str(
            r#"{"id":"p1","category":["Travel","Food, Drink"],"createdAt":"2024-03-01T00:00:00Z"}"#,
        )
        .unwrap();

        assert_eq!(post.category.tokens(), vec!["Travel", "Food", "Drink"]);
        assert_eq!(post.title, "");
        assert!(!post.published);
    }

    #[test]
    fn test_missing_fields_default() {
        let post: Post = serde_json::from_str(r#"{"id":"bare"}"#).unwrap();
        assert!(post.category.tokens().is_empty());
        assert_eq!(post.likes, 0);
        assert!(post.image_url.is_none());
    }

    #[test]
    fn test_null_fields_default() {
        let post: Post = serde_json::from_str(
            r#"{"id":"p1","title":"Hello","category":null,"excerpt":null,"content":null,
                "imageUrl":null,"likes":null,"published":true,"createdAt":null}"#,
        )
        .unwrap();

        assert_eq!(post.title, "Hello");
        assert!(post.category.tokens().is_empty());
        assert_eq!(post.excerpt, "");
        assert_eq!(post.content, "");
        assert!(post.image_url.is_none());
        assert_eq!(post.likes, 0);
        assert!(post.published);
    }

    #[test]
    fn test_year_depends_on_configured_timezone() {
        let post: Post =
            serde_json::from_str(r#"{"id":"nye","createdAt":"2023-12-31T20:00:00Z"}"#).unwrap();

        assert_eq!(post.year_in(&chrono_tz::UTC), 2023);
        assert_eq!(post.year_in(&chrono_tz::Asia::Tokyo), 2024);
    }

    #[test]
    fn test_blank_filter_values_are_inactive() {
        let filter = PostFilter::default()
            .with_category("  ")
            .with_year("")
            .with_search("   ");
        assert!(filter.is_empty());

        let filter = PostFilter::default().with_search(" rust ");
        assert_eq!(filter.active_search(), Some("rust"));
    }
}
