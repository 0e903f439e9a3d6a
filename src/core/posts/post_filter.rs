// Post filtering and search.
//
// Pure functions over an already-fetched batch of posts. Input order is kept
// as-is: the store returns posts newest first and the filter never re-sorts.

use super::post_models::{Post, PostFilter};
use chrono_tz::Tz;
use std::collections::BTreeSet;

/// Filter posts with the year bucketed in UTC.
pub fn filter_posts<'a>(posts: &'a [Post], filter: &PostFilter) -> Vec<&'a Post> {
    PostMatcher::new(filter, chrono_tz::UTC).filter(posts)
}

/// A compiled view of a [`PostFilter`].
///
/// The search term is lower-cased once here instead of once per post. The year
/// timezone is fixed per matcher so every viewer buckets posts the same way.
#[derive(Debug, Clone)]
pub struct PostMatcher<'f> {
    category: Option<&'f str>,
    year: Option<&'f str>,
    needle: Option<String>,
    year_tz: Tz,
}

impl<'f> PostMatcher<'f> {
    pub fn new(filter: &'f PostFilter, year_tz: Tz) -> Self {
        Self {
            category: filter.active_category(),
            year: filter.active_year(),
            // Trimmed term; whitespace-only means no search
            needle: filter.active_search().map(str::to_lowercase),
            year_tz,
        }
    }

    /// All active filters must match (logical AND).
    pub fn matches(&self, post: &Post) -> bool {
        self.matches_category(post) && self.matches_year(post) && self.matches_search(post)
    }

    pub fn filter<'a>(&self, posts: &'a [Post]) -> Vec<&'a Post> {
        posts.iter().filter(|post| self.matches(post)).collect()
    }

    fn matches_category(&self, post: &Post) -> bool {
        match self.category {
            Some(category) => post.category.contains(category),
            None => true,
        }
    }

    fn matches_year(&self, post: &Post) -> bool {
        match self.year {
            Some(year) => post.year_in(&self.year_tz).to_string() == year,
            None => true,
        }
    }

    fn matches_search(&self, post: &Post) -> bool {
        let Some(needle) = self.needle.as_deref() else {
            return true;
        };

        // Any one field is enough
        post.title.to_lowercase().contains(needle)
            || post.excerpt.to_lowercase().contains(needle)
            || post.content.to_lowercase().contains(needle)
            || post.category.raw_contains_lowercase(needle)
    }
}

/// Values for the category buttons and the year menu.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Facets {
    /// Unique category tokens, alphabetical.
    pub categories: Vec<String>,
    /// Unique years, newest first.
    pub years: Vec<i32>,
}

pub fn collect_facets<'a>(posts: impl IntoIterator<Item = &'a Post>, year_tz: Tz) -> Facets {
    let mut categories = BTreeSet::new();
    let mut years = BTreeSet::new();

    for post in posts {
        for token in post.category.tokens() {
            categories.insert(token.to_string());
        }
        years.insert(post.year_in(&year_tz));
    }

    Facets {
        categories: categories.into_iter().collect(),
        years: years.into_iter().rev().collect(),
    }
}
