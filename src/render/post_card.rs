// Post card view model for the blog grid.

use crate::core::engagement::OptimisticCount;
use crate::core::posts::Post;
use chrono_tz::Tz;
use serde::Serialize;

/// Cards show at most this many category tags.
pub const CARD_CATEGORY_LIMIT: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostCard {
    pub id: String,
    pub title: String,
    pub excerpt: String,
    pub image_url: Option<String>,
    pub categories: Vec<String>,
    pub likes: u64,
    pub comment_count: u64,
    pub views: u64,
    /// e.g. "March 4, 2024", in the engine's year timezone
    pub date_label: String,
}

impl PostCard {
    pub fn new(post: &Post, tz: Tz) -> Self {
        Self {
            id: post.id.clone(),
            title: post.title.clone(),
            excerpt: post.excerpt.clone(),
            image_url: post.image_url.clone(),
            categories: post
                .category
                .tokens()
                .into_iter()
                .take(CARD_CATEGORY_LIMIT)
                .map(str::to_string)
                .collect(),
            likes: post.likes,
            comment_count: post.comment_count,
            views: post.views,
            date_label: post
                .created_at
                .with_timezone(&tz)
                .format("%B %-d, %Y")
                .to_string(),
        }
    }

    /// Show a like count that includes the viewer's unconfirmed toggle.
    pub fn with_likes(mut self, likes: &OptimisticCount) -> Self {
        self.likes = likes.display();
        self
    }
}

pub fn post_cards<'a>(posts: impl IntoIterator<Item = &'a Post>, tz: Tz) -> Vec<PostCard> {
    posts.into_iter().map(|post| PostCard::new(post, tz)).collect()
}
