use chrono::{DateTime, Utc};
use serde::Serialize;

/// Identifier addressing a story in the upstream source. Only meaningful
/// within the refresh cycle that fetched it.
pub type StoryId = u64;

/// Upper bound on stories kept per snapshot and on the `n` query parameter.
pub const MAX_BEST_STORIES: usize = 200;

/// One story as fetched from the upstream API. Never mutated after a
/// successful fetch; superseded wholesale when a newer snapshot publishes.
#[derive(Debug, Clone, PartialEq)]
pub struct Story {
    pub title: String,
    pub url: Option<String>, // Ask HN and job posts carry no URL
    pub by: String,
    pub time: i64, // unix epoch seconds
    pub score: u32,
    pub descendants: u32,
}

/// Outward-facing story record served by the query API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedStory {
    pub title: String,
    pub url: Option<String>,
    pub author: String,
    pub time: DateTime<Utc>,
    pub score: u32,
    pub comment_count: u32,
}

impl From<&Story> for RankedStory {
    fn from(story: &Story) -> Self {
        Self {
            title: story.title.clone(),
            url: story.url.clone(),
            author: story.by.clone(),
            time: DateTime::from_timestamp(story.time, 0).unwrap_or_default(),
            score: story.score,
            comment_count: story.descendants,
        }
    }
}
