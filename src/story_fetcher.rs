use crate::types::{Story, StoryId};
use anyhow::{Result, bail};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const BEST_STORIES_PATH: &str = "/v0/beststories.json";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ============================================================================
// StoryFetcher trait
// ============================================================================

/// Read access to the upstream API: one call for the best-story id list,
/// one call per story detail. Every failure cause (network, timeout,
/// rejected status, absent or malformed payload) collapses into `Err`;
/// callers treat them all the same and the message carries the diagnostics.
#[allow(async_fn_in_trait)]
pub trait StoryFetcher: Send + Sync {
    async fn fetch_best_ids(&self) -> Result<Vec<StoryId>>;
    async fn fetch_story(&self, id: StoryId) -> Result<Story>;
}

// ============================================================================
// FirebaseStoryFetcher — HN Firebase API implementation
// ============================================================================

/// Wire shape of `/v0/item/{id}.json`. Fields the upstream may omit are
/// optional here and validated in `story_from_item`.
#[derive(Deserialize)]
struct RawItem {
    title: Option<String>,
    url: Option<String>,
    by: Option<String>,
    time: Option<i64>,
    #[serde(default)]
    score: u32,
    #[serde(default)]
    descendants: u32,
    #[serde(default)]
    deleted: bool,
    #[serde(default)]
    dead: bool,
}

pub struct FirebaseStoryFetcher {
    client: Client,
    base_url: String,
}

impl FirebaseStoryFetcher {
    pub fn new(base_url: &str) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl StoryFetcher for FirebaseStoryFetcher {
    async fn fetch_best_ids(&self) -> Result<Vec<StoryId>> {
        let url = format!("{}{}", self.base_url, BEST_STORIES_PATH);
        let ids = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<StoryId>>()
            .await?;

        Ok(ids)
    }

    async fn fetch_story(&self, id: StoryId) -> Result<Story> {
        let url = format!("{}/v0/item/{}.json", self.base_url, id);
        // The API answers `null` for ids it does not know.
        let item = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json::<Option<RawItem>>()
            .await?;

        match item {
            Some(raw) => story_from_item(id, raw),
            None => bail!("story {id} does not exist upstream"),
        }
    }
}

/// Validates a wire item into a `Story`; anything unusable becomes an error.
fn story_from_item(id: StoryId, item: RawItem) -> Result<Story> {
    if item.deleted || item.dead {
        bail!("story {id} is deleted or dead");
    }
    let Some(title) = item.title else {
        bail!("story {id} has no title");
    };
    let Some(by) = item.by else {
        bail!("story {id} has no author");
    };
    let Some(time) = item.time else {
        bail!("story {id} has no timestamp");
    };

    Ok(Story {
        title,
        url: item.url,
        by,
        time,
        score: item.score,
        descendants: item.descendants,
    })
}

// ============================================================================
// Test utilities
// ============================================================================


#[cfg(test)]
mod tests {
    use super::*;

    fn item_json(body: &str) -> RawItem {
        serde_json::from_str::<Option<RawItem>>(body)
            .unwrap()
            .unwrap()
    }

    #[test]
    fn complete_item_becomes_a_story() {
        let item = item_json(
            r#"{
                "by": "pg",
                "descendants": 71,
                "id": 8863,
                "score": 104,
                "time": 1175714200,
                "title": "My YC app",
                "type": "story",
                "url": "http://www.ycombinator.com"
            }"#,
        );

        let story = story_from_item(8863, item).unwrap();
        assert_eq!(story.title, "My YC app");
        assert_eq!(story.url.as_deref(), Some("http://www.ycombinator.com"));
        assert_eq!(story.by, "pg");
        assert_eq!(story.time, 1175714200);
        assert_eq!(story.score, 104);
        assert_eq!(story.descendants, 71);
    }

    #[test]
    fn item_without_url_is_still_a_story() {
        let item = item_json(
            r#"{"by": "pg", "time": 1175714200, "title": "Ask HN: anyone?", "score": 3}"#,
        );

        let story = story_from_item(1, item).unwrap();
        assert_eq!(story.url, None);
        assert_eq!(story.descendants, 0);
    }

    #[test]
    fn deleted_item_is_rejected() {
        let item = item_json(r#"{"deleted": true, "id": 9}"#);
        assert!(story_from_item(9, item).is_err());
    }

    #[test]
    fn dead_item_is_rejected() {
        let item = item_json(
            r#"{"by": "pg", "dead": true, "time": 1175714200, "title": "gone", "score": 1}"#,
        );
        assert!(story_from_item(9, item).is_err());
    }

    #[test]
    fn item_missing_required_fields_is_rejected() {
        let no_title = item_json(r#"{"by": "pg", "time": 1175714200}"#);
        assert!(story_from_item(1, no_title).is_err());

        let no_author = item_json(r#"{"title": "t", "time": 1175714200}"#);
        assert!(story_from_item(2, no_author).is_err());

        let no_time = item_json(r#"{"title": "t", "by": "pg"}"#);
        assert!(story_from_item(3, no_time).is_err());
    }

    #[test]
    fn null_body_parses_as_absent_item() {
        let item = serde_json::from_str::<Option<RawItem>>("null").unwrap();
        assert!(item.is_none());
    }
}
