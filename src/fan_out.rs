//! Rate-limited, bounded-concurrency story detail fetching.

use crate::error::RefreshError;
use crate::rate_limiter::FixedWindowLimiter;
use crate::story_fetcher::StoryFetcher;
use crate::types::{Story, StoryId};
use futures::stream::{self, StreamExt};
use tracing::warn;

/// Result of one fan-out pass. Every requested id lands on exactly one side.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub stories: Vec<Story>,
    pub failed: Vec<StoryId>,
}

/// Fetches details for `ids` with at most `max_in_flight` requests running
/// at once, each admitted through `limiter` first. A fetch error and a
/// rejected admission both count the id as failed; nothing is retried here.
pub async fn fetch_stories<F: StoryFetcher>(
    fetcher: &F,
    limiter: &FixedWindowLimiter,
    ids: &[StoryId],
    max_in_flight: usize,
) -> Result<FetchOutcome, RefreshError> {
    let results: Vec<(StoryId, Option<Story>)> = stream::iter(ids.iter().copied())
        .map(|id| async move {
            if !limiter.acquire().await.is_granted() {
                warn!(id, "Admission queue full; counting fetch as failed");
                return (id, None);
            }
            match fetcher.fetch_story(id).await {
                Ok(story) => (id, Some(story)),
                Err(error) => {
                    warn!(id, error = %error, "Story fetch failed");
                    (id, None)
                }
            }
        })
        .buffer_unordered(max_in_flight.max(1))
        .collect()
        .await;

    let mut outcome = FetchOutcome::default();
    for (id, result) in results {
        match result {
            Some(story) => outcome.stories.push(story),
            None => outcome.failed.push(id),
        }
    }

    // Every requested id must come back as a story or a failure. A mismatch
    // is a bug, not a transient condition, and aborts the cycle.
    if outcome.stories.len() + outcome.failed.len() != ids.len() {
        return Err(RefreshError::CountMismatch {
            stories: outcome.stories.len(),
            failed: outcome.failed.len(),
            requested: ids.len(),
        });
    }

    Ok(outcome)
}
