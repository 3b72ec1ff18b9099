//! Bounded retry of ids that failed a fan-out pass.

use crate::error::RefreshError;
use crate::fan_out::fetch_stories;
use crate::rate_limiter::FixedWindowLimiter;
use crate::story_fetcher::StoryFetcher;
use crate::types::{Story, StoryId};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

const MAX_RETRY_PASSES: u32 = 5;
const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Re-runs the fan-out over `failed` until it drains or the pass budget is
/// spent, pausing a fixed delay before each pass. Whatever still fails
/// after the last pass is dropped from the cycle with a warning and the
/// snapshot ships without it.
pub async fn recover_failures<F: StoryFetcher>(
    fetcher: &F,
    limiter: &FixedWindowLimiter,
    failed: Vec<StoryId>,
    max_in_flight: usize,
) -> Result<Vec<Story>, RefreshError> {
    let mut recovered = Vec::new();
    let mut remaining = failed;

    for pass in 1..=MAX_RETRY_PASSES {
        if remaining.is_empty() {
            break;
        }
        sleep(RETRY_DELAY).await;

        let outcome = fetch_stories(fetcher, limiter, &remaining, max_in_flight).await?;
        info!(
            pass,
            recovered = outcome.stories.len(),
            remaining = outcome.failed.len(),
            "Retry pass finished"
        );
        recovered.extend(outcome.stories);
        remaining = outcome.failed;
    }

    if !remaining.is_empty() {
        warn!(
            dropped = remaining.len(),
            ids = ?remaining,
            "Dropping stories that failed every retry"
        );
    }

    Ok(recovered)
}
