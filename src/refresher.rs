//! The background refresh loop.

use crate::config::Config;
use crate::error::RefreshError;
use crate::fan_out::fetch_stories;
use crate::rate_limiter::FixedWindowLimiter;
use crate::retry::recover_failures;
use crate::snapshot_store::SnapshotStore;
use crate::story_fetcher::StoryFetcher;
use crate::types::MAX_BEST_STORIES;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior, interval};
use tracing::info;

/// Drives periodic refresh cycles and publishes each result into the
/// snapshot store. The sole writer: cycles cannot overlap because the loop
/// awaits each one before awaiting the next tick.
pub struct Refresher<F> {
    fetcher: F,
    store: Arc<SnapshotStore>,
    limiter: FixedWindowLimiter,
    refresh_interval: Duration,
    max_in_flight: usize,
}

impl<F: StoryFetcher> Refresher<F> {
    pub fn new(fetcher: F, store: Arc<SnapshotStore>, config: &Config) -> Self {
        Self {
            fetcher,
            store,
            limiter: FixedWindowLimiter::default(),
            refresh_interval: config.refresh_interval,
            max_in_flight: config.max_concurrent_fetches,
        }
    }

    /// Runs refresh cycles until `shutdown` signals. The first cycle starts
    /// immediately. A `RefreshError` escaping a cycle ends the loop; a
    /// shutdown ends it with `Ok`, abandoning any cycle still in flight
    /// before its publish point.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> Result<(), RefreshError> {
        let mut ticker = interval(self.refresh_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.changed() => {
                    info!("Shutdown requested; stopping refresh loop");
                    return Ok(());
                }
            }
            tokio::select! {
                result = self.run_cycle() => result?,
                _ = shutdown.changed() => {
                    info!("Shutdown requested; abandoning the in-flight refresh cycle");
                    return Ok(());
                }
            }
        }
    }

    /// One complete cycle: id list, fan-out, retries, publish.
    async fn run_cycle(&self) -> Result<(), RefreshError> {
        let started = Instant::now();

        let mut ids = self
            .fetcher
            .fetch_best_ids()
            .await
            .map_err(RefreshError::ListFetch)?;
        ids.truncate(MAX_BEST_STORIES);
        let requested = ids.len();
        info!(requested, "Refresh cycle starting");

        let pass = fetch_stories(&self.fetcher, &self.limiter, &ids, self.max_in_flight).await?;
        let mut stories = pass.stories;
        let recovered =
            recover_failures(&self.fetcher, &self.limiter, pass.failed, self.max_in_flight)
                .await?;
        stories.extend(recovered);

        let published = stories.len();
        self.store.publish(stories);
        info!(
            requested,
            published,
            dropped = requested - published,
            admitted_total = self.limiter.admitted(),
            rejected_total = self.limiter.rejected(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Refresh cycle complete"
        );
        Ok(())
    }
}
