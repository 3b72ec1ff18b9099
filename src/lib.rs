//! In-memory best-stories cache over the Hacker News API.
//!
//! A background loop periodically pulls the best-story id list, fans out
//! detail fetches under a concurrency bound and an outbound rate limit,
//! retries what failed, and atomically publishes the result as the current
//! snapshot. Readers rank and slice that snapshot without taking a lock.

pub mod api;
pub mod config;
pub mod error;
pub mod fan_out;
pub mod query;
pub mod rate_limiter;
pub mod refresher;
pub mod retry;
pub mod snapshot_store;
pub mod story_fetcher;
pub mod types;
