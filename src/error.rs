//! Typed failures for the background refresh pipeline.

use thiserror::Error;

/// Errors that abort an entire refresh cycle.
///
/// Per-story fetch failures never surface here; they are retried and
/// eventually dropped. Anything of this type escaping a cycle stops the
/// refresh loop for good.
#[derive(Debug, Error)]
pub enum RefreshError {
    /// The best-story id list itself could not be fetched.
    #[error("failed to fetch the best-story id list: {0}")]
    ListFetch(anyhow::Error),

    /// A fan-out pass lost track of requests: `stories + failed` must
    /// always equal `requested`.
    #[error("fan-out returned {stories} stories and {failed} failures for {requested} ids")]
    CountMismatch {
        stories: usize,
        failed: usize,
        requested: usize,
    },
}
