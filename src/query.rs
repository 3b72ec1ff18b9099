//! Read-side ranking over the published snapshot.

use crate::snapshot_store::SnapshotStore;
use crate::types::{RankedStory, Story};
use tracing::info;

/// Returns the top `n` stories of the current snapshot by descending score,
/// fewer if the snapshot is smaller. Callers validate `n`. An empty
/// snapshot is a normal state (no cycle has published yet) and yields an
/// empty list.
pub fn best_stories(store: &SnapshotStore, n: usize) -> Vec<RankedStory> {
    let snapshot = store.current();
    if snapshot.is_empty() {
        info!("No snapshot published yet; serving an empty story list");
        return Vec::new();
    }

    let mut ranked: Vec<&Story> = snapshot.iter().collect();
    ranked.sort_by(|a, b| b.score.cmp(&a.score));

    ranked.into_iter().take(n).map(RankedStory::from).collect()
}
