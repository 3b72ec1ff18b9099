//! Shared handle to the most recently published story snapshot.

use crate::types::Story;
use arc_swap::ArcSwap;
use std::sync::Arc;

/// Holds the story set most recently published by the refresh loop.
///
/// Readers take the current snapshot with a single atomic pointer load and
/// keep it alive through the returned `Arc`; publishing swaps the pointer
/// and never waits for readers. A published snapshot is immutable — a new
/// cycle replaces the whole collection rather than editing it in place.
pub struct SnapshotStore {
    current: ArcSwap<Vec<Story>>,
}

impl SnapshotStore {
    /// Creates a store holding the empty initial snapshot.
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(Vec::new()),
        }
    }

    /// Returns the latest published snapshot without blocking.
    pub fn current(&self) -> Arc<Vec<Story>> {
        self.current.load_full()
    }

    /// Atomically replaces the current snapshot. Readers still holding the
    /// previous one keep it until they drop their `Arc`.
    pub fn publish(&self, stories: Vec<Story>) {
        self.current.store(Arc::new(stories));
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn story(title: &str, score: u32) -> Story {
        Story {
            title: title.to_string(),
            url: None,
            by: "someone".to_string(),
            time: 1_700_000_000,
            score,
            descendants: 0,
        }
    }

    #[test]
    fn starts_with_an_empty_snapshot() {
        let store = SnapshotStore::new();
        assert!(store.current().is_empty());
    }

    #[test]
    fn publish_replaces_rather_than_merges() {
        let store = SnapshotStore::new();
        store.publish(vec![story("first", 1), story("second", 2)]);
        store.publish(vec![story("third", 3)]);

        let snapshot = store.current();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].title, "third");
    }

    #[test]
    fn old_snapshot_stays_valid_for_holders_after_publish() {
        let store = SnapshotStore::new();
        store.publish(vec![story("old", 1)]);

        let held = store.current();
        store.publish(vec![story("new", 2), story("newer", 3)]);

        assert_eq!(held.len(), 1);
        assert_eq!(held[0].title, "old");
        assert_eq!(store.current().len(), 2);
    }

    #[test]
    fn readers_only_ever_observe_whole_snapshots() {
        let store = Arc::new(SnapshotStore::new());

        let writer = {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                for i in 0..1_000u32 {
                    let size = if i % 2 == 0 { 2 } else { 5 };
                    let stories = (0..size).map(|j| story(&format!("s{j}"), j)).collect();
                    store.publish(stories);
                }
            })
        };
        let reader = {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                for _ in 0..1_000 {
                    let len = store.current().len();
                    assert!(
                        len == 0 || len == 2 || len == 5,
                        "observed a torn snapshot of {len} stories"
                    );
                }
            })
        };

        writer.join().unwrap();
        reader.join().unwrap();
    }
}
