//! The persisted watchlist. Adding or removing an entry records the
//! matching trending event.

use crate::events::WatchAction;
use crate::storage::{read_json, write_json, WATCHLIST_KEY};
use crate::tracker::TrendingTracker;
use data_loader::AnimeId;
use std::sync::{Arc, Mutex};
use tracing::info;

pub struct Watchlist {
    tracker: Arc<TrendingTracker>,
    write_lock: Mutex<()>,
}

impl Watchlist {
    /// Shares the tracker's storage
    pub fn new(tracker: Arc<TrendingTracker>) -> Self {
        Self {
            tracker,
            write_lock: Mutex::new(()),
        }
    }

    pub fn tracker(&self) -> &Arc<TrendingTracker> {
        &self.tracker
    }

    /// Ids in insertion order
    pub fn list(&self) -> Vec<AnimeId> {
        self.tracker
            .storage()
            .and_then(|storage| read_json(storage.as_ref(), WATCHLIST_KEY))
            .unwrap_or_default()
    }

    pub fn contains(&self, anime_id: AnimeId) -> bool {
        self.list().contains(&anime_id)
    }

    pub fn len(&self) -> usize {
        self.list().len()
    }

    pub fn is_empty(&self) -> bool {
        self.list().is_empty()
    }

    /// Returns false if the id was already present
    pub fn add(&self, anime_id: AnimeId) -> bool {
        self.update(anime_id, WatchAction::Add)
    }

    /// Returns false if the id was not present
    pub fn remove(&self, anime_id: AnimeId) -> bool {
        self.update(anime_id, WatchAction::Remove)
    }

    /// Flip membership; returns whether the id is now on the list
    pub fn toggle(&self, anime_id: AnimeId) -> bool {
        if self.contains(anime_id) {
            self.remove(anime_id);
            false
        } else {
            self.add(anime_id)
        }
    }

    fn update(&self, anime_id: AnimeId, action: WatchAction) -> bool {
        let Some(storage) = self.tracker.storage() else {
            return false;
        };
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());

        let mut ids = self.list();
        let changed = match action {
            WatchAction::Add if !ids.contains(&anime_id) => {
                ids.push(anime_id);
                true
            }
            WatchAction::Remove if ids.contains(&anime_id) => {
                ids.retain(|id| *id != anime_id);
                true
            }
            _ => false,
        };

        if changed {
            write_json(storage.as_ref(), WATCHLIST_KEY, &ids);
            self.tracker.track_event(anime_id, action);
            info!(anime_id, ?action, size = ids.len(), "watchlist updated");
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStorage, Storage};

    fn watchlist() -> Watchlist {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        Watchlist::new(Arc::new(TrendingTracker::new(Some(storage))))
    }

    #[test]
    fn test_add_and_remove() {
        let list = watchlist();
        assert!(list.add(1));
        assert!(list.add(2));
        assert!(!list.add(1));
        assert_eq!(list.list(), vec![1, 2]);

        assert!(list.remove(1));
        assert!(!list.remove(1));
        assert_eq!(list.list(), vec![2]);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_toggle_records_events() {
        let list = watchlist();
        assert!(list.toggle(4));
        assert!(list.contains(4));
        assert_eq!(list.tracker().get_watching_count(4), 1);

        assert!(!list.toggle(4));
        assert!(list.is_empty());
        assert_eq!(list.tracker().get_watching_count(4), 0);
    }

    #[test]
    fn test_duplicate_add_records_no_event() {
        let list = watchlist();
        list.add(9);
        list.add(9);
        assert_eq!(list.tracker().get_watching_count(9), 1);
    }

    #[test]
    fn test_without_storage_is_noop() {
        let list = Watchlist::new(Arc::new(TrendingTracker::new(None)));
        assert!(!list.add(1));
        assert!(list.is_empty());
    }
}
