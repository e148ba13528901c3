//! Watchlist and trending state persisted under a state directory.

use chrono::Duration;
use data_loader::ManualClock;
use std::sync::Arc;
use trending::{FileStorage, Storage, TrendingTracker, Watchlist, EVENTS_KEY};

fn open(dir: &std::path::Path, clock: Arc<ManualClock>) -> Watchlist {
    let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(dir));
    Watchlist::new(Arc::new(TrendingTracker::new(Some(storage)).with_clock(clock)))
}

#[test]
fn test_state_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let clock = Arc::new(ManualClock::default());

    {
        let list = open(dir.path(), clock.clone());
        list.add(1);
        list.add(2);
        list.add(2);
        list.remove(1);
    }

    let list = open(dir.path(), clock.clone());
    assert_eq!(list.list(), vec![2]);
    // one add each at the same instant, lower id first
    assert_eq!(list.tracker().calculate_trending(10), vec![1, 2]);
    assert_eq!(list.tracker().get_watching_count(1), 0);
    assert_eq!(list.tracker().get_watching_count(2), 1);
}

#[test]
fn test_old_adds_drop_out_of_trending() {
    let dir = tempfile::tempdir().unwrap();
    let clock = Arc::new(ManualClock::default());
    let list = open(dir.path(), clock.clone());

    list.add(10);
    clock.advance(Duration::days(8));
    list.add(20);

    let tracker = list.tracker();
    assert_eq!(tracker.calculate_trending(10), vec![20]);
    assert_eq!(tracker.get_watching_count(10), 1);
    assert!(tracker.is_trending(20));
    assert!(!tracker.is_trending(10));
}

#[test]
fn test_corrupt_file_is_treated_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(format!("{EVENTS_KEY}.json")), "not json").unwrap();

    let list = open(dir.path(), Arc::new(ManualClock::default()));
    assert!(list.tracker().calculate_trending(10).is_empty());

    list.add(3);
    assert_eq!(list.tracker().calculate_trending(10), vec![3]);
}
