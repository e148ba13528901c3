//! # Trending Crate
//!
//! Client-local state for the site: the watchlist, the log of watchlist
//! events, and the trending ranking computed from it.
//!
//! ## Main Components
//!
//! - **storage**: `Storage` trait with in-memory and per-key file backends
//! - **events**: Watchlist events and the bounded `EventLog`
//! - **tracker**: `TrendingTracker`, ranking and watching counts
//! - **watchlist**: `Watchlist` add/remove/toggle
//! - **error**: Error types for storage writes

pub mod error;
pub mod storage;
pub mod events;
pub mod tracker;
pub mod watchlist;

pub use error::{Result, StorageError};
pub use storage::{
    FileStorage, MemoryStorage, Storage, EVENTS_KEY, TRENDING_CACHE_KEY, WATCHLIST_KEY,
};
pub use events::{EventLog, TrendingEvent, WatchAction};
pub use tracker::{rank_trending, TrendingConfig, TrendingTracker};
pub use watchlist::Watchlist;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TrendingConfig::default();
        assert_eq!(config.trending_window, chrono::Duration::days(7));
        assert_eq!(config.retention, chrono::Duration::days(30));
        assert_eq!(config.cache_ttl, chrono::Duration::hours(1));
        assert_eq!(config.max_events, 1000);
        assert_eq!(config.trending_threshold, 10);
    }
}
