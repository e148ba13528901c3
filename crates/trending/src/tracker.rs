//! Trending ranking over watchlist events.
//!
//! Every watchlist add/remove is appended to a persisted event log. The
//! trending ranking counts `add` events inside a rolling window and is
//! cached in storage for a short period; any new event invalidates it.

use crate::events::{EventLog, TrendingEvent, WatchAction};
use crate::storage::{
    read_json, remove_key, write_json, Storage, EVENTS_KEY, TRENDING_CACHE_KEY,
};
use chrono::{DateTime, Duration, Utc};
use data_loader::{AnimeId, Clock, SystemClock};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, instrument};

#[derive(Debug, Clone)]
pub struct TrendingConfig {
    /// Window in which `add` events count towards trending
    pub trending_window: Duration,
    /// Events older than this are dropped on write
    pub retention: Duration,
    /// How long a computed ranking stays valid
    pub cache_ttl: Duration,
    /// Upper bound on the persisted event log
    pub max_events: usize,
    /// `is_trending` checks membership in this many top entries
    pub trending_threshold: usize,
}

impl Default for TrendingConfig {
    fn default() -> Self {
        Self {
            trending_window: Duration::days(7),
            retention: Duration::days(30),
            cache_ttl: Duration::hours(1),
            max_events: 1000,
            trending_threshold: 10,
        }
    }
}

impl TrendingConfig {
    pub fn with_trending_window(mut self, window: Duration) -> Self {
        self.trending_window = window;
        self
    }

    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_max_events(mut self, max_events: usize) -> Self {
        self.max_events = max_events;
        self
    }

    pub fn with_trending_threshold(mut self, threshold: usize) -> Self {
        self.trending_threshold = threshold;
        self
    }
}

/// Persisted shape of the trending cache
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TrendingCache {
    ranking: Vec<AnimeId>,
    computed_at: DateTime<Utc>,
}

/// Rank ids by number of `add` events at or after `since`.
///
/// Ties go to the id with the most recent add, then the lower id.
pub fn rank_trending<'a>(
    events: impl IntoIterator<Item = &'a TrendingEvent>,
    since: DateTime<Utc>,
) -> Vec<AnimeId> {
    let mut tally: HashMap<AnimeId, (u32, DateTime<Utc>)> = HashMap::new();
    for event in events {
        if event.action != WatchAction::Add || event.timestamp < since {
            continue;
        }
        let entry = tally
            .entry(event.anime_id)
            .or_insert((0, event.timestamp));
        entry.0 += 1;
        entry.1 = entry.1.max(event.timestamp);
    }

    let mut ranked: Vec<_> = tally.into_iter().collect();
    ranked.sort_by(|(id_a, (count_a, last_a)), (id_b, (count_b, last_b))| {
        count_b
            .cmp(count_a)
            .then_with(|| last_b.cmp(last_a))
            .then_with(|| id_a.cmp(id_b))
    });
    ranked.into_iter().map(|(id, _)| id).collect()
}

pub struct TrendingTracker {
    storage: Option<Arc<dyn Storage>>,
    clock: Arc<dyn Clock>,
    config: TrendingConfig,
    // serializes event log writes and trending recomputes
    write_lock: Mutex<()>,
}

impl TrendingTracker {
    /// `None` storage makes every operation a no-op
    pub fn new(storage: Option<Arc<dyn Storage>>) -> Self {
        Self {
            storage,
            clock: Arc::new(SystemClock),
            config: TrendingConfig::default(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_config(mut self, config: TrendingConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &TrendingConfig {
        &self.config
    }

    pub fn is_available(&self) -> bool {
        self.storage.is_some()
    }

    pub(crate) fn storage(&self) -> Option<&Arc<dyn Storage>> {
        self.storage.as_ref()
    }

    fn load_log(&self, storage: &dyn Storage) -> EventLog {
        let events: Vec<TrendingEvent> = read_json(storage, EVENTS_KEY).unwrap_or_default();
        EventLog::from_events(events, self.config.max_events)
    }

    /// Record a watchlist add or remove.
    ///
    /// ## Algorithm
    /// 1. Append the event stamped with the current time
    /// 2. Drop events older than the retention period and cap the log length
    /// 3. Persist the log and invalidate the cached ranking
    ///
    /// # Arguments
    /// * `anime_id` - The anime the event is about
    /// * `action` - Add or remove
    #[instrument(skip(self))]
    pub fn track_event(&self, anime_id: AnimeId, action: WatchAction) {
        let Some(storage) = self.storage.as_deref() else {
            return;
        };
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());

        let now = self.clock.now();
        let mut log = self.load_log(storage);
        log.push(TrendingEvent::new(anime_id, action, now));
        log.prune_before(now - self.config.retention);

        write_json(storage, EVENTS_KEY, &log.to_vec());
        remove_key(storage, TRENDING_CACHE_KEY);
        debug!(events = log.len(), "recorded watchlist event");
    }

    /// Top `limit` trending ids, most trending first.
    ///
    /// ## Algorithm
    /// 1. Serve the cached ranking if it is younger than the cache TTL
    /// 2. Otherwise count `add` events inside the trending window, rank them
    ///    and cache the full ranking
    ///
    /// # Returns
    /// At most `limit` ids; empty without storage
    #[instrument(skip(self))]
    pub fn calculate_trending(&self, limit: usize) -> Vec<AnimeId> {
        let Some(storage) = self.storage.as_deref() else {
            return Vec::new();
        };
        let now = self.clock.now();

        if let Some(cache) = read_json::<TrendingCache>(storage, TRENDING_CACHE_KEY)
            && cache.computed_at <= now
            && now - cache.computed_at < self.config.cache_ttl
        {
            debug!("trending cache hit");
            return cache.ranking.into_iter().take(limit).collect();
        }

        // held until the cache is written so a concurrent event cannot be
        // overwritten by a ranking computed from the older log
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let log = self.load_log(storage);
        let ranking = rank_trending(log.iter(), now - self.config.trending_window);
        debug!(ranked = ranking.len(), "recomputed trending ranking");

        write_json(
            storage,
            TRENDING_CACHE_KEY,
            &TrendingCache {
                ranking: ranking.clone(),
                computed_at: now,
            },
        );
        ranking.into_iter().take(limit).collect()
    }

    /// How many people are watching an anime.
    ///
    /// # Returns
    /// Adds minus removes within the retention window, never below zero
    pub fn get_watching_count(&self, anime_id: AnimeId) -> u32 {
        let Some(storage) = self.storage.as_deref() else {
            return 0;
        };
        let since = self.clock.now() - self.config.retention;

        let net: i64 = self
            .load_log(storage)
            .iter()
            .filter(|e| e.anime_id == anime_id && e.timestamp >= since)
            .map(|e| match e.action {
                WatchAction::Add => 1,
                WatchAction::Remove => -1,
            })
            .sum();
        u32::try_from(net.max(0)).unwrap_or(u32::MAX)
    }

    /// Whether the id is in the top `trending_threshold` of the ranking
    pub fn is_trending(&self, anime_id: AnimeId) -> bool {
        self.calculate_trending(self.config.trending_threshold)
            .contains(&anime_id)
    }

    /// Drop the cached ranking so the next call recomputes it
    pub fn clear_cache(&self) {
        if let Some(storage) = self.storage.as_deref() {
            remove_key(storage, TRENDING_CACHE_KEY);
        }
    }
}
