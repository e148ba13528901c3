//! The catalog facade used by page code.
//!
//! `AnimeCatalog` owns the parsed anime list behind a TTL cache. A cache
//! miss re-reads both sheets from disk; a hit hands out the shared
//! `Arc<Vec<Anime>>`. The fill runs while the cache lock is held, so
//! concurrent misses wait for one load instead of each parsing the files.

use crate::clock::{Clock, SystemClock};
use crate::parser::transform_anime_row;
use crate::reader::{read_csv, CsvBatch, LoadReport};
use crate::reviews::{load_reviews_index, ReviewsIndex};
use crate::types::{Anime, AnimeId, RatingKey};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, instrument, warn};

pub const DEFAULT_ANIME_FILE: &str = "anime.csv";
pub const DEFAULT_REVIEWS_FILE: &str = "reviews.csv";
pub const DEFAULT_CACHE_TTL_SECS: i64 = 5 * 60;

// =============================================================================
// Configuration
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogConfig {
    pub anime_csv: PathBuf,
    /// `None` disables the reviews join
    pub reviews_csv: Option<PathBuf>,
    pub cache_ttl: Duration,
}

impl CatalogConfig {
    pub fn new(anime_csv: impl Into<PathBuf>) -> Self {
        Self {
            anime_csv: anime_csv.into(),
            reviews_csv: None,
            cache_ttl: Duration::seconds(DEFAULT_CACHE_TTL_SECS),
        }
    }

    /// `<dir>/anime.csv` joined with `<dir>/reviews.csv`
    pub fn from_data_dir(dir: &Path) -> Self {
        Self::new(dir.join(DEFAULT_ANIME_FILE)).with_reviews_csv(dir.join(DEFAULT_REVIEWS_FILE))
    }

    pub fn with_reviews_csv(mut self, path: impl Into<PathBuf>) -> Self {
        self.reviews_csv = Some(path.into());
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self::from_data_dir(Path::new("data"))
    }
}

// =============================================================================
// Load report
// =============================================================================

/// What the most recent load saw
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CatalogReport {
    pub loaded_at: Option<DateTime<Utc>>,
    pub anime: LoadReport,
    pub reviews: Option<LoadReport>,
    /// Titles present in the reviews sheet that matched no anime row
    pub orphan_review_titles: Vec<String>,
}

impl CatalogReport {
    pub fn warning_count(&self) -> usize {
        self.anime.warning_count()
            + self.reviews.as_ref().map_or(0, LoadReport::warning_count)
            + self.orphan_review_titles.len()
    }

    pub fn skipped_rows(&self) -> usize {
        self.anime.rows_skipped + self.reviews.as_ref().map_or(0, |r| r.rows_skipped)
    }
}

// =============================================================================
// Joining
// =============================================================================

/// Number the parsed anime rows from 1 and merge in reviews-sheet metadata
/// by exact title
pub fn join_reviews(batch: CsvBatch<Anime>, reviews: Option<&ReviewsIndex>) -> (Vec<Anime>, CatalogReport) {
    let CsvBatch { mut records, report } = batch;

    for (idx, anime) in records.iter_mut().enumerate() {
        anime.id = (idx + 1) as AnimeId;
        if let Some(meta) = reviews.and_then(|index| index.get(&anime.title)) {
            anime.merge_metadata(meta);
        }
    }

    let orphan_review_titles: Vec<String> = match reviews {
        Some(index) => {
            let known: HashSet<&str> = records.iter().map(|a| a.title.as_str()).collect();
            index
                .titles()
                .filter(|title| !known.contains(title))
                .map(str::to_string)
                .collect()
        }
        None => Vec::new(),
    };
    if !orphan_review_titles.is_empty() {
        warn!(
            count = orphan_review_titles.len(),
            "reviews sheet has titles with no matching anime row"
        );
    }

    let report = CatalogReport {
        loaded_at: None,
        anime: report,
        reviews: reviews.map(|index| index.report().clone()),
        orphan_review_titles,
    };
    (records, report)
}

/// Sort in place by descending rating on `key`. The sort is stable, so
/// equal ratings keep their load order.
pub fn sort_by_rating(anime: &mut [Anime], key: RatingKey) {
    anime.sort_by(|a, b| b.ratings.get(key).total_cmp(&a.ratings.get(key)));
}

// =============================================================================
// Catalog
// =============================================================================

struct CacheEntry {
    anime: Arc<Vec<Anime>>,
    loaded_at: DateTime<Utc>,
}

pub struct AnimeCatalog {
    config: CatalogConfig,
    clock: Arc<dyn Clock>,
    cache: Mutex<Option<CacheEntry>>,
    report: Mutex<Option<CatalogReport>>,
    loads: AtomicUsize,
}

impl AnimeCatalog {
    pub fn new(config: CatalogConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: CatalogConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            cache: Mutex::new(None),
            report: Mutex::new(None),
            loads: AtomicUsize::new(0),
        }
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Every anime, from cache when the cached copy is younger than the TTL.
    ///
    /// ## Algorithm
    /// 1. Take the cache lock
    /// 2. Serve the cached list if it was loaded at or before now and within the TTL
    /// 3. Otherwise read both sheets, join them and store the result
    ///
    /// # Returns
    /// The shared list in load order. An unreadable anime sheet yields an
    /// empty list.
    pub fn get_all_anime(&self) -> Arc<Vec<Anime>> {
        let mut cache = lock(&self.cache);
        let now = self.clock.now();

        if let Some(entry) = cache.as_ref() {
            // a load stamped in the future (clock moved back) counts as stale
            if entry.loaded_at <= now && now - entry.loaded_at < self.config.cache_ttl {
                return Arc::clone(&entry.anime);
            }
            debug!("catalog cache expired");
        }

        let (anime, mut report) = self.load_from_disk();
        report.loaded_at = Some(now);
        let anime = Arc::new(anime);
        *cache = Some(CacheEntry {
            anime: Arc::clone(&anime),
            loaded_at: now,
        });
        *lock(&self.report) = Some(report);
        anime
    }

    /// Linear scan over the cached list
    pub fn get_anime_by_id(&self, id: AnimeId) -> Option<Anime> {
        self.get_all_anime().iter().find(|a| a.id == id).cloned()
    }

    /// Case-insensitive substring match on the title. Surrounding
    /// whitespace in `query` is ignored; a blank query matches everything.
    pub fn search_anime(&self, query: &str) -> Vec<Anime> {
        let needle = query.trim().to_lowercase();
        self.get_all_anime()
            .iter()
            .filter(|a| a.title.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    /// The `limit` best entries on `key`, best first.
    ///
    /// # Arguments
    /// * `limit` - Maximum number of entries
    /// * `key` - Rating to rank by
    ///
    /// # Returns
    /// A fresh vec; the cached list keeps its load order. Equal ratings
    /// keep load order too.
    pub fn get_top_rated(&self, limit: usize, key: RatingKey) -> Vec<Anime> {
        let mut sorted = self.get_all_anime_sorted(key);
        sorted.truncate(limit);
        sorted
    }

    /// Every anime, best first on `key`, ties in load order
    pub fn get_all_anime_sorted(&self, key: RatingKey) -> Vec<Anime> {
        let mut sorted = self.get_all_anime().as_ref().clone();
        sort_by_rating(&mut sorted, key);
        sorted
    }

    /// Drop the cached list so the next call re-reads the files
    pub fn clear_cache(&self) {
        *lock(&self.cache) = None;
        debug!("catalog cache cleared");
    }

    /// Number of times the sheets have been read from disk
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn last_report(&self) -> Option<CatalogReport> {
        lock(&self.report).clone()
    }

    #[instrument(skip(self), fields(anime_csv = %self.config.anime_csv.display()))]
    fn load_from_disk(&self) -> (Vec<Anime>, CatalogReport) {
        self.loads.fetch_add(1, Ordering::SeqCst);

        let (batch, reviews) = rayon::join(
            || read_csv(&self.config.anime_csv, transform_anime_row),
            || self.config.reviews_csv.as_deref().map(load_reviews_index),
        );

        let (anime, report) = join_reviews(batch, reviews.as_ref());
        info!(
            anime = anime.len(),
            skipped = report.skipped_rows(),
            warnings = report.warning_count(),
            "loaded anime catalog"
        );
        (anime, report)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
