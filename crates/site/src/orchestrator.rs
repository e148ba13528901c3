//! # Page Orchestrator
//!
//! Assembles the data each page needs from the catalog, the listing
//! filters, related-anime ranking and the trending tracker. Catalog and
//! storage access is blocking, so each part runs on `spawn_blocking` and
//! independent parts of a page run together under `tokio::join!`.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{info, instrument, warn};

use data_loader::{Anime, AnimeCatalog, AnimeId, CatalogReport, RatingKey};
use listing::{Listing, ListingQuery};
use recommend::{RelatedAnimeFinder, SimilarAnime, SimilarityWeights};
use trending::{TrendingTracker, Watchlist};

/// Default number of related anime on a detail page
pub const DEFAULT_RELATED_LIMIT: usize = 6;

/// A trending entry resolved to its catalog record
#[derive(Debug, Clone, PartialEq)]
pub struct TrendingEntry {
    pub anime: Anime,
    pub watching: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HomePage {
    /// Top by site score
    pub top_rated: Vec<Anime>,
    /// Top by each category score, in `CATEGORY_KEYS` order
    pub top_by_category: Vec<(RatingKey, Vec<Anime>)>,
    pub trending: Vec<TrendingEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimeDetail {
    pub anime: Anime,
    pub related: Vec<SimilarAnime>,
    pub watching_count: u32,
    pub is_trending: bool,
}

/// Category rankings shown on the home page
pub const CATEGORY_KEYS: [RatingKey; 4] = [
    RatingKey::Visual,
    RatingKey::Music,
    RatingKey::Story,
    RatingKey::Character,
];

/// Run blocking work off the async runtime
async fn blocking<T, F>(label: &'static str, work: F) -> Result<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .with_context(|| format!("{label} task panicked"))
}

/// Resolve trending ids against the catalog, best first, at most `limit`.
/// Ids no longer in the catalog are dropped before the limit applies.
fn resolve_trending(
    catalog: &AnimeCatalog,
    tracker: &TrendingTracker,
    limit: usize,
) -> Vec<TrendingEntry> {
    let ids = tracker.calculate_trending(usize::MAX);
    let all = catalog.get_all_anime();
    ids.into_iter()
        .filter_map(|id| match all.iter().find(|a| a.id == id) {
            Some(anime) => Some(TrendingEntry {
                anime: anime.clone(),
                watching: tracker.get_watching_count(id),
            }),
            None => {
                warn!(anime_id = id, "trending id not in catalog");
                None
            }
        })
        .take(limit)
        .collect()
}

#[derive(Clone)]
pub struct SiteOrchestrator {
    catalog: Arc<AnimeCatalog>,
    related: Arc<RelatedAnimeFinder>,
    tracker: Arc<TrendingTracker>,
    watchlist: Arc<Watchlist>,
    related_limit: usize,
}

impl SiteOrchestrator {
    pub fn new(catalog: Arc<AnimeCatalog>, tracker: Arc<TrendingTracker>) -> Self {
        let related = Arc::new(RelatedAnimeFinder::new(catalog.clone()));
        let watchlist = Arc::new(Watchlist::new(tracker.clone()));
        Self {
            catalog,
            related,
            tracker,
            watchlist,
            related_limit: DEFAULT_RELATED_LIMIT,
        }
    }

    pub fn with_similarity_weights(mut self, weights: SimilarityWeights) -> Self {
        self.related = Arc::new(RelatedAnimeFinder::new(self.catalog.clone()).with_weights(weights));
        self
    }

    pub fn with_related_limit(mut self, limit: usize) -> Self {
        self.related_limit = limit;
        self
    }

    pub fn catalog(&self) -> &Arc<AnimeCatalog> {
        &self.catalog
    }

    pub fn tracker(&self) -> &Arc<TrendingTracker> {
        &self.tracker
    }

    /// Watchlist sharing the tracker's storage
    pub fn watchlist(&self) -> &Arc<Watchlist> {
        &self.watchlist
    }

    #[instrument(skip(self))]
    pub async fn top_rated(&self, limit: usize, key: RatingKey) -> Result<Vec<Anime>> {
        let catalog = self.catalog.clone();
        blocking("top rated", move || catalog.get_top_rated(limit, key)).await
    }

    /// The whole catalog, best first on `key`
    #[instrument(skip(self))]
    pub async fn all_sorted(&self, key: RatingKey) -> Result<Vec<Anime>> {
        let catalog = self.catalog.clone();
        blocking("sorted catalog", move || catalog.get_all_anime_sorted(key)).await
    }

    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Vec<Anime>> {
        let catalog = self.catalog.clone();
        let query = query.to_string();
        blocking("search", move || catalog.search_anime(&query)).await
    }

    /// Put a known anime on the watchlist.
    ///
    /// # Returns
    /// `None` for an id not in the catalog, otherwise the record and
    /// whether the list changed
    #[instrument(skip(self))]
    pub async fn add_to_watchlist(&self, anime_id: AnimeId) -> Result<Option<(Anime, bool)>> {
        let catalog = self.catalog.clone();
        let watchlist = self.watchlist.clone();
        blocking("watchlist add", move || {
            let anime = catalog.get_anime_by_id(anime_id)?;
            let added = watchlist.add(anime_id);
            Some((anime, added))
        })
        .await
    }

    /// Returns false if the id was not on the list
    #[instrument(skip(self))]
    pub async fn remove_from_watchlist(&self, anime_id: AnimeId) -> Result<bool> {
        let watchlist = self.watchlist.clone();
        blocking("watchlist remove", move || watchlist.remove(anime_id)).await
    }

    /// Watchlist ids in insertion order with their catalog record, if any
    #[instrument(skip(self))]
    pub async fn watchlist_entries(&self) -> Result<Vec<(AnimeId, Option<Anime>)>> {
        let catalog = self.catalog.clone();
        let watchlist = self.watchlist.clone();
        blocking("watchlist", move || {
            let all = catalog.get_all_anime();
            watchlist
                .list()
                .into_iter()
                .map(|id| (id, all.iter().find(|a| a.id == id).cloned()))
                .collect()
        })
        .await
    }

    /// Top rated overall, top per category and trending, `limit` each
    #[instrument(skip(self))]
    pub async fn home_page(&self, limit: usize) -> Result<HomePage> {
        let start_time = Instant::now();

        let (top_rated, top_by_category, trending) = tokio::join!(
            blocking("top rated", {
                let catalog = self.catalog.clone();
                move || catalog.get_top_rated(limit, RatingKey::Site)
            }),
            blocking("category rankings", {
                let catalog = self.catalog.clone();
                move || {
                    CATEGORY_KEYS
                        .iter()
                        .map(|&key| (key, catalog.get_top_rated(limit, key)))
                        .collect::<Vec<_>>()
                }
            }),
            blocking("trending", {
                let catalog = self.catalog.clone();
                let tracker = self.tracker.clone();
                move || resolve_trending(&catalog, &tracker, limit)
            })
        );

        let page = HomePage {
            top_rated: top_rated?,
            top_by_category: top_by_category?,
            trending: trending?,
        };
        info!(
            "Built home page: {} top rated, {} trending in {:.2?}",
            page.top_rated.len(),
            page.trending.len(),
            start_time.elapsed()
        );
        Ok(page)
    }

    /// Detail page data; `None` for an unknown id
    #[instrument(skip(self))]
    pub async fn anime_detail(&self, anime_id: AnimeId) -> Result<Option<AnimeDetail>> {
        let catalog = self.catalog.clone();
        let Some(anime) = blocking("anime lookup", move || catalog.get_anime_by_id(anime_id)).await?
        else {
            info!("No anime with id {}", anime_id);
            return Ok(None);
        };

        let limit = self.related_limit;
        let (related, watching_count, is_trending) = tokio::join!(
            blocking("related anime", {
                let finder = self.related.clone();
                move || finder.get_similar(anime_id, limit)
            }),
            blocking("watching count", {
                let tracker = self.tracker.clone();
                move || tracker.get_watching_count(anime_id)
            }),
            blocking("trending flag", {
                let tracker = self.tracker.clone();
                move || tracker.is_trending(anime_id)
            })
        );

        Ok(Some(AnimeDetail {
            anime,
            related: related?,
            watching_count: watching_count?,
            is_trending: is_trending?,
        }))
    }

    #[instrument(skip(self))]
    pub async fn browse(&self, query: ListingQuery) -> Result<Listing> {
        let catalog = self.catalog.clone();
        let listing = blocking("browse", move || {
            listing::browse(&catalog.get_all_anime(), &query)
        })
        .await?
        .context("Failed to build listing")?;
        info!("Browse matched {} anime", listing.total);
        Ok(listing)
    }

    #[instrument(skip(self))]
    pub async fn trending(&self, limit: usize) -> Result<Vec<TrendingEntry>> {
        let catalog = self.catalog.clone();
        let tracker = self.tracker.clone();
        blocking("trending", move || resolve_trending(&catalog, &tracker, limit)).await
    }

    /// Drop the catalog cache, reload both sheets and return the load report
    #[instrument(skip(self))]
    pub async fn reload(&self) -> Result<CatalogReport> {
        let catalog = self.catalog.clone();
        let report = blocking("reload", move || {
            catalog.clear_cache();
            catalog.get_all_anime();
            catalog.last_report()
        })
        .await?
        .context("Catalog produced no load report")?;
        info!(
            "Reloaded catalog: {} kept, {} skipped, {} warnings",
            report.anime.rows_kept,
            report.skipped_rows(),
            report.warning_count()
        );
        Ok(report)
    }
}
