//! End-to-end page assembly over a temporary data directory and
//! in-memory state.

use chrono::Duration;
use data_loader::{AnimeCatalog, CatalogConfig, ManualClock, RatingKey};
use listing::ListingQuery;
use site::SiteOrchestrator;
use std::path::Path;
use std::sync::Arc;
use trending::{MemoryStorage, Storage, TrendingTracker, Watchlist};

const ANIME_CSV: &str = "\
franchise_root_title,music_score,visual_score,story_score,character_score,site_score,genres,studios,status
A,3.5,4.0,2.5,3.0,7.0,\"Action, Drama\",MAPPA,completed
B,4.5,3.0,4.5,4.0,9.0,\"Action, Comedy\",Bones,ongoing
C,2.0,5.0,3.5,2.5,5.0,Drama,MAPPA,upcoming
";

const REVIEWS_CSV: &str = "\
franchise_root_title,synopsis,review_username,review_score,review_content
B,Synopsis for B.,reader,9,Great.
";

struct Fixture {
    _dir: tempfile::TempDir,
    site: SiteOrchestrator,
    watchlist: Arc<Watchlist>,
    clock: Arc<ManualClock>,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    write_sheets(dir.path());

    let clock = Arc::new(ManualClock::default());
    let catalog = Arc::new(AnimeCatalog::with_clock(
        CatalogConfig::from_data_dir(dir.path()),
        clock.clone(),
    ));
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    let tracker = Arc::new(TrendingTracker::new(Some(storage)).with_clock(clock.clone()));

    let site = SiteOrchestrator::new(catalog, tracker);
    Fixture {
        _dir: dir,
        watchlist: site.watchlist().clone(),
        site,
        clock,
    }
}

fn write_sheets(dir: &Path) {
    std::fs::write(dir.join("anime.csv"), ANIME_CSV).unwrap();
    std::fs::write(dir.join("reviews.csv"), REVIEWS_CSV).unwrap();
}

fn titles<'a>(anime: impl IntoIterator<Item = &'a data_loader::Anime>) -> Vec<&'a str> {
    anime.into_iter().map(|a| a.title.as_str()).collect()
}

#[tokio::test]
async fn test_home_page() {
    let f = fixture();
    f.watchlist.add(3);

    let home = f.site.home_page(2).await.unwrap();
    assert_eq!(titles(&home.top_rated), vec!["B", "A"]);

    let (key, visual) = &home.top_by_category[0];
    assert_eq!(*key, RatingKey::Visual);
    assert_eq!(titles(visual), vec!["C", "A"]);
    assert_eq!(home.top_by_category.len(), 4);

    assert_eq!(home.trending.len(), 1);
    assert_eq!(home.trending[0].anime.title, "C");
    assert_eq!(home.trending[0].watching, 1);
}

#[tokio::test]
async fn test_anime_detail() {
    let f = fixture();
    f.watchlist.add(2);

    let detail = f.site.anime_detail(2).await.unwrap().unwrap();
    assert_eq!(detail.anime.title, "B");
    assert_eq!(detail.anime.description, "Synopsis for B.");
    assert_eq!(detail.anime.reviews.len(), 1);
    assert_eq!(detail.watching_count, 1);
    assert!(detail.is_trending);
    // only A shares a genre with B
    assert_eq!(titles(detail.related.iter().map(|r| &r.anime)), vec!["A"]);

    assert!(f.site.anime_detail(42).await.unwrap().is_none());
}

#[tokio::test]
async fn test_browse() {
    let f = fixture();
    let listing = f
        .site
        .browse(ListingQuery::new().with_studio("mappa").sorted_by(RatingKey::Visual))
        .await
        .unwrap();
    assert_eq!(titles(&listing.items), vec!["C", "A"]);

    let err = f
        .site
        .browse(ListingQuery::new().with_min_rating(RatingKey::Site, 50.0))
        .await;
    assert!(err.is_err());
}

#[tokio::test]
async fn test_trending_window() {
    let f = fixture();
    f.watchlist.add(1);
    f.clock.advance(Duration::days(8));
    f.watchlist.add(2);

    let trending = f.site.trending(10).await.unwrap();
    assert_eq!(titles(trending.iter().map(|t| &t.anime)), vec!["B"]);

    // ids missing from the catalog are dropped
    f.site.tracker().track_event(99, trending::WatchAction::Add);
    f.site.tracker().track_event(99, trending::WatchAction::Add);
    let trending = f.site.trending(10).await.unwrap();
    assert_eq!(titles(trending.iter().map(|t| &t.anime)), vec!["B"]);
}

#[tokio::test]
async fn test_unknown_trending_ids_do_not_use_up_the_limit() {
    let f = fixture();
    for _ in 0..3 {
        f.site.tracker().track_event(99, trending::WatchAction::Add);
    }
    f.watchlist.add(1);
    f.clock.advance(Duration::seconds(1));
    f.watchlist.add(3);

    // 99 outranks both but is not in the catalog
    let trending = f.site.trending(2).await.unwrap();
    assert_eq!(titles(trending.iter().map(|t| &t.anime)), vec!["C", "A"]);

    let home = f.site.home_page(1).await.unwrap();
    assert_eq!(titles(home.trending.iter().map(|t| &t.anime)), vec!["C"]);
}

#[tokio::test]
async fn test_catalog_queries() {
    let f = fixture();
    let top = f.site.top_rated(2, RatingKey::Story).await.unwrap();
    assert_eq!(titles(&top), vec!["B", "C"]);

    let sorted = f.site.all_sorted(RatingKey::Music).await.unwrap();
    assert_eq!(titles(&sorted), vec!["B", "A", "C"]);

    assert_eq!(titles(&f.site.search(" b ").await.unwrap()), vec!["B"]);
}

#[tokio::test]
async fn test_watchlist_through_site() {
    let f = fixture();
    let (anime, added) = f.site.add_to_watchlist(3).await.unwrap().unwrap();
    assert_eq!(anime.title, "C");
    assert!(added);
    let (_, added) = f.site.add_to_watchlist(3).await.unwrap().unwrap();
    assert!(!added);
    assert!(f.site.add_to_watchlist(42).await.unwrap().is_none());

    // an id that later leaves the catalog still lists, without a record
    f.watchlist.add(77);
    let entries = f.site.watchlist_entries().await.unwrap();
    let ids: Vec<_> = entries.iter().map(|(id, a)| (*id, a.is_some())).collect();
    assert_eq!(ids, vec![(3, true), (77, false)]);
    assert_eq!(f.site.tracker().get_watching_count(3), 1);

    assert!(f.site.remove_from_watchlist(3).await.unwrap());
    assert!(!f.site.remove_from_watchlist(3).await.unwrap());
    assert_eq!(f.site.tracker().get_watching_count(3), 0);
}

#[tokio::test]
async fn test_reload_reports_and_rereads() {
    let f = fixture();
    f.site.home_page(1).await.unwrap();
    let loads = f.site.catalog().load_count();

    let report = f.site.reload().await.unwrap();
    assert_eq!(report.anime.rows_kept, 3);
    assert_eq!(report.skipped_rows(), 0);
    assert!(report.orphan_review_titles.is_empty());
    assert_eq!(f.site.catalog().load_count(), loads + 1);
}
