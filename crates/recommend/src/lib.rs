//! # Recommend Crate
//!
//! "Related anime" for detail pages: other records ranked by weighted
//! overlap of genres, themes, demographics and studios.
//!
//! ## Example Usage
//!
//! ```ignore
//! use recommend::RelatedAnimeFinder;
//! use std::sync::Arc;
//!
//! let finder = RelatedAnimeFinder::new(Arc::clone(&catalog));
//! for related in finder.get_similar(anime_id, 6) {
//!     println!("{} ({:.1})", related.anime.title, related.score);
//! }
//! ```

pub mod related;

pub use related::{rank_related, similarity, RelatedAnimeFinder, SimilarAnime, SimilarityWeights};

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{AnimeCatalog, CatalogConfig};
    use std::sync::Arc;

    const SHEET: &str = "\
franchise_root_title,music_score,visual_score,story_score,character_score,site_score,genres,themes,studios
Alpha,1,1,1,1,6,\"Action, Sci-Fi\",Mecha,Sunrise
Beta,1,1,1,1,7,Action,Mecha,Trigger
Gamma,1,1,1,1,9,Sci-Fi,,Sunrise
Delta,1,1,1,1,8,Slice of Life,,Kyoto Animation
";

    fn finder() -> (tempfile::TempDir, RelatedAnimeFinder) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anime.csv");
        std::fs::write(&path, SHEET).unwrap();
        let catalog = Arc::new(AnimeCatalog::new(CatalogConfig::new(path)));
        (dir, RelatedAnimeFinder::new(catalog))
    }

    #[test]
    fn test_get_similar_from_catalog() {
        let (_dir, finder) = finder();
        let related = finder.get_similar(1, 5);
        let titles: Vec<_> = related.iter().map(|r| r.anime.title.as_str()).collect();
        // Beta: genre + theme = 5.0; Gamma: genre + studio = 4.5; Delta shares nothing
        assert_eq!(titles, vec!["Beta", "Gamma"]);
    }

    #[test]
    fn test_custom_weights_change_order() {
        let (_dir, finder) = finder();
        let finder = finder.with_weights(SimilarityWeights {
            studios: 5.0,
            ..SimilarityWeights::default()
        });
        let related = finder.get_similar(1, 5);
        assert_eq!(related[0].anime.title, "Gamma");
    }

    #[test]
    fn test_unknown_id_is_empty() {
        let (_dir, finder) = finder();
        assert!(finder.get_similar(42, 5).is_empty());
    }
}
