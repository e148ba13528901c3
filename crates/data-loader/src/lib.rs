//! # Data Loader Crate
//!
//! Loads the anime catalog from its two flat CSV sheets and serves it
//! through a cached facade.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (Anime, Ratings, Review, ReviewMetadata)
//! - **parser**: Row transformers for the anime and reviews sheets
//! - **reader**: Header-driven CSV reader with per-row error reporting
//! - **reviews**: Reviews sheet grouped by franchise title
//! - **catalog**: `AnimeCatalog`, the TTL-cached facade used by pages
//! - **clock**: Injectable time source for cache expiry
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::{AnimeCatalog, CatalogConfig, RatingKey};
//! use std::path::Path;
//!
//! let catalog = AnimeCatalog::new(CatalogConfig::from_data_dir(Path::new("data")));
//!
//! let top = catalog.get_top_rated(10, RatingKey::Visual);
//! let hits = catalog.search_anime("bebop");
//! let one = catalog.get_anime_by_id(1);
//! ```

// Public modules
pub mod error;
pub mod types;
pub mod clock;
pub mod parser;
pub mod reader;
pub mod reviews;
pub mod catalog;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use types::{
    // Type aliases
    AnimeId,
    Title,
    // Core types
    Anime,
    Ratings,
    Review,
    ReviewMetadata,
    // Enums
    AnimeStatus,
    RatingKey,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use reader::{read_csv, parse_csv, CsvBatch, IssueKind, LoadReport, RowIssue};
pub use reviews::{load_reviews_index, parse_reviews_index, ReviewsIndex};
pub use catalog::{sort_by_rating, AnimeCatalog, CatalogConfig, CatalogReport};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_points_at_data_dir() {
        let config = CatalogConfig::default();
        assert!(config.anime_csv.ends_with("anime.csv"));
        assert!(config.reviews_csv.unwrap().ends_with("reviews.csv"));
        assert_eq!(config.cache_ttl, chrono::Duration::minutes(5));
    }

    #[test]
    fn test_empty_reviews_index() {
        let index = ReviewsIndex::new();
        assert!(index.is_empty());
        assert_eq!(index.review_count(), 0);
        assert!(index.get("anything").is_none());
    }
}
