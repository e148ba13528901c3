//! # Site Crate
//!
//! Page data for the anime review site: home page rankings, detail pages
//! with related anime and watch counts, browse listings and trending.
//!
//! ## Example Usage
//!
//! ```ignore
//! use site::SiteOrchestrator;
//! use std::sync::Arc;
//!
//! let site = SiteOrchestrator::new(catalog, tracker);
//! let home = site.home_page(10).await?;
//! let detail = site.anime_detail(1).await?;
//! ```

pub mod orchestrator;

pub use orchestrator::{
    AnimeDetail, HomePage, SiteOrchestrator, TrendingEntry, CATEGORY_KEYS, DEFAULT_RELATED_LIMIT,
};
