//! Browsable listings over the anime catalog.
//!
//! This crate provides:
//! - Filter trait and implementations for narrowing catalog records
//! - FilterPipeline for composing filters
//! - `browse`, which filters, sorts by a rating key and pages
//!
//! ## Example Usage
//! ```ignore
//! use listing::{browse, ListingQuery};
//! use data_loader::{AnimeStatus, RatingKey};
//!
//! let query = ListingQuery::new()
//!     .with_genre("Action")
//!     .with_status(AnimeStatus::Ongoing)
//!     .sorted_by(RatingKey::Visual)
//!     .with_page(0, 20);
//!
//! let page = browse(&catalog.get_all_anime(), &query)?;
//! ```

pub mod traits;
pub mod query;
pub mod filters;
pub mod filter_pipeline;
pub mod browse;

pub use traits::Filter;
pub use query::{ListingQuery, RatingThreshold};
pub use filter_pipeline::FilterPipeline;
pub use browse::{browse, Listing};
