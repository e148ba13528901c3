//! Core trait for the listing pipeline.

use crate::query::ListingQuery;
use anyhow::Result;
use data_loader::Anime;

/// A single narrowing step over catalog records.
///
/// Filters take ownership of the records and return the ones that pass,
/// preserving input order.
pub trait Filter: Send + Sync {
    /// Returns the name of this filter (for logging/debugging)
    fn name(&self) -> &str;

    fn apply(&self, anime: Vec<Anime>, query: &ListingQuery) -> Result<Vec<Anime>>;
}
