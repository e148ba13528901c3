//! Filtered, sorted and paged listings.

use crate::filter_pipeline::FilterPipeline;
use crate::query::ListingQuery;
use anyhow::Result;
use data_loader::{sort_by_rating, Anime};
use tracing::instrument;

/// One page of a browse result
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub items: Vec<Anime>,
    /// Matches before paging
    pub total: usize,
    pub offset: usize,
}

impl Listing {
    pub fn has_more(&self) -> bool {
        self.offset + self.items.len() < self.total
    }
}

/// Build one page of a filtered listing.
///
/// ## Algorithm
/// 1. Run the query's filters in order (genre, status, rating, studio, title)
/// 2. Stable sort, descending, on the query's rating key
/// 3. Skip `offset`, take `limit`
///
/// # Arguments
/// * `anime` - The full catalog, in load order
/// * `query` - Filters, sort key and page
///
/// # Returns
/// * `Ok(Listing)` - The page plus the match count before paging
/// * `Err` - If the query is invalid, e.g. a minimum rating outside 0-10
#[instrument(skip(anime), fields(input = anime.len()))]
pub fn browse(anime: &[Anime], query: &ListingQuery) -> Result<Listing> {
    let mut matches = FilterPipeline::for_query(query).apply(anime.to_vec(), query)?;
    sort_by_rating(&mut matches, query.sort_by);

    let total = matches.len();
    let items: Vec<Anime> = matches
        .into_iter()
        .skip(query.offset)
        .take(query.limit.unwrap_or(usize::MAX))
        .collect();
    tracing::debug!(total, returned = items.len(), "browse complete");

    Ok(Listing {
        items,
        total,
        offset: query.offset,
    })
}
