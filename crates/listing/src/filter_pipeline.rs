//! The FilterPipeline chains filters in insertion order.

use crate::filters::{GenreFilter, MinimumRatingFilter, StatusFilter, StudioFilter, TitleSearchFilter};
use crate::query::ListingQuery;
use crate::traits::Filter;
use anyhow::Result;
use data_loader::Anime;

/// ## Usage
/// ```ignore
/// let pipeline = FilterPipeline::new()
///     .add_filter(GenreFilter)
///     .add_filter(MinimumRatingFilter::new(RatingKey::Visual, 7.0));
///
/// let filtered = pipeline.apply(anime, &query)?;
/// ```
pub struct FilterPipeline {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterPipeline {
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Pipeline with one filter per populated query field
    pub fn for_query(query: &ListingQuery) -> Self {
        let mut pipeline = Self::new();
        if query.search.as_deref().is_some_and(|s| !s.trim().is_empty()) {
            pipeline = pipeline.add_filter(TitleSearchFilter);
        }
        if !query.genres.is_empty() {
            pipeline = pipeline.add_filter(GenreFilter);
        }
        if query.status.is_some() {
            pipeline = pipeline.add_filter(StatusFilter);
        }
        if query.studio.is_some() {
            pipeline = pipeline.add_filter(StudioFilter);
        }
        if let Some(threshold) = query.min_rating {
            pipeline = pipeline.add_filter(MinimumRatingFilter::new(threshold.key, threshold.min));
        }
        pipeline
    }

    pub fn add_filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Apply all filters in sequence, stopping at the first error
    pub fn apply(&self, anime: Vec<Anime>, query: &ListingQuery) -> Result<Vec<Anime>> {
        let mut current = anime;
        for filter in &self.filters {
            tracing::debug!(
                "Applying filter: {} (input count: {})",
                filter.name(),
                current.len()
            );
            current = filter.apply(current, query)?;
            tracing::debug!(
                "Filter applied: {} (output count: {})",
                filter.name(),
                current.len()
            );
        }
        Ok(current)
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}
