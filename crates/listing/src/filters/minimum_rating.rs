//! Filter to enforce a minimum score on one rating axis.

use crate::query::ListingQuery;
use crate::traits::Filter;
use anyhow::{bail, Result};
use data_loader::{Anime, RatingKey, Ratings};

/// Removes records whose `key` rating is below `min_rating`.
pub struct MinimumRatingFilter {
    key: RatingKey,
    min_rating: f32,
}

impl MinimumRatingFilter {
    /// * `key` - Which rating to compare
    /// * `min_rating` - Inclusive lower bound on the 0-10 scale
    pub fn new(key: RatingKey, min_rating: f32) -> Self {
        Self { key, min_rating }
    }
}

impl Filter for MinimumRatingFilter {
    fn name(&self) -> &str {
        "MinimumRatingFilter"
    }

    fn apply(&self, anime: Vec<Anime>, _query: &ListingQuery) -> Result<Vec<Anime>> {
        if !(Ratings::MIN..=Ratings::MAX).contains(&self.min_rating) {
            bail!(
                "minimum {} rating must be between {} and {}, got {}",
                self.key,
                Ratings::MIN,
                Ratings::MAX,
                self.min_rating
            );
        }
        Ok(anime
            .into_iter()
            .filter(|a| a.ratings.get(self.key) >= self.min_rating)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rated(id: u32, visual: f32) -> Anime {
        Anime::new(
            id,
            format!("Anime {id}"),
            Ratings {
                visual,
                ..Ratings::default()
            },
        )
    }

    #[test]
    fn test_minimum_rating_filter_is_inclusive() {
        let filter = MinimumRatingFilter::new(RatingKey::Visual, 7.0);
        let filtered = filter
            .apply(vec![rated(1, 9.0), rated(2, 7.0), rated(3, 6.9)], &ListingQuery::new())
            .unwrap();
        let ids: Vec<_> = filtered.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_out_of_scale_threshold_is_an_error() {
        let filter = MinimumRatingFilter::new(RatingKey::Site, 11.0);
        assert!(filter.apply(vec![rated(1, 5.0)], &ListingQuery::new()).is_err());
    }
}
