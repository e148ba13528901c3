//! Keep records with the requested airing status.

use crate::query::ListingQuery;
use crate::traits::Filter;
use anyhow::Result;
use data_loader::Anime;

pub struct StatusFilter;

impl Filter for StatusFilter {
    fn name(&self) -> &str {
        "StatusFilter"
    }

    fn apply(&self, anime: Vec<Anime>, query: &ListingQuery) -> Result<Vec<Anime>> {
        let Some(status) = query.status else {
            return Ok(anime);
        };
        Ok(anime.into_iter().filter(|a| a.status == status).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::sample;
    use data_loader::AnimeStatus;

    #[test]
    fn test_status_filter() {
        let mut upcoming = sample(2, "Soon");
        upcoming.status = AnimeStatus::Upcoming;
        let input = vec![sample(1, "Done"), upcoming];

        let query = ListingQuery::new().with_status(AnimeStatus::Upcoming);
        let filtered = StatusFilter.apply(input.clone(), &query).unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].title, "Soon");

        // no status requested
        let filtered = StatusFilter.apply(input, &ListingQuery::new()).unwrap();
        assert_eq!(filtered.len(), 2);
    }
}
