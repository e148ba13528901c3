//! Keep records tagged with every requested genre.

use crate::query::ListingQuery;
use crate::traits::Filter;
use anyhow::Result;
use data_loader::Anime;

/// Matches `query.genres` against `Anime::genres`, ignoring case.
/// An empty request passes everything.
pub struct GenreFilter;

impl Filter for GenreFilter {
    fn name(&self) -> &str {
        "GenreFilter"
    }

    fn apply(&self, anime: Vec<Anime>, query: &ListingQuery) -> Result<Vec<Anime>> {
        if query.genres.is_empty() {
            return Ok(anime);
        }
        let wanted: Vec<String> = query.genres.iter().map(|g| g.trim().to_lowercase()).collect();

        let filtered = anime
            .into_iter()
            .filter(|a| {
                wanted
                    .iter()
                    .all(|w| a.genres.iter().any(|g| g.to_lowercase() == *w))
            })
            .collect();
        Ok(filtered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::sample;

    #[test]
    fn test_genre_filter_requires_all() {
        let mut a = sample(1, "Both");
        a.genres = vec!["Action".into(), "Drama".into()];
        let mut b = sample(2, "Action only");
        b.genres = vec!["Action".into()];
        let c = sample(3, "Untagged");

        let query = ListingQuery::new().with_genre("action").with_genre("DRAMA");
        let filtered = GenreFilter.apply(vec![a, b, c], &query).unwrap();

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, 1);
    }
}
