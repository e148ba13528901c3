//! Keep records made by the requested studio.

use crate::query::ListingQuery;
use crate::traits::Filter;
use anyhow::Result;
use data_loader::Anime;

pub struct StudioFilter;

impl Filter for StudioFilter {
    fn name(&self) -> &str {
        "StudioFilter"
    }

    fn apply(&self, anime: Vec<Anime>, query: &ListingQuery) -> Result<Vec<Anime>> {
        let Some(studio) = query.studio.as_deref().map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(anime);
        };
        let filtered = anime
            .into_iter()
            .filter(|a| a.studios.iter().any(|s| s.eq_ignore_ascii_case(studio)))
            .collect();
        Ok(filtered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::sample;

    #[test]
    fn test_studio_filter_is_case_insensitive() {
        let mut a = sample(1, "A");
        a.studios = vec!["MAPPA".into(), "Studio Bones".into()];
        let mut b = sample(2, "B");
        b.studios = vec!["Madhouse".into()];

        let query = ListingQuery::new().with_studio("studio bones");
        let filtered = StudioFilter.apply(vec![a, b], &query).unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, 1);
    }
}
