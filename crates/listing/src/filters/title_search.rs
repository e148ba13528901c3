//! Keep records whose title contains the search text.

use crate::query::ListingQuery;
use crate::traits::Filter;
use anyhow::Result;
use data_loader::Anime;

/// Same matching as `AnimeCatalog::search_anime`: trimmed,
/// case-insensitive substring, blank search passes everything.
pub struct TitleSearchFilter;

impl Filter for TitleSearchFilter {
    fn name(&self) -> &str {
        "TitleSearchFilter"
    }

    fn apply(&self, anime: Vec<Anime>, query: &ListingQuery) -> Result<Vec<Anime>> {
        let needle = query.search.as_deref().unwrap_or("").trim().to_lowercase();
        if needle.is_empty() {
            return Ok(anime);
        }
        Ok(anime
            .into_iter()
            .filter(|a| a.title.to_lowercase().contains(&needle))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::sample;

    #[test]
    fn test_title_search() {
        let input = vec![
            sample(1, "Cowboy Bebop"),
            sample(2, "Samurai Champloo"),
            sample(3, "Bebop Remix"),
        ];
        let query = ListingQuery::new().with_search("BEBOP");
        let ids: Vec<_> = TitleSearchFilter
            .apply(input, &query)
            .unwrap()
            .iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_title_search_matches_catalog_search() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anime.csv");
        std::fs::write(
            &path,
            "franchise_root_title,site_score\nCowboy Bebop,9\nSamurai Champloo,8\n",
        )
        .unwrap();
        let catalog = data_loader::AnimeCatalog::new(data_loader::CatalogConfig::new(path));

        for search in [" bebop", "CHAMPLOO  ", "  "] {
            let query = ListingQuery::new().with_search(search);
            let filtered: Vec<_> = TitleSearchFilter
                .apply(catalog.get_all_anime().as_ref().clone(), &query)
                .unwrap()
                .iter()
                .map(|a| a.id)
                .collect();
            let searched: Vec<_> = catalog.search_anime(search).iter().map(|a| a.id).collect();
            assert_eq!(filtered, searched, "search {search:?}");
        }
    }
}
