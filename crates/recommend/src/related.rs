//! Related anime by tag overlap
//!
//! ## Algorithm
//! 1. Look up the target record
//! 2. For every other record, count shared genres, themes, demographics
//!    and studios (case-insensitive)
//! 3. Score = weighted sum of the shared counts
//! 4. Drop zero scores, sort by score, then site rating, then id
//! 5. Return the top `limit`

use data_loader::{Anime, AnimeCatalog, AnimeId};
use rayon::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Per-facet weight of one shared tag
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityWeights {
    pub genres: f32,
    pub themes: f32,
    pub demographics: f32,
    pub studios: f32,
}

impl Default for SimilarityWeights {
    fn default() -> Self {
        Self {
            genres: 3.0,
            themes: 2.0,
            demographics: 1.0,
            studios: 1.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimilarAnime {
    pub anime: Anime,
    pub score: f32,
    /// Genres shared with the target, in the candidate's order
    pub shared_genres: Vec<String>,
}

fn tag_set(tags: &[String]) -> HashSet<String> {
    tags.iter().map(|t| t.trim().to_lowercase()).collect()
}

/// Lowercased tag sets of one record, built once per target
struct TagProfile {
    genres: HashSet<String>,
    themes: HashSet<String>,
    demographics: HashSet<String>,
    studios: HashSet<String>,
}

impl TagProfile {
    fn of(anime: &Anime) -> Self {
        Self {
            genres: tag_set(&anime.genres),
            themes: tag_set(&anime.themes),
            demographics: tag_set(&anime.demographics),
            studios: tag_set(&anime.studios),
        }
    }

    fn score(&self, other: &Anime, weights: &SimilarityWeights) -> f32 {
        fn shared(set: &HashSet<String>, tags: &[String]) -> f32 {
            tag_set(tags).intersection(set).count() as f32
        }
        weights.genres * shared(&self.genres, &other.genres)
            + weights.themes * shared(&self.themes, &other.themes)
            + weights.demographics * shared(&self.demographics, &other.demographics)
            + weights.studios * shared(&self.studios, &other.studios)
    }
}

/// Weighted tag overlap between two records
pub fn similarity(a: &Anime, b: &Anime, weights: &SimilarityWeights) -> f32 {
    TagProfile::of(a).score(b, weights)
}

/// Finds records related to a given one
pub struct RelatedAnimeFinder {
    catalog: Arc<AnimeCatalog>,
    weights: SimilarityWeights,
}

impl RelatedAnimeFinder {
    pub fn new(catalog: Arc<AnimeCatalog>) -> Self {
        Self {
            catalog,
            weights: SimilarityWeights::default(),
        }
    }

    pub fn with_weights(mut self, weights: SimilarityWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn weights(&self) -> &SimilarityWeights {
        &self.weights
    }

    /// Top `limit` records related to `anime_id`; empty for an unknown id
    #[instrument(skip(self))]
    pub fn get_similar(&self, anime_id: AnimeId, limit: usize) -> Vec<SimilarAnime> {
        let all = self.catalog.get_all_anime();
        let Some(target) = all.iter().find(|a| a.id == anime_id) else {
            debug!("no record with this id");
            return Vec::new();
        };
        rank_related(target, &all, &self.weights, limit)
    }
}

/// Rank `candidates` against `target`, skipping the target itself
pub fn rank_related(
    target: &Anime,
    candidates: &[Anime],
    weights: &SimilarityWeights,
    limit: usize,
) -> Vec<SimilarAnime> {
    let profile = TagProfile::of(target);

    let mut related: Vec<SimilarAnime> = candidates
        .par_iter()
        .filter(|a| a.id != target.id)
        .filter_map(|a| {
            let score = profile.score(a, weights);
            (score > 0.0).then(|| SimilarAnime {
                anime: a.clone(),
                score,
                shared_genres: a
                    .genres
                    .iter()
                    .filter(|g| profile.genres.contains(&g.trim().to_lowercase()))
                    .cloned()
                    .collect(),
            })
        })
        .collect();

    related.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| b.anime.ratings.site.total_cmp(&a.anime.ratings.site))
            .then_with(|| a.anime.id.cmp(&b.anime.id))
    });
    related.truncate(limit);

    debug!("Found {} related anime for {}", related.len(), target.id);
    related
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::Ratings;

    fn tagged(id: AnimeId, site: f32, genres: &[&str], studios: &[&str]) -> Anime {
        let mut a = Anime::new(
            id,
            format!("Anime {id}"),
            Ratings {
                site,
                ..Ratings::default()
            },
        );
        a.genres = genres.iter().map(|s| s.to_string()).collect();
        a.studios = studios.iter().map(|s| s.to_string()).collect();
        a
    }

    #[test]
    fn test_similarity_weights_facets() {
        let mut a = tagged(1, 5.0, &["Action", "Drama"], &["MAPPA"]);
        a.themes = vec!["Gore".into()];
        a.demographics = vec!["Seinen".into()];
        let mut b = tagged(2, 5.0, &["action", "Drama", "Comedy"], &["mappa"]);
        b.themes = vec!["gore".into()];
        b.demographics = vec!["Shounen".into()];

        // 2 genres * 3.0 + 1 theme * 2.0 + 1 studio * 1.5
        assert_eq!(similarity(&a, &b, &SimilarityWeights::default()), 9.5);
    }

    #[test]
    fn test_rank_related_order_and_exclusions() {
        let target = tagged(1, 8.0, &["Action", "Fantasy"], &[]);
        let all = vec![
            target.clone(),
            tagged(2, 6.0, &["Action"], &[]),
            tagged(3, 9.0, &["Action"], &[]),
            tagged(4, 7.0, &["Action", "Fantasy"], &[]),
            tagged(5, 9.9, &["Romance"], &[]),
            tagged(6, 9.0, &["Action"], &[]),
        ];
        let related = rank_related(&target, &all, &SimilarityWeights::default(), 10);
        let ids: Vec<_> = related.iter().map(|r| r.anime.id).collect();
        // 4 has two shared genres; 3 and 6 tie on score and site, 3 first by id
        assert_eq!(ids, vec![4, 3, 6, 2]);
        assert_eq!(related[0].shared_genres, vec!["Action", "Fantasy"]);
        assert_eq!(related[0].score, 6.0);
    }

    #[test]
    fn test_rank_related_limit() {
        let target = tagged(1, 8.0, &["Action"], &[]);
        let all: Vec<_> = (2..10).map(|id| tagged(id, 5.0, &["Action"], &[])).collect();
        assert_eq!(rank_related(&target, &all, &SimilarityWeights::default(), 3).len(), 3);
    }
}
