//! Browse query parameters.

use data_loader::{AnimeStatus, RatingKey};

/// Keep only records whose `key` rating is at least `min`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingThreshold {
    pub key: RatingKey,
    pub min: f32,
}

/// What a browse page asks for. Empty fields do not filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingQuery {
    /// Every listed genre must be present (case-insensitive)
    pub genres: Vec<String>,
    pub status: Option<AnimeStatus>,
    pub min_rating: Option<RatingThreshold>,
    /// Case-insensitive exact studio name
    pub studio: Option<String>,
    /// Case-insensitive title substring
    pub search: Option<String>,
    pub sort_by: RatingKey,
    pub offset: usize,
    pub limit: Option<usize>,
}

impl ListingQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genres.push(genre.into());
        self
    }

    pub fn with_status(mut self, status: AnimeStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_min_rating(mut self, key: RatingKey, min: f32) -> Self {
        self.min_rating = Some(RatingThreshold { key, min });
        self
    }

    pub fn with_studio(mut self, studio: impl Into<String>) -> Self {
        self.studio = Some(studio.into());
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn sorted_by(mut self, key: RatingKey) -> Self {
        self.sort_by = key;
        self
    }

    pub fn with_page(mut self, offset: usize, limit: usize) -> Self {
        self.offset = offset;
        self.limit = Some(limit);
        self
    }
}
