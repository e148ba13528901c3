//! Core domain types for the anime catalog.
//!
//! Records are plain value objects. Relationships between them are by id
//! (`AnimeId`) or by title lookup, never by reference.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Type Aliases
// =============================================================================

/// Identifier of an anime record, assigned sequentially (from 1) per load
pub type AnimeId = u32;

/// Title string used to join the anime sheet with the reviews sheet
pub type Title = String;

// =============================================================================
// Ratings
// =============================================================================

/// The five rating axes shown on the site, each on a 0-10 scale
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Ratings {
    pub music: f32,
    pub visual: f32,
    pub story: f32,
    pub character: f32,
    pub site: f32,
}

impl Ratings {
    pub const MIN: f32 = 0.0;
    pub const MAX: f32 = 10.0;

    /// Read the rating for one axis
    pub fn get(&self, key: RatingKey) -> f32 {
        match key {
            RatingKey::Site => self.site,
            RatingKey::Visual => self.visual,
            RatingKey::Music => self.music,
            RatingKey::Story => self.story,
            RatingKey::Character => self.character,
        }
    }
}

/// Axis a listing can be sorted by. Defaults to the overall site score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RatingKey {
    #[default]
    Site,
    Visual,
    Music,
    Story,
    Character,
}

impl RatingKey {
    pub const ALL: [RatingKey; 5] = [
        RatingKey::Site,
        RatingKey::Visual,
        RatingKey::Music,
        RatingKey::Story,
        RatingKey::Character,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RatingKey::Site => "site",
            RatingKey::Visual => "visual",
            RatingKey::Music => "music",
            RatingKey::Story => "story",
            RatingKey::Character => "character",
        }
    }
}

impl fmt::Display for RatingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RatingKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "site" => Ok(RatingKey::Site),
            "visual" => Ok(RatingKey::Visual),
            "music" => Ok(RatingKey::Music),
            "story" => Ok(RatingKey::Story),
            "character" => Ok(RatingKey::Character),
            other => Err(format!(
                "unknown rating key {other:?} (expected site, visual, music, story or character)"
            )),
        }
    }
}

// =============================================================================
// Airing status
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimeStatus {
    Ongoing,
    #[default]
    Completed,
    Upcoming,
}

impl AnimeStatus {
    /// Accepts the site's own spelling and the spelling used by Jikan exports
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ongoing" | "currently airing" | "airing" => Some(AnimeStatus::Ongoing),
            "completed" | "finished airing" | "finished" => Some(AnimeStatus::Completed),
            "upcoming" | "not yet aired" => Some(AnimeStatus::Upcoming),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AnimeStatus::Ongoing => "ongoing",
            AnimeStatus::Completed => "completed",
            AnimeStatus::Upcoming => "upcoming",
        }
    }
}

impl fmt::Display for AnimeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnimeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AnimeStatus::parse(s).ok_or_else(|| format!("unknown status {s:?}"))
    }
}

// =============================================================================
// Reviews
// =============================================================================

/// A community review attached to one anime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    /// Set when the review is joined onto its anime record; 0 before that
    pub anime_id: AnimeId,
    pub username: String,
    /// Reviewer's score; `None` when the cell was empty or malformed
    pub score: Option<f32>,
    pub content: String,
    pub date: Option<NaiveDate>,
    pub is_spoiler: bool,
    pub is_preliminary: bool,
}

/// Per-title metadata gathered from the reviews sheet.
///
/// Static fields come from the first row seen for the title; `reviews`
/// accumulates every row that carries review text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewMetadata {
    pub synopsis: String,
    pub genres: Vec<String>,
    pub themes: Vec<String>,
    pub demographics: Vec<String>,
    pub studios: Vec<String>,
    pub status: Option<AnimeStatus>,
    pub year: Option<u16>,
    pub season: Option<String>,
    pub duration: Option<String>,
    pub source: Option<String>,
    pub episodes: Option<u32>,
    pub rank: Option<u32>,
    pub popularity: Option<u32>,
    pub members: Option<u32>,
    pub reviews: Vec<Review>,
}

// =============================================================================
// Anime
// =============================================================================

/// One catalog entry as served to pages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anime {
    pub id: AnimeId,
    pub title: String,
    pub cover_image: String,
    pub cover_color: Option<String>,
    pub description: String,
    pub ratings: Ratings,
    pub genres: Vec<String>,
    pub themes: Vec<String>,
    pub demographics: Vec<String>,
    pub studios: Vec<String>,
    pub status: AnimeStatus,
    pub episodes: Option<u32>,
    pub year: Option<u16>,
    pub season: Option<String>,
    pub duration: Option<String>,
    pub source: Option<String>,
    pub rank: Option<u32>,
    pub popularity: Option<u32>,
    pub members: Option<u32>,
    pub anilist_title: Option<String>,
    pub anilist_url: Option<String>,
    pub reviews: Vec<Review>,
}

impl Anime {
    /// Minimal record with everything but the title and ratings empty.
    /// Mostly useful for fixtures.
    pub fn new(id: AnimeId, title: impl Into<String>, ratings: Ratings) -> Self {
        Self {
            id,
            title: title.into(),
            cover_image: String::new(),
            cover_color: None,
            description: String::new(),
            ratings,
            genres: Vec::new(),
            themes: Vec::new(),
            demographics: Vec::new(),
            studios: Vec::new(),
            status: AnimeStatus::default(),
            episodes: None,
            year: None,
            season: None,
            duration: None,
            source: None,
            rank: None,
            popularity: None,
            members: None,
            anilist_title: None,
            anilist_url: None,
            reviews: Vec::new(),
        }
    }

    /// Fill fields the anime sheet left empty from the reviews sheet and
    /// attach its reviews, stamping them with this record's id
    pub fn merge_metadata(&mut self, meta: &ReviewMetadata) {
        if self.description.is_empty() {
            self.description = meta.synopsis.clone();
        }
        fill_list(&mut self.genres, &meta.genres);
        fill_list(&mut self.themes, &meta.themes);
        fill_list(&mut self.demographics, &meta.demographics);
        fill_list(&mut self.studios, &meta.studios);
        if let Some(status) = meta.status {
            self.status = status;
        }
        self.episodes = self.episodes.or(meta.episodes);
        self.year = self.year.or(meta.year);
        self.rank = self.rank.or(meta.rank);
        self.popularity = self.popularity.or(meta.popularity);
        self.members = self.members.or(meta.members);
        if self.season.is_none() {
            self.season = meta.season.clone();
        }
        if self.duration.is_none() {
            self.duration = meta.duration.clone();
        }
        if self.source.is_none() {
            self.source = meta.source.clone();
        }

        let id = self.id;
        self.reviews.extend(meta.reviews.iter().cloned().map(|mut review| {
            review.anime_id = id;
            review
        }));
    }
}

fn fill_list(target: &mut Vec<String>, source: &[String]) {
    if target.is_empty() {
        target.extend_from_slice(source);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_key_parsing() {
        assert_eq!("visual".parse::<RatingKey>(), Ok(RatingKey::Visual));
        assert_eq!(" Site ".parse::<RatingKey>(), Ok(RatingKey::Site));
        assert!("plot".parse::<RatingKey>().is_err());
        assert_eq!(RatingKey::default(), RatingKey::Site);
    }

    #[test]
    fn test_ratings_get_reads_each_axis() {
        let ratings = Ratings {
            music: 1.0,
            visual: 2.0,
            story: 3.0,
            character: 4.0,
            site: 5.0,
        };
        let values: Vec<f32> = RatingKey::ALL.iter().map(|&k| ratings.get(k)).collect();
        assert_eq!(values, vec![5.0, 2.0, 1.0, 3.0, 4.0]);
    }

    #[test]
    fn test_status_accepts_jikan_spelling() {
        assert_eq!(AnimeStatus::parse("Currently Airing"), Some(AnimeStatus::Ongoing));
        assert_eq!(AnimeStatus::parse("Finished Airing"), Some(AnimeStatus::Completed));
        assert_eq!(AnimeStatus::parse("Not yet aired"), Some(AnimeStatus::Upcoming));
        assert_eq!(AnimeStatus::parse("upcoming"), Some(AnimeStatus::Upcoming));
        assert_eq!(AnimeStatus::parse("cancelled"), None);
    }

    #[test]
    fn test_merge_metadata_keeps_sheet_values_and_stamps_reviews() {
        let mut anime = Anime::new(7, "Frieren", Ratings::default());
        anime.genres = vec!["Fantasy".to_string()];
        anime.episodes = Some(28);

        let meta = ReviewMetadata {
            synopsis: "An elf mage outlives her party.".to_string(),
            genres: vec!["Adventure".to_string()],
            themes: vec!["Mythology".to_string()],
            status: Some(AnimeStatus::Ongoing),
            episodes: Some(99),
            members: Some(1_000),
            reviews: vec![Review {
                anime_id: 0,
                username: "himmel".to_string(),
                score: Some(9.0),
                content: "Quiet and lovely.".to_string(),
                date: None,
                is_spoiler: false,
                is_preliminary: true,
            }],
            ..ReviewMetadata::default()
        };

        anime.merge_metadata(&meta);

        assert_eq!(anime.description, "An elf mage outlives her party.");
        assert_eq!(anime.genres, vec!["Fantasy".to_string()]);
        assert_eq!(anime.themes, vec!["Mythology".to_string()]);
        assert_eq!(anime.status, AnimeStatus::Ongoing);
        assert_eq!(anime.episodes, Some(28));
        assert_eq!(anime.members, Some(1_000));
        assert_eq!(anime.reviews.len(), 1);
        assert_eq!(anime.reviews[0].anime_id, 7);
    }
}
