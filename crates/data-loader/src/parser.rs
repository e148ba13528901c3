//! Row transformers for the anime sheet and the reviews sheet.
//!
//! A transformer receives one `RawRow` (header name -> cell text) and turns
//! it into a typed record. Cell parsing is explicit: every numeric cell is
//! `Empty`, `Value` or `Malformed`, so a broken cell is never mistaken for a
//! legitimate zero.
//!
//! Policy applied by the transformers here:
//! - a malformed *required* cell (title, ratings) fails the row
//! - a malformed *optional* cell becomes `None` and records a warning
//! - an empty rating cell reads as 0 and records a warning

use crate::error::{DataLoadError, Result};
use crate::types::*;
use chrono::{DateTime, NaiveDate};
use std::collections::HashMap;
use std::str::FromStr;

// =============================================================================
// Column names
// =============================================================================

pub mod columns {
    pub const TITLE: &str = "franchise_root_title";
    pub const MUSIC: &str = "music_score";
    pub const VISUAL: &str = "visual_score";
    pub const STORY: &str = "story_score";
    pub const CHARACTER: &str = "character_score";
    pub const SITE: &str = "site_score";
    pub const COVER_IMAGE: &str = "cover_image_url";
    pub const COVER_COLOR: &str = "cover_image_color";
    pub const ANILIST_TITLE: &str = "anilist_title_match";
    pub const ANILIST_PAGE: &str = "anilist_page";
    pub const DESCRIPTION: &str = "description";
    pub const SYNOPSIS: &str = "synopsis";
    pub const GENRES: &str = "genres";
    pub const THEMES: &str = "themes";
    pub const DEMOGRAPHICS: &str = "demographics";
    pub const STUDIOS: &str = "studios";
    pub const STATUS: &str = "status";
    pub const EPISODES: &str = "episodes";
    pub const YEAR: &str = "year";
    pub const SEASON: &str = "season";
    pub const DURATION: &str = "duration";
    pub const SOURCE: &str = "source";
    pub const RANK: &str = "rank";
    pub const POPULARITY: &str = "popularity";
    pub const MEMBERS: &str = "members";
    pub const REVIEW_USERNAME: &str = "review_username";
    pub const REVIEW_SCORE: &str = "review_score";
    pub const REVIEW_CONTENT: &str = "review_content";
    pub const REVIEW_DATE: &str = "review_date";
    pub const IS_SPOILER: &str = "is_spoiler";
    pub const IS_PRELIMINARY: &str = "is_preliminary";
}

/// The four category scores are kept on a 0-5 scale in the sheet
pub const CATEGORY_SCORE_SCALE: f32 = 2.0;
/// `site_score` is already on 0-10
pub const SITE_SCORE_SCALE: f32 = 1.0;

// =============================================================================
// Raw rows
// =============================================================================

/// Outcome of parsing one cell
#[derive(Debug, Clone, PartialEq)]
pub enum Cell<T> {
    Empty,
    Value(T),
    Malformed(String),
}

/// One CSV data row keyed by header name, plus the warnings raised while
/// transforming it
#[derive(Debug, Clone, Default)]
pub struct RawRow {
    pub line: usize,
    fields: HashMap<String, String>,
    warnings: Vec<String>,
}

impl RawRow {
    pub fn new(line: usize, fields: HashMap<String, String>) -> Self {
        Self {
            line,
            fields,
            warnings: Vec::new(),
        }
    }

    /// Build a row from `(column, value)` pairs
    pub fn from_pairs<I, K, V>(line: usize, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let fields = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::new(line, fields)
    }

    /// Cell text exactly as it appears in the file; "" for absent columns
    pub fn text(&self, column: &str) -> &str {
        self.fields.get(column).map(String::as_str).unwrap_or("")
    }

    /// Cell text, failing the row when the cell is blank.
    /// The value is returned untrimmed: it may be used as a join key.
    pub fn required_text(&self, column: &str) -> Result<String> {
        let value = self.text(column);
        if value.trim().is_empty() {
            return Err(DataLoadError::MissingField {
                field: column.to_string(),
            });
        }
        Ok(value.to_string())
    }

    /// Trimmed cell text, `None` when blank
    pub fn optional_text(&self, column: &str) -> Option<String> {
        let value = self.text(column).trim();
        (!value.is_empty()).then(|| value.to_string())
    }

    /// Parse a cell without deciding what a failure means
    pub fn number<T: FromStr>(&self, column: &str) -> Cell<T> {
        let raw = self.text(column).trim();
        if raw.is_empty() {
            return Cell::Empty;
        }
        match raw.parse::<T>() {
            Ok(value) => Cell::Value(value),
            Err(_) => Cell::Malformed(raw.to_string()),
        }
    }

    /// Optional numeric cell: malformed values become `None` plus a warning
    pub fn optional_number<T: FromStr>(&mut self, column: &str) -> Option<T> {
        match self.number(column) {
            Cell::Empty => None,
            Cell::Value(value) => Some(value),
            Cell::Malformed(raw) => {
                self.warn(format!("{column}: could not parse {raw:?}, left empty"));
                None
            }
        }
    }

    /// Comma separated list, items trimmed, blanks dropped
    pub fn list(&self, column: &str) -> Vec<String> {
        split_list(self.text(column))
    }

    /// Boolean cell; blank reads as false
    pub fn flag(&mut self, column: &str) -> bool {
        let raw = self.text(column).trim().to_ascii_lowercase();
        match raw.as_str() {
            "" | "false" | "0" | "no" | "n" => false,
            "true" | "1" | "yes" | "y" => true,
            _ => {
                self.warn(format!("{column}: unrecognised flag {raw:?}, read as false"));
                false
            }
        }
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<String> {
        std::mem::take(&mut self.warnings)
    }
}

/// Split a comma separated cell into trimmed, non-empty items
///
/// Example: "Action, Drama,," -> ["Action", "Drama"]
pub fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read a rating cell, apply its scale and check the 0-10 range
fn parse_rating(row: &mut RawRow, column: &str, scale: f32) -> Result<f32> {
    let value = match row.number::<f32>(column) {
        Cell::Value(value) => value * scale,
        Cell::Empty => {
            row.warn(format!("{column}: empty, read as 0"));
            return Ok(0.0);
        }
        Cell::Malformed(raw) => {
            return Err(DataLoadError::InvalidValue {
                field: column.to_string(),
                value: raw,
            });
        }
    };

    if !(Ratings::MIN..=Ratings::MAX).contains(&value) {
        return Err(DataLoadError::OutOfRange {
            field: column.to_string(),
            value,
        });
    }
    Ok(value)
}

fn parse_status(row: &mut RawRow) -> Option<AnimeStatus> {
    let raw = row.optional_text(columns::STATUS)?;
    let status = AnimeStatus::parse(&raw);
    if status.is_none() {
        row.warn(format!("{}: unknown value {raw:?}", columns::STATUS));
    }
    status
}

/// Parse the review dates seen in exports: ISO dates, RFC 3339 timestamps,
/// "Jan 5, 2023" and "01/05/2023"
pub fn parse_review_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.date_naive());
    }
    ["%Y-%m-%d", "%b %d, %Y", "%B %d, %Y", "%m/%d/%Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

// =============================================================================
// Anime sheet
// =============================================================================

/// Transform one row of the anime sheet.
///
/// The returned record has `id == 0`; ids are assigned by the catalog once
/// the whole batch is known.
pub fn transform_anime_row(row: &mut RawRow) -> Result<Anime> {
    let title = row.required_text(columns::TITLE)?;

    let ratings = Ratings {
        music: parse_rating(row, columns::MUSIC, CATEGORY_SCORE_SCALE)?,
        visual: parse_rating(row, columns::VISUAL, CATEGORY_SCORE_SCALE)?,
        story: parse_rating(row, columns::STORY, CATEGORY_SCORE_SCALE)?,
        character: parse_rating(row, columns::CHARACTER, CATEGORY_SCORE_SCALE)?,
        site: parse_rating(row, columns::SITE, SITE_SCORE_SCALE)?,
    };

    let description = row
        .optional_text(columns::DESCRIPTION)
        .or_else(|| row.optional_text(columns::SYNOPSIS))
        .unwrap_or_default();

    let mut anime = Anime::new(0, title, ratings);
    anime.cover_image = row.optional_text(columns::COVER_IMAGE).unwrap_or_default();
    anime.cover_color = row.optional_text(columns::COVER_COLOR);
    anime.description = description;
    anime.genres = row.list(columns::GENRES);
    anime.themes = row.list(columns::THEMES);
    anime.demographics = row.list(columns::DEMOGRAPHICS);
    anime.studios = row.list(columns::STUDIOS);
    anime.status = parse_status(row).unwrap_or_default();
    anime.episodes = row.optional_number(columns::EPISODES);
    anime.year = row.optional_number(columns::YEAR);
    anime.season = row.optional_text(columns::SEASON);
    anime.duration = row.optional_text(columns::DURATION);
    anime.source = row.optional_text(columns::SOURCE);
    anime.rank = row.optional_number(columns::RANK);
    anime.popularity = row.optional_number(columns::POPULARITY);
    anime.members = row.optional_number(columns::MEMBERS);
    anime.anilist_title = row.optional_text(columns::ANILIST_TITLE);
    anime.anilist_url = row.optional_text(columns::ANILIST_PAGE);
    Ok(anime)
}

// =============================================================================
// Reviews sheet
// =============================================================================

/// One row of the reviews sheet: the title it belongs to, the static
/// metadata repeated on every row, and the review it carries (if any)
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewRow {
    pub title: Title,
    pub metadata: ReviewMetadata,
    pub review: Option<Review>,
}

pub fn transform_review_row(row: &mut RawRow) -> Result<ReviewRow> {
    let title = row.required_text(columns::TITLE)?;

    let metadata = ReviewMetadata {
        synopsis: row.optional_text(columns::SYNOPSIS).unwrap_or_default(),
        genres: row.list(columns::GENRES),
        themes: row.list(columns::THEMES),
        demographics: row.list(columns::DEMOGRAPHICS),
        studios: row.list(columns::STUDIOS),
        status: parse_status(row),
        year: row.optional_number(columns::YEAR),
        season: row.optional_text(columns::SEASON),
        duration: row.optional_text(columns::DURATION),
        source: row.optional_text(columns::SOURCE),
        episodes: row.optional_number(columns::EPISODES),
        rank: row.optional_number(columns::RANK),
        popularity: row.optional_number(columns::POPULARITY),
        members: row.optional_number(columns::MEMBERS),
        reviews: Vec::new(),
    };

    let username = row.text(columns::REVIEW_USERNAME).trim().to_string();
    let content = row.text(columns::REVIEW_CONTENT).trim().to_string();
    let review = if username.is_empty() && content.is_empty() {
        None
    } else {
        let date_raw = row.text(columns::REVIEW_DATE).to_string();
        let date = parse_review_date(&date_raw);
        if date.is_none() && !date_raw.trim().is_empty() {
            row.warn(format!("{}: could not parse {date_raw:?}", columns::REVIEW_DATE));
        }
        Some(Review {
            anime_id: 0,
            username,
            score: row.optional_number(columns::REVIEW_SCORE),
            content,
            date,
            is_spoiler: row.flag(columns::IS_SPOILER),
            is_preliminary: row.flag(columns::IS_PRELIMINARY),
        })
    };

    Ok(ReviewRow {
        title,
        metadata,
        review,
    })
}
