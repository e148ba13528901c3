//! Reviews index: the reviews sheet grouped by franchise title.
//!
//! Keys are compared byte for byte. No case folding or whitespace trimming
//! is applied, so a title only joins when both sheets spell it identically.

use crate::parser::{transform_review_row, ReviewRow};
use crate::reader::{parse_csv, read_csv, CsvBatch, LoadReport};
use crate::types::{ReviewMetadata, Title};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct ReviewsIndex {
    by_title: HashMap<Title, ReviewMetadata>,
    /// Titles in first-seen order
    order: Vec<Title>,
    report: LoadReport,
}

impl ReviewsIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group parsed rows by title. The first row seen for a title supplies
    /// its static metadata; every row carrying a review appends it.
    pub fn from_rows(rows: impl IntoIterator<Item = ReviewRow>) -> Self {
        let mut index = Self::new();
        for row in rows {
            index.insert_row(row);
        }
        index
    }

    fn from_batch(batch: CsvBatch<ReviewRow>) -> Self {
        let mut index = Self::from_rows(batch.records);
        index.report = batch.report;
        info!(
            titles = index.len(),
            reviews = index.review_count(),
            "built reviews index"
        );
        index
    }

    pub fn insert_row(&mut self, row: ReviewRow) {
        let ReviewRow {
            title,
            metadata,
            review,
        } = row;

        if !self.by_title.contains_key(&title) {
            self.order.push(title.clone());
        }
        let entry = self.by_title.entry(title).or_insert(metadata);
        if let Some(review) = review {
            entry.reviews.push(review);
        }
    }

    /// Exact-match lookup
    pub fn get(&self, title: &str) -> Option<&ReviewMetadata> {
        self.by_title.get(title)
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_title.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_title.is_empty()
    }

    pub fn review_count(&self) -> usize {
        self.by_title.values().map(|m| m.reviews.len()).sum()
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }
}

/// Build the reviews index from a file. An unreadable file gives an empty
/// index.
pub fn load_reviews_index(path: &Path) -> ReviewsIndex {
    ReviewsIndex::from_batch(read_csv(path, transform_review_row))
}

/// Build the reviews index from in-memory CSV text
pub fn parse_reviews_index<R: Read>(input: R, label: &str) -> ReviewsIndex {
    ReviewsIndex::from_batch(parse_csv(input, label, transform_review_row))
}
