//! Filter implementations for the listing pipeline.

pub mod genre;
pub mod minimum_rating;
pub mod status;
pub mod studio;
pub mod title_search;

pub use genre::GenreFilter;
pub use minimum_rating::MinimumRatingFilter;
pub use status::StatusFilter;
pub use studio::StudioFilter;
pub use title_search::TitleSearchFilter;

#[cfg(test)]
pub(crate) fn sample(id: u32, title: &str) -> data_loader::Anime {
    data_loader::Anime::new(id, title, data_loader::Ratings::default())
}
