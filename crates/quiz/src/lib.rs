//! # Quiz Crate
//!
//! "Which anime character are you?" Each answer contributes trait tags;
//! the character whose traits were picked most often wins.
//!
//! ## Example Usage
//!
//! ```ignore
//! use quiz::QuizCatalog;
//!
//! let catalog = QuizCatalog::builtin()?;
//! let answers = catalog.answers_for(&[0, 2, 1, 3, 0, 0, 1, 2])?;
//! let result = catalog.calculate_result(&answers);
//! println!("You are {} from {}", result.name, result.anime);
//! ```

pub mod error;
pub mod types;
pub mod scorer;

pub use error::{QuizError, Result};
pub use types::{Character, Question, QuizOption, Rarity};
pub use scorer::{tally, CharacterMatch, QuizCatalog};

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_builtin_catalog_shape() {
        let catalog = QuizCatalog::builtin().unwrap();
        assert_eq!(catalog.questions().len(), 8);
        assert_eq!(catalog.characters().len(), 10);

        let ids: HashSet<_> = catalog.characters().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids.len(), 10, "character ids must be unique");
        assert!(catalog.questions().iter().all(|q| !q.options.is_empty()));
    }

    #[test]
    fn test_every_picked_trait_belongs_to_someone() {
        let catalog = QuizCatalog::builtin().unwrap();
        let known: HashSet<_> = catalog
            .characters()
            .iter()
            .flat_map(|c| c.traits.iter())
            .collect();
        for question in catalog.questions() {
            for option in &question.options {
                for t in &option.traits {
                    assert!(known.contains(t), "trait {t:?} matches no character");
                }
            }
        }
    }

    #[test]
    fn test_builtin_results() {
        let catalog = QuizCatalog::builtin().unwrap();

        let first_options = catalog.answers_for(&[0; 8]).unwrap();
        assert_eq!(catalog.calculate_result(&first_options).id, "naruto-uzumaki");

        // Lelouch and Senku both score 7; Lelouch is listed first
        let second_options = catalog.answers_for(&[1; 8]).unwrap();
        assert_eq!(catalog.calculate_result(&second_options).id, "lelouch-lamperouge");
        let top: Vec<_> = catalog
            .match_scores(&second_options)
            .iter()
            .take(2)
            .map(|m| (m.character.id.as_str(), m.score))
            .collect();
        assert_eq!(top, vec![("lelouch-lamperouge", 7), ("senku-ishigami", 7)]);

        let last_options = catalog.answers_for(&[3; 8]).unwrap();
        assert_eq!(catalog.calculate_result(&last_options).id, "anya-forger");
    }

    #[test]
    fn test_answers_for_rejects_bad_choices() {
        let catalog = QuizCatalog::builtin().unwrap();
        assert!(matches!(
            catalog.answers_for(&[0, 9]),
            Err(QuizError::InvalidChoice { question: 1, choice: 9, .. })
        ));
        assert!(matches!(
            catalog.answers_for(&[0; 9]),
            Err(QuizError::UnknownQuestion { index: 8, .. })
        ));
        assert_eq!(catalog.answers_for(&[2]).unwrap().len(), 1);
    }

    #[test]
    fn test_from_json_errors() {
        assert!(matches!(QuizCatalog::from_json("{"), Err(QuizError::Catalog(_))));
        assert!(matches!(
            QuizCatalog::from_json(r#"{"questions": [], "characters": []}"#),
            Err(QuizError::EmptyCatalog)
        ));
    }
}
