//! Trait-tally scoring against the character catalog.
//!
//! ## Algorithm
//! 1. Flatten every answer's traits into one multiset
//! 2. A character scores the multiset count of each of its traits
//! 3. The first character with the strictly highest score wins

use crate::error::{QuizError, Result};
use crate::types::{Character, Question};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

const BUILTIN_CATALOG: &str = include_str!("../data/catalog.json");

/// One character's score for a set of answers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharacterMatch<'a> {
    pub character: &'a Character,
    pub score: u32,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    questions: Vec<Question>,
    characters: Vec<Character>,
}

/// Questions and characters; always holds at least one character
#[derive(Debug, Clone)]
pub struct QuizCatalog {
    questions: Vec<Question>,
    characters: Vec<Character>,
}

/// Count how often each trait was picked
pub fn tally<'a>(answers: &'a [Vec<String>]) -> HashMap<&'a str, u32> {
    let mut counts = HashMap::new();
    for trait_name in answers.iter().flatten() {
        *counts.entry(trait_name.as_str()).or_insert(0) += 1;
    }
    counts
}

fn score(character: &Character, counts: &HashMap<&str, u32>) -> u32 {
    character
        .traits
        .iter()
        .map(|t| counts.get(t.as_str()).copied().unwrap_or(0))
        .sum()
}

impl QuizCatalog {
    pub fn new(questions: Vec<Question>, characters: Vec<Character>) -> Result<Self> {
        if characters.is_empty() {
            return Err(QuizError::EmptyCatalog);
        }
        Ok(Self {
            questions,
            characters,
        })
    }

    /// The catalog shipped with the crate
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_CATALOG)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::new(file.questions, file.characters)
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    /// Best match for the answers; ties go to the earlier catalog entry
    /// and no answers at all gives the first character.
    pub fn calculate_result(&self, answers: &[Vec<String>]) -> &Character {
        let counts = tally(answers);

        let mut best = &self.characters[0];
        let mut best_score = 0;
        for character in &self.characters {
            let s = score(character, &counts);
            if s > best_score {
                best = character;
                best_score = s;
            }
        }
        debug!(character = %best.id, score = best_score, "quiz result");
        best
    }

    /// Every character's score, highest first, catalog order within ties
    pub fn match_scores(&self, answers: &[Vec<String>]) -> Vec<CharacterMatch<'_>> {
        let counts = tally(answers);
        let mut matches: Vec<_> = self
            .characters
            .iter()
            .map(|character| CharacterMatch {
                character,
                score: score(character, &counts),
            })
            .collect();
        matches.sort_by(|a, b| b.score.cmp(&a.score));
        matches
    }

    /// Trait lists for the option picked on each question, in order.
    ///
    /// `choices[i]` is the option index for question `i`. Fewer choices
    /// than questions is allowed.
    pub fn answers_for(&self, choices: &[usize]) -> Result<Vec<Vec<String>>> {
        choices
            .iter()
            .enumerate()
            .map(|(index, &choice)| {
                let question = self.questions.get(index).ok_or(QuizError::UnknownQuestion {
                    index,
                    questions: self.questions.len(),
                })?;
                let option = question.options.get(choice).ok_or(QuizError::InvalidChoice {
                    question: index,
                    choice,
                    options: question.options.len(),
                })?;
                Ok(option.traits.clone())
            })
            .collect()
    }
}
