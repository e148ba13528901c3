//! Error types for the quiz.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuizError {
    #[error("invalid quiz catalog: {0}")]
    Catalog(#[from] serde_json::Error),

    #[error("quiz catalog has no characters")]
    EmptyCatalog,

    #[error("answer {index} has no matching question ({questions} questions)")]
    UnknownQuestion { index: usize, questions: usize },

    #[error("question {question} has {options} options, got choice {choice}")]
    InvalidChoice {
        question: usize,
        choice: usize,
        options: usize,
    },
}

pub type Result<T> = std::result::Result<T, QuizError>;
