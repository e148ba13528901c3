//! Error types for the data-loader crate.
//!
//! Two layers of failure exist while loading the catalog:
//! - file-level errors (`DataLoadError::Io`, `DataLoadError::Csv`), which the
//!   reader logs and turns into an empty batch
//! - row-level errors (`DataLoadError::MissingField`, `InvalidValue`,
//!   `OutOfRange`), which drop a single row and are recorded in the
//!   batch's `LoadReport`

use thiserror::Error;

/// Errors that can occur during data loading and parsing
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// I/O error occurred while reading a file
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The CSV parser rejected the input (bad quoting, invalid UTF-8, ...)
    #[error("CSV error in {file}: {source}")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },

    /// A required column was empty or absent in a row
    #[error("Missing required field `{field}`")]
    MissingField { field: String },

    /// A data field had a value that could not be parsed
    #[error("Invalid value for {field}: {value:?}")]
    InvalidValue { field: String, value: String },

    /// A rating left the 0-10 scale after scaling
    #[error("Value for {field} out of range: {value}")]
    OutOfRange { field: String, value: f32 },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
