//! Error types for the salary analysis pipeline.
//!
//! Every stage of the library returns `PipelineError` so that callers can
//! distinguish data-access failures from schema problems and model failures.
//! The binary wraps these in `anyhow` with additional context.

use std::path::PathBuf;

use polars::prelude::PolarsError;

/// Convenience alias used throughout the pipeline modules.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

/// Errors that can occur while loading, cleaning, describing, or modeling.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The input file is missing, unreadable, malformed, or of an unsupported format.
    #[error("Failed to read dataset {path}: {message}")]
    DataAccess { path: PathBuf, message: String },

    /// One or more columns the pipeline references are absent from the table.
    #[error("Schema mismatch: missing column(s) {}", missing.join(", "))]
    SchemaMismatch { missing: Vec<String> },

    /// A column holds a value that cannot be read as the expected type.
    #[error("Column '{column}' has an unexpected type: expected {expected}, found {found}")]
    TypeMismatch {
        column: String,
        expected: String,
        found: String,
    },

    /// A required value is null in a row the pipeline keeps.
    #[error("Column '{column}' is missing a value in row {row}")]
    MissingValue { column: String, row: usize },

    /// A value is present but outside its valid domain (e.g. a negative game count).
    #[error("Column '{column}' has an invalid value in row {row}: {message}")]
    InvalidValue {
        column: String,
        row: usize,
        message: String,
    },

    /// The requested field does not exist in the cleaned table.
    #[error("Field '{0}' not found in table")]
    FieldNotFound(String),

    /// Not enough usable rows for the requested computation.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// The design matrix cannot be factorized.
    #[error("Singular design matrix: {0}")]
    SingularDesign(String),

    /// A configuration value is out of range or inconsistent.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failure surfaced from polars while manipulating the table.
    #[error(transparent)]
    Polars(#[from] PolarsError),
}

impl PipelineError {
    /// Build a `DataAccess` error from any displayable cause.
    pub fn data_access(path: impl Into<PathBuf>, message: impl std::fmt::Display) -> Self {
        PipelineError::DataAccess {
            path: path.into(),
            message: message.to_string(),
        }
    }
}
