//! Error types for the retail feature pipeline

use thiserror::Error;

/// Result type alias for feature pipeline operations
pub type Result<T> = std::result::Result<T, FeatureError>;

/// Coarse error classification used by callers that only care about the
/// failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// An expected column is absent or has the wrong type
    Schema,
    /// A value does not parse under the expected textual pattern
    Format,
    /// Degenerate statistics (zero variance, zero range, empty column)
    Arithmetic,
    /// Everything else (configuration, I/O, internal dataframe errors)
    Other,
}

/// Main error type for encoding and scaling
#[derive(Error, Debug)]
pub enum FeatureError {
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Column {column} must be numeric, found {dtype}")]
    NonNumericColumn { column: String, dtype: String },

    #[error("Invalid value {value:?} in column {column}: expected {expected}")]
    FormatError {
        column: String,
        value: String,
        expected: &'static str,
    },

    #[error("Unknown category {value:?} in column {column}")]
    UnknownCategory { column: String, value: String },

    #[error("Cannot scale column {column}: {reason}")]
    ArithmeticError { column: String, reason: String },

    #[error("Model not fitted")]
    NotFitted,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl FeatureError {
    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            FeatureError::ColumnNotFound(_) | FeatureError::NonNumericColumn { .. } => {
                ErrorKind::Schema
            }
            FeatureError::FormatError { .. } | FeatureError::UnknownCategory { .. } => {
                ErrorKind::Format
            }
            FeatureError::ArithmeticError { .. } => ErrorKind::Arithmetic,
            _ => ErrorKind::Other,
        }
    }

    /// Whether the input table failed validation (schema or value format)
    pub fn is_validation(&self) -> bool {
        matches!(self.kind(), ErrorKind::Schema | ErrorKind::Format)
    }

    pub(crate) fn missing(column: &str) -> Self {
        FeatureError::ColumnNotFound(column.to_string())
    }
}

impl From<polars::error::PolarsError> for FeatureError {
    fn from(err: polars::error::PolarsError) -> Self {
        FeatureError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for FeatureError {
    fn from(err: serde_json::Error) -> Self {
        FeatureError::SerializationError(err.to_string())
    }
}
