//! Error types for the annotation-filter crate.
//!
//! Only malformed filter specifications produce errors. Malformed annotation
//! data never does: a missing or unparsable field simply fails to match.

use thiserror::Error;

/// Errors that can occur when building or compiling a filter specification.
#[derive(Debug, Error)]
pub enum FilterError {
    /// A field filter names an operator other than `and` / `or`.
    #[error("unknown operator '{operator}' for field '{field}' (expected 'and' or 'or')")]
    UnknownOperator { field: String, operator: String },

    /// A `since` term is not a non-negative number of seconds.
    #[error("invalid since term '{term}': expected a non-negative number of seconds")]
    InvalidSinceTerm { term: String },

    /// The specification could not be read from JSON.
    #[error("invalid filter specification: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for filter operations.
pub type Result<T> = std::result::Result<T, FilterError>;
