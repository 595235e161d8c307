//! Errors surfaced by the dataset and summarizer core.

use thiserror::Error;

/// Recoverable failures of [`crate::summary::summarize`] and dataset construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SummaryError {
    #[error("column '{column}' not found in dataset")]
    ColumnNotFound { column: String },

    #[error("dataset has no rows to summarize")]
    EmptyInput,

    #[error("column '{column}' holds a non-numeric value at row {row}")]
    NonNumericValue { column: String, row: usize },

    #[error("column '{column}' has {actual} values, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },
}

impl SummaryError {
    pub(crate) fn column_not_found(column: &str) -> Self {
        SummaryError::ColumnNotFound {
            column: column.to_string(),
        }
    }
}
