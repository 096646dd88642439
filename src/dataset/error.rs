//! Dataset I/O error types

use thiserror::Error;

/// Errors that can occur while reading or writing registration datasets
#[derive(Error, Debug)]
pub enum DatasetError {
    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reader or writer failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A required header is absent
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// A data row could not be turned into a record
    #[error("Line {line}: {reason}")]
    InvalidRow { line: usize, reason: String },
}

/// Result type alias for dataset operations
pub type DatasetResult<T> = Result<T, DatasetError>;
