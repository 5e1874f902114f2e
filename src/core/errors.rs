//! Custom error types for translation operations

use thiserror::Error;

use crate::core::translator::BatchFailure;

/// Translation-related errors
#[derive(Error, Debug)]
pub enum TranslationError {
    /// API request failed
    #[error("API error: {status} - {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },

    /// Rate limit exceeded
    #[error("Rate limit exceeded. Retry after {retry_after:?} seconds")]
    RateLimitError {
        /// Value of the `Retry-After` header, when present
        retry_after: Option<u64>,
    },

    /// Network error
    #[error("Network error: {message}")]
    NetworkError {
        /// Transport failure description
        message: String,
    },

    /// Invalid response from API
    #[error("Invalid response: {message}")]
    InvalidResponseError {
        /// What was wrong with the response
        message: String,
    },

    /// The service refused to answer the prompt
    #[error("Prompt blocked by service: {reason}")]
    Blocked {
        /// Block reason reported by the service
        reason: String,
    },

    /// Request timeout
    #[error("Request timeout")]
    TimeoutError,

    /// File operation error
    #[error("File error: {path} - {message}")]
    FileError {
        /// Offending path
        path: String,
        /// What went wrong
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        /// What is wrong with the configuration
        message: String,
    },

    /// Target column absent from the dataset header
    #[error("Missing column: {column}")]
    MissingColumn {
        /// Requested column name
        column: String,
    },

    /// A cell of the source column has no text
    #[error("Empty value in column {column} at row {row_index}")]
    EmptyCell {
        /// Source column name
        column: String,
        /// 0-based data row index
        row_index: usize,
    },

    /// Appended column does not line up with the table
    #[error("Row count mismatch: expected {expected}, got {got}")]
    RowCountMismatch {
        /// Rows in the table
        expected: usize,
        /// Values supplied
        got: usize,
    },

    /// A data row does not have as many fields as the header
    #[error("Malformed row {row_index}: expected {expected} fields, got {got}")]
    MalformedRow {
        /// 0-based data row index
        row_index: usize,
        /// Header width
        expected: usize,
        /// Fields in the row
        got: usize,
    },

    /// Column translation aborted part-way
    #[error("{0}")]
    BatchAborted(Box<BatchFailure>),

    /// Wrapper for anyhow errors
    #[error("Internal error: {0}")]
    InternalError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Reqwest error
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Config file loading error
    #[error("Config load error: {0}")]
    ConfigLoadError(#[from] config::ConfigError),
}

impl TranslationError {
    /// Whether the error came from the remote generation service
    pub fn is_service_failure(&self) -> bool {
        match self {
            TranslationError::BatchAborted(failure) => failure.source.is_service_failure(),
            other => matches!(
                other,
                TranslationError::ApiError { .. }
                    | TranslationError::RateLimitError { .. }
                    | TranslationError::NetworkError { .. }
                    | TranslationError::InvalidResponseError { .. }
                    | TranslationError::Blocked { .. }
                    | TranslationError::TimeoutError
                    | TranslationError::HttpError(_)
            ),
        }
    }
}

impl From<BatchFailure> for TranslationError {
    fn from(failure: BatchFailure) -> Self {
        TranslationError::BatchAborted(Box::new(failure))
    }
}

impl From<anyhow::Error> for TranslationError {
    fn from(err: anyhow::Error) -> Self {
        TranslationError::InternalError(err.to_string())
    }
}

/// Result type for translation operations
pub type Result<T> = std::result::Result<T, TranslationError>;
