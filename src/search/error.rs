//! Error types for search operations

use crate::error::AppError;
use crate::storage::StorageError;

/// Result type for search operations
pub type SearchResult<T> = std::result::Result<T, SearchError>;

/// Errors that can occur during search operations
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The search service answered with a non-success status
    #[error("Search {operation} failed with status {status}: {body}")]
    Service {
        operation: String,
        status: u16,
        body: String,
    },

    /// The request never produced a response
    #[error("Search request failed: {0}")]
    Transport(String),

    /// The request timed out
    #[error("Search request timed out: {0}")]
    Timeout(String),

    /// The service response could not be decoded
    #[error("Invalid search response: {0}")]
    InvalidResponse(String),

    /// Blob storage failure during index lifecycle or import
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Index name not served by this application
    #[error("Unknown index: {0}")]
    UnknownIndex(String),

    /// Rejected caller input
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SearchError::Timeout(err.to_string())
        } else if err.is_decode() {
            SearchError::InvalidResponse(err.to_string())
        } else {
            SearchError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SearchError {
    fn from(err: serde_json::Error) -> Self {
        SearchError::InvalidResponse(err.to_string())
    }
}

impl From<SearchError> for AppError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::UnknownIndex(name) => AppError::NotFound(format!("index '{}'", name)),
            SearchError::InvalidRequest(msg) => AppError::Validation(msg),
            SearchError::InvalidConfiguration(msg) => AppError::Configuration(msg),
            SearchError::Timeout(msg) => AppError::Timeout(msg),
            SearchError::Service { .. }
            | SearchError::Transport(_)
            | SearchError::InvalidResponse(_) => AppError::Upstream {
                upstream: "search".to_string(),
                message: err.to_string(),
            },
            SearchError::Storage(StorageError::Timeout(msg)) => AppError::Timeout(msg),
            SearchError::Storage(StorageError::InvalidConfiguration(msg)) => {
                AppError::Configuration(msg)
            }
            SearchError::Storage(storage) => AppError::Upstream {
                upstream: "storage".to_string(),
                message: storage.to_string(),
            },
        }
    }
}
