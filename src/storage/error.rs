//! Error types for blob storage operations

/// Result type for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Errors that can occur talking to blob storage
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The storage service answered with a non-success status
    #[error("Storage {operation} failed with status {status}: {body}")]
    Service {
        operation: String,
        status: u16,
        body: String,
    },

    /// The request never produced a response
    #[error("Storage request failed: {0}")]
    Transport(String),

    /// The request timed out
    #[error("Storage request timed out: {0}")]
    Timeout(String),

    /// Invalid configuration
    #[error("Invalid storage configuration: {0}")]
    InvalidConfiguration(String),
}

impl From<reqwest::Error> for StorageError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            StorageError::Timeout(err.to_string())
        } else {
            StorageError::Transport(err.to_string())
        }
    }
}
