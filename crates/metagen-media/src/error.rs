//! Error types for media operations.

use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while fetching a video.
#[derive(Debug, Error)]
pub enum MediaError {
    /// Network failure, bad URL or non-success status from the origin.
    #[error("{message}")]
    DownloadFailed { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MediaError {
    /// Create a download failure error.
    pub fn download_failed(message: impl Into<String>) -> Self {
        Self::DownloadFailed {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Whether the failure came from the origin rather than local storage.
    pub fn is_download_failure(&self) -> bool {
        matches!(self, MediaError::DownloadFailed { .. })
    }
}
