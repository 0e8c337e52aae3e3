//! Remote analysis error types.

use thiserror::Error;

pub type AiResult<T> = Result<T, AiError>;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("No API keys provided.")]
    NoApiKeys,

    /// The service rejected or failed a call (credentials, quota,
    /// unsupported file type, unexpected reply).
    #[error("{0}")]
    Service(String),

    #[error("File processing failed.")]
    ProcessingFailed,

    #[error("File processing did not finish after {attempts} status checks.")]
    ProcessingTimeout { attempts: u32 },

    /// Model output could not be turned into a metadata record.
    #[error("{0}")]
    MalformedResponse(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AiError {
    pub fn service(msg: impl Into<String>) -> Self {
        Self::Service(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }
}
