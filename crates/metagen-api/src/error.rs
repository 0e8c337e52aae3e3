//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use metagen_ai::AiError;
use metagen_media::MediaError;
use serde::Serialize;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

/// Message returned when a request fails in an unforeseen way.
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("No API keys provided.")]
    MissingApiKeys,

    #[error("Failed to download video: {0}")]
    Download(String),

    #[error("{0}")]
    RemoteService(String),

    #[error("{0}")]
    RemoteProcessing(String),

    #[error("{0}")]
    MalformedResponse(String),

    #[error("{0}")]
    Internal(String),

    #[error("{}", UNEXPECTED_ERROR_MESSAGE)]
    Unexpected,
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::MissingApiKeys | ApiError::Download(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::RemoteService(_)
            | ApiError::RemoteProcessing(_)
            | ApiError::MalformedResponse(_)
            | ApiError::Internal(_)
            | ApiError::Unexpected => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation",
            ApiError::MissingApiKeys => "missing_api_keys",
            ApiError::Download(_) => "download",
            ApiError::RemoteService(_) => "remote_service",
            ApiError::RemoteProcessing(_) => "remote_processing",
            ApiError::MalformedResponse(_) => "malformed_response",
            ApiError::Internal(_) => "internal",
            ApiError::Unexpected => "unexpected",
        }
    }
}

impl From<MediaError> for ApiError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::DownloadFailed { message } => ApiError::Download(message),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<AiError> for ApiError {
    fn from(err: AiError) -> Self {
        match err {
            AiError::NoApiKeys => ApiError::MissingApiKeys,
            AiError::Service(msg) => ApiError::RemoteService(msg),
            AiError::Network(e) => ApiError::RemoteService(e.to_string()),
            e @ (AiError::ProcessingFailed | AiError::ProcessingTimeout { .. }) => {
                ApiError::RemoteProcessing(e.to_string())
            }
            AiError::MalformedResponse(msg) => ApiError::MalformedResponse(msg),
            AiError::Io(e) => ApiError::Internal(e.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
