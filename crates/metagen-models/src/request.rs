//! Incoming metadata request.

use serde::{Deserialize, Serialize};

/// Body of `POST /generate-video-metadata`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetadataRequest {
    #[serde(default)]
    pub video_url: Option<String>,
}

impl MetadataRequest {
    /// Parse a raw request body.
    ///
    /// Anything that does not decode into a request (not JSON, wrong shape,
    /// non-string `video_url`) yields an empty request rather than an error,
    /// so the caller reports it the same way as a missing field.
    pub fn from_body(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }

    /// The trimmed video URL, if present and non-empty.
    pub fn video_url(&self) -> Option<&str> {
        self.video_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}
