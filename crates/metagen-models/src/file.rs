//! Remote file handles.
//!
//! A [`RemoteFile`] references a video uploaded to the analysis service.
//! The service processes uploads asynchronously, so every handle carries the
//! last observed [`RemoteFileState`].

use serde::{Deserialize, Serialize};

/// Processing state of an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RemoteFileState {
    /// Upload accepted, processing not yet reported
    #[default]
    Pending,
    /// Service is still processing the file
    Processing,
    /// File can be used for inference
    Ready,
    /// Service gave up on the file
    Failed,
}

impl RemoteFileState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RemoteFileState::Pending => "PENDING",
            RemoteFileState::Processing => "PROCESSING",
            RemoteFileState::Ready => "READY",
            RemoteFileState::Failed => "FAILED",
        }
    }

    /// Map a vendor state string onto the local state.
    ///
    /// Gemini reports `STATE_UNSPECIFIED`, `PROCESSING`, `ACTIVE` and `FAILED`.
    /// Unknown values are treated as pending so they keep being polled.
    pub fn from_vendor(state: Option<&str>) -> Self {
        match state {
            Some("PROCESSING") => RemoteFileState::Processing,
            Some("ACTIVE") => RemoteFileState::Ready,
            Some("FAILED") => RemoteFileState::Failed,
            _ => RemoteFileState::Pending,
        }
    }

    /// Check if this is a terminal state (no more polling needed).
    pub fn is_terminal(&self) -> bool {
        matches!(self, RemoteFileState::Ready | RemoteFileState::Failed)
    }
}

impl std::fmt::Display for RemoteFileState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Handle to a file stored on the analysis service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFile {
    /// Resource name, e.g. `files/abc123`
    pub name: String,
    /// URI used to reference the file in inference requests
    pub uri: String,
    pub mime_type: String,
    pub state: RemoteFileState,
}

impl RemoteFile {
    pub fn new(
        name: impl Into<String>,
        uri: impl Into<String>,
        mime_type: impl Into<String>,
        state: RemoteFileState,
    ) -> Self {
        Self {
            name: name.into(),
            uri: uri.into(),
            mime_type: mime_type.into(),
            state,
        }
    }

    /// Copy of this handle with a refreshed state.
    pub fn with_state(&self, state: RemoteFileState) -> Self {
        Self {
            state,
            ..self.clone()
        }
    }
}
