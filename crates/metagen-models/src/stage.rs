//! Request lifecycle stages.

use serde::{Deserialize, Serialize};

/// Stage of a single metadata-generation request.
///
/// ```text
/// RECEIVED -> DOWNLOADING -> UPLOADING -> PROCESSING -> INFERRING -> NORMALIZING -> RESPONDED
///                                                                             \-> FAILED
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RequestStage {
    #[default]
    Received,
    Downloading,
    Uploading,
    Processing,
    Inferring,
    Normalizing,
    Responded,
    Failed,
}

impl RequestStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStage::Received => "received",
            RequestStage::Downloading => "downloading",
            RequestStage::Uploading => "uploading",
            RequestStage::Processing => "processing",
            RequestStage::Inferring => "inferring",
            RequestStage::Normalizing => "normalizing",
            RequestStage::Responded => "responded",
            RequestStage::Failed => "failed",
        }
    }
}

impl std::fmt::Display for RequestStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
