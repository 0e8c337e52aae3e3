//! Remote analysis contract.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use metagen_models::RemoteFile;

use crate::error::AiResult;

/// A service that accepts a video upload, processes it asynchronously and
/// answers prompts about it.
#[async_trait]
pub trait RemoteAnalysis: Send + Sync {
    /// Upload a local file. The returned handle may still be processing.
    async fn upload(&self, path: &Path, mime_type: &str) -> AiResult<RemoteFile>;

    /// Fetch the current state of an uploaded file.
    async fn get_status(&self, file: &RemoteFile) -> AiResult<RemoteFile>;

    /// Run the prompt against a ready file and return the raw model text.
    async fn infer(&self, file: &RemoteFile, prompt: &str) -> AiResult<String>;

    /// Delete an uploaded file.
    async fn delete(&self, file: &RemoteFile) -> AiResult<()>;
}

/// Hands out a client for one request (e.g. bound to the next API key).
pub trait AnalysisProvider: Send + Sync {
    fn connect(&self) -> AiResult<Arc<dyn RemoteAnalysis>>;
}
