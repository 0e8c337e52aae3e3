//! Metadata generation lifecycle.
//!
//! One request runs strictly in order:
//!
//! ```text
//! download -> upload -> poll -> infer -> normalize
//! ```
//!
//! Once the video is on disk, the local file and (after a successful upload)
//! the remote file are released exactly once, whatever the outcome. The
//! lifecycle runs on its own task so a client hanging up cannot cancel it
//! halfway through cleanup.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use futures_util::FutureExt;
use metagen_ai::{
    normalize_response, wait_until_ready, AnalysisProvider, GeminiProvider, KeyPool,
    PollPolicy, RemoteAnalysis, SYSTEM_PROMPT,
};
use metagen_media::{Fetcher, TempArtifact};
use metagen_models::{MetadataRecord, MetadataRequest, RemoteFile, RequestStage};
use tracing::{error, info, info_span, warn, Instrument};

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::metrics;

/// Returned when the request carries no usable `video_url`.
pub const MISSING_VIDEO_URL: &str = "Missing video_url in request body";

/// Where a request got to, and what it has to release.
struct Progress {
    stage: RequestStage,
    stage_started: Instant,
    uploaded: Option<RemoteFile>,
}

impl Progress {
    fn new() -> Self {
        Self {
            stage: RequestStage::Received,
            stage_started: Instant::now(),
            uploaded: None,
        }
    }

    /// Close the current stage and open the next one.
    fn enter(&mut self, next: RequestStage) {
        self.finish_stage();
        info!(stage = %next, "Entering stage");
        self.stage = next;
    }

    fn finish_stage(&mut self) {
        if self.stage != RequestStage::Received {
            metrics::record_stage_duration(self.stage, self.stage_started.elapsed().as_secs_f64());
        }
        self.stage_started = Instant::now();
    }
}

/// Runs the download/analyze/cleanup lifecycle.
pub struct MetadataService {
    fetcher: Fetcher,
    provider: Arc<dyn AnalysisProvider>,
    poll: PollPolicy,
    temp_dir: PathBuf,
}

impl MetadataService {
    pub fn new(
        fetcher: Fetcher,
        provider: Arc<dyn AnalysisProvider>,
        poll: PollPolicy,
        temp_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            fetcher,
            provider,
            poll,
            temp_dir: temp_dir.into(),
        }
    }

    /// Build the service with a Gemini provider from config.
    pub fn from_config(config: &ApiConfig) -> ApiResult<Self> {
        let fetcher = Fetcher::new(config.download_connect_timeout)?;
        let keys = KeyPool::new(config.api_keys.iter().cloned(), config.key_selection);
        let provider = GeminiProvider::new(config.gemini.clone(), keys)?;
        match provider.key_count() {
            0 => warn!("No Gemini API keys configured, metadata requests will be rejected"),
            n => info!("Gemini provider ready with {} API keys ({:?})", n, config.key_selection),
        }

        Ok(Self::new(
            fetcher,
            Arc::new(provider),
            config.poll_policy(),
            config.temp_dir.clone(),
        ))
    }

    /// Generate metadata for the video referenced by `request`.
    ///
    /// Validation happens inline; everything after it runs on a spawned task
    /// that always finishes its cleanup, even if the caller stops waiting.
    pub async fn generate(
        self: &Arc<Self>,
        request: &MetadataRequest,
        request_id: &str,
    ) -> ApiResult<MetadataRecord> {
        let Some(video_url) = request.video_url().map(str::to_string) else {
            metrics::record_metadata_outcome("validation");
            return Err(ApiError::validation(MISSING_VIDEO_URL));
        };

        let span = info_span!("metadata_request", request_id = %request_id, video_url = %video_url);
        let service = Arc::clone(self);
        let task = tokio::spawn(async move { service.run(video_url).await }.instrument(span));

        let result = match task.await {
            Ok(result) => result,
            Err(e) => {
                error!("Metadata task ended abnormally: {}", e);
                Err(ApiError::Unexpected)
            }
        };

        match &result {
            Ok(_) => metrics::record_metadata_outcome("success"),
            Err(e) => metrics::record_metadata_outcome(e.kind()),
        }
        result
    }

    async fn run(&self, video_url: String) -> ApiResult<MetadataRecord> {
        let client = self.provider.connect()?;
        let mut progress = Progress::new();

        progress.enter(RequestStage::Downloading);
        let artifact = match self.fetcher.fetch(&video_url, &self.temp_dir).await {
            Ok(artifact) => artifact,
            Err(e) => {
                warn!(stage = %progress.stage, "Failed to download video: {}", e);
                return Err(e.into());
            }
        };
        metrics::record_download_bytes(artifact.size_bytes());
        info!(
            path = %artifact.path().display(),
            size_bytes = artifact.size_bytes(),
            "Video saved"
        );

        let outcome = AssertUnwindSafe(self.analyze(client.as_ref(), &artifact, &mut progress))
            .catch_unwind()
            .await;

        let result = match outcome {
            Ok(result) => result,
            Err(panic) => {
                error!(stage = %progress.stage, "Pipeline panicked: {}", panic_message(&*panic));
                Err(ApiError::Unexpected)
            }
        };

        match &result {
            Ok(_) => progress.enter(RequestStage::Responded),
            Err(e) => {
                warn!(stage = %progress.stage, kind = e.kind(), "Metadata request failed: {}", e);
                progress.enter(RequestStage::Failed);
            }
        }

        release(client.as_ref(), progress.uploaded.as_ref(), artifact).await;
        result
    }

    async fn analyze(
        &self,
        client: &dyn RemoteAnalysis,
        artifact: &TempArtifact,
        progress: &mut Progress,
    ) -> ApiResult<MetadataRecord> {
        progress.enter(RequestStage::Uploading);
        let file = client.upload(artifact.path(), artifact.mime_type()).await?;
        info!(file = %file.name, uri = %file.uri, state = %file.state, "Uploaded video");
        progress.uploaded = Some(file.clone());

        progress.enter(RequestStage::Processing);
        let (file, attempts) = wait_until_ready(client, file, &self.poll).await?;
        metrics::record_poll_attempts(attempts);

        progress.enter(RequestStage::Inferring);
        let raw = client.infer(&file, SYSTEM_PROMPT).await?;

        progress.enter(RequestStage::Normalizing);
        let record = normalize_response(&raw)?;

        Ok(record)
    }
}

/// Delete the remote file (if any) and the local artifact. Failures are
/// logged and never change the response.
async fn release(client: &dyn RemoteAnalysis, uploaded: Option<&RemoteFile>, artifact: TempArtifact) {
    if let Some(file) = uploaded {
        match client.delete(file).await {
            Ok(()) => info!(file = %file.name, "Deleted remote file"),
            Err(e) => {
                warn!(file = %file.name, "Failed to delete remote file: {}", e);
                metrics::record_cleanup_failure("remote");
            }
        }
    }

    let path = artifact.path().to_path_buf();
    if let Err(e) = artifact.remove().await {
        warn!(path = %path.display(), "Failed to delete temporary file: {}", e);
        metrics::record_cleanup_failure("local");
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
