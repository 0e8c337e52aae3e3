//! Gemini AI client for video stock metadata.
//!
//! Talks to the Gemini REST API directly: the Files API for upload, status
//! and delete, and `generateContent` for inference. Uploads use the
//! resumable protocol (start a session, then upload and finalize in one
//! request) and stream the file from disk.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use metagen_models::{RemoteFile, RemoteFileState};
use reqwest::header::CONTENT_LENGTH;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::client::{AnalysisProvider, RemoteAnalysis};
use crate::error::{AiError, AiResult};
use crate::keys::KeyPool;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Configuration for Gemini clients.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API root, without the version segment
    pub base_url: String,
    /// Model used for `generateContent`
    pub model: String,
    /// Timeout for API calls; the byte upload is only bound by `connect_timeout`
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(300),
            connect_timeout: Duration::from_secs(30),
        }
    }
}

impl GeminiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("GEMINI_BASE_URL")
                .map(|s| s.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            model: std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            timeout: Duration::from_secs(
                std::env::var("GEMINI_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(300),
            ),
            connect_timeout: Duration::from_secs(
                std::env::var("GEMINI_CONNECT_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }
}

#[derive(Debug, Serialize)]
struct StartUploadRequest<'a> {
    file: UploadFileInfo<'a>,
}

#[derive(Debug, Serialize)]
struct UploadFileInfo<'a> {
    display_name: &'a str,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    file: FileResource,
}

/// Gemini `File` resource.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileResource {
    name: String,
    #[serde(default)]
    uri: String,
    #[serde(default)]
    mime_type: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    error: Option<StatusDetail>,
}

#[derive(Debug, Deserialize)]
struct StatusDetail {
    #[serde(default)]
    message: String,
}

impl FileResource {
    fn into_remote(self, fallback_mime: &str) -> RemoteFile {
        if let Some(err) = &self.error {
            warn!("Gemini reported an error for {}: {}", self.name, err.message);
        }
        RemoteFile::new(
            self.name,
            self.uri,
            self.mime_type.unwrap_or_else(|| fallback_mime.to_string()),
            RemoteFileState::from_vendor(self.state.as_deref()),
        )
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    File { file_data: FileData },
    Text { text: String },
}

#[derive(Debug, Serialize)]
struct FileData {
    mime_type: String,
    file_uri: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

/// Google API error envelope.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: u16,
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: String,
}

/// Gemini API client bound to a single API key.
pub struct GeminiClient {
    http: Client,
    api_key: String,
    config: GeminiConfig,
}

impl GeminiClient {
    /// Create a new Gemini client.
    pub fn new(api_key: impl Into<String>, config: GeminiConfig) -> AiResult<Self> {
        let http = http_client(&config)?;
        Ok(Self::with_http(http, api_key, config))
    }

    /// Create a client that shares an existing connection pool.
    pub fn with_http(http: Client, api_key: impl Into<String>, config: GeminiConfig) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            config,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url, path)
    }

    async fn start_upload(&self, display_name: &str, size: u64, mime_type: &str) -> AiResult<String> {
        let response = self
            .http
            .post(self.url("upload/v1beta/files"))
            .query(&[("key", &self.api_key)])
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", size)
            .header("X-Goog-Upload-Header-Content-Type", mime_type)
            .json(&StartUploadRequest {
                file: UploadFileInfo { display_name },
            })
            .timeout(self.config.timeout)
            .send()
            .await?;

        let response = check_status(response, "Upload").await?;

        response
            .headers()
            .get("x-goog-upload-url")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| AiError::service("Upload session did not return an upload URL"))
    }
}

#[async_trait]
impl RemoteAnalysis for GeminiClient {
    async fn upload(&self, path: &Path, mime_type: &str) -> AiResult<RemoteFile> {
        let size = tokio::fs::metadata(path).await?.len();
        let display_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("video.mp4");

        info!("Uploading file: {} ({} bytes)", path.display(), size);

        let upload_url = self.start_upload(display_name, size, mime_type).await?;
        let file = tokio::fs::File::open(path).await?;

        let response = self
            .http
            .post(&upload_url)
            .header(CONTENT_LENGTH, size)
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .body(file)
            .send()
            .await?;

        let uploaded: UploadResponse = parse_json(check_status(response, "Upload").await?).await?;
        let remote = uploaded.file.into_remote(mime_type);

        info!("Completed upload: {}", remote.uri);
        Ok(remote)
    }

    async fn get_status(&self, file: &RemoteFile) -> AiResult<RemoteFile> {
        let response = self
            .http
            .get(self.url(&format!("v1beta/{}", file.name)))
            .query(&[("key", &self.api_key)])
            .timeout(self.config.timeout)
            .send()
            .await?;

        let resource: FileResource = parse_json(check_status(response, "Status check").await?).await?;
        let refreshed = resource.into_remote(&file.mime_type);

        debug!("File {} is {}", refreshed.name, refreshed.state);
        Ok(refreshed)
    }

    async fn infer(&self, file: &RemoteFile, prompt: &str) -> AiResult<String> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part::File {
                        file_data: FileData {
                            mime_type: file.mime_type.clone(),
                            file_uri: file.uri.clone(),
                        },
                    },
                    Part::Text {
                        text: prompt.to_string(),
                    },
                ],
            }],
        };

        info!("Requesting metadata from model {}", self.config.model);

        let response = self
            .http
            .post(self.url(&format!(
                "v1beta/models/{}:generateContent",
                self.config.model
            )))
            .query(&[("key", &self.api_key)])
            .json(&request)
            .timeout(self.config.timeout)
            .send()
            .await?;

        let generated: GenerateResponse =
            parse_json(check_status(response, "Generation").await?).await?;

        let candidate = generated
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| AiError::malformed("Model returned no candidates"))?;

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(AiError::malformed(format!(
                "Model returned no text (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )));
        }

        info!("Generated content: {}", text);
        Ok(text)
    }

    async fn delete(&self, file: &RemoteFile) -> AiResult<()> {
        let response = self
            .http
            .delete(self.url(&format!("v1beta/{}", file.name)))
            .query(&[("key", &self.api_key)])
            .timeout(self.config.timeout)
            .send()
            .await?;

        check_status(response, "Delete").await?;
        info!("Deleted remote file: {}", file.name);
        Ok(())
    }
}

/// Shared HTTP client. No overall timeout: uploads of large videos can run
/// long, so per-call timeouts are set on each non-upload request instead.
fn http_client(config: &GeminiConfig) -> reqwest::Result<Client> {
    Client::builder().connect_timeout(config.connect_timeout).build()
}

/// Turn a non-success response into a service error with the API's message.
async fn check_status(response: Response, operation: &str) -> AiResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let detail = match serde_json::from_str::<ErrorEnvelope>(&body) {
        Ok(envelope) => format!(
            "{} {}. {}",
            envelope.error.code, envelope.error.status, envelope.error.message
        ),
        Err(_) => format!("{} {}", status.as_u16(), body.trim()),
    };

    Err(AiError::service(format!("{} failed: {}", operation, detail)))
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> AiResult<T> {
    let body = response.text().await?;
    serde_json::from_str(&body)
        .map_err(|e| AiError::service(format!("Failed to parse Gemini response: {}", e)))
}

/// Builds a [`GeminiClient`] per request with the next key from the pool.
pub struct GeminiProvider {
    http: Client,
    config: GeminiConfig,
    keys: KeyPool,
}

impl GeminiProvider {
    pub fn new(config: GeminiConfig, keys: KeyPool) -> AiResult<Self> {
        let http = http_client(&config)?;
        Ok(Self { http, config, keys })
    }

    /// Number of keys available for rotation.
    pub fn key_count(&self) -> usize {
        self.keys.len()
    }
}

impl AnalysisProvider for GeminiProvider {
    fn connect(&self) -> AiResult<Arc<dyn RemoteAnalysis>> {
        let key = self.keys.select().ok_or(AiError::NoApiKeys)?;
        Ok(Arc::new(GeminiClient::with_http(
            self.http.clone(),
            key,
            self.config.clone(),
        )))
    }
}
