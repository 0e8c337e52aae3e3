//! Video download over HTTP(S).
//!
//! Streams the response body straight into a [`TempArtifact`] so large videos
//! never sit in memory. Some CDNs reject non-browser clients, so every request
//! carries a desktop browser `User-Agent`.

use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::{Client, Response, StatusCode};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use url::Url;

use crate::artifact::{TempArtifact, DEFAULT_VIDEO_MIME};
use crate::error::{MediaError, MediaResult};

/// Browser identification sent with every download.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Downloads videos into temporary artifacts.
#[derive(Debug, Clone)]
pub struct Fetcher {
    http: Client,
}

impl Fetcher {
    /// Create a fetcher. Only connecting is time-limited; the body transfer
    /// is not, since videos can be large.
    pub fn new(connect_timeout: Duration) -> MediaResult<Self> {
        let http = Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| MediaError::internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { http })
    }

    /// Download `url` into a new artifact inside `dir`.
    ///
    /// # Errors
    ///
    /// - `DownloadFailed` for invalid URLs, network errors, non-success
    ///   statuses and interrupted transfers
    /// - `Io` if the artifact cannot be written
    ///
    /// No artifact is left behind on any error.
    pub async fn fetch(&self, url: &str, dir: &Path) -> MediaResult<TempArtifact> {
        let parsed = Url::parse(url)
            .map_err(|e| MediaError::download_failed(format!("Invalid URL '{}': {}", url, e)))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(MediaError::download_failed(format!(
                "Unsupported URL scheme '{}' in {}",
                parsed.scheme(),
                url
            )));
        }

        info!("Downloading video from {}", url);

        let response = self
            .http
            .get(parsed)
            .send()
            .await
            .map_err(|e| MediaError::download_failed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MediaError::download_failed(status_error_message(status, url)));
        }

        let mime_type = video_mime_type(&response);
        let (mut artifact, mut file) = TempArtifact::create(dir, mime_type).await?;

        if let Err(e) = write_body(response, &mut file, &mut artifact).await {
            drop(file);
            if let Err(cleanup) = artifact.remove().await {
                warn!("Failed to remove partial download: {}", cleanup);
            }
            return Err(e);
        }

        info!(
            "Downloaded {} bytes to {}",
            artifact.size_bytes(),
            artifact.path().display()
        );
        Ok(artifact)
    }
}

async fn write_body(
    response: Response,
    file: &mut File,
    artifact: &mut TempArtifact,
) -> MediaResult<()> {
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| {
            MediaError::download_failed(format!("Connection interrupted: {}", e))
        })?;
        file.write_all(&chunk).await?;
        artifact.add_bytes(chunk.len() as u64);
    }

    file.flush().await?;
    debug!("Finished writing {}", artifact.path().display());
    Ok(())
}

/// Pick the upload MIME type from the origin's `Content-Type`.
fn video_mime_type(response: &Response) -> String {
    response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or("").trim().to_ascii_lowercase())
        .filter(|v| v.starts_with("video/"))
        .unwrap_or_else(|| DEFAULT_VIDEO_MIME.to_string())
}

/// Describe a failed status the way HTTP clients conventionally do,
/// e.g. `404 Client Error: Not Found for url: https://...`.
fn status_error_message(status: StatusCode, url: &str) -> String {
    let kind = if status.is_client_error() {
        "Client Error"
    } else if status.is_server_error() {
        "Server Error"
    } else {
        "HTTP Error"
    };
    format!(
        "{} {}: {} for url: {}",
        status.as_u16(),
        kind,
        status.canonical_reason().unwrap_or("Unknown"),
        url
    )
}
