//! API configuration.

use std::path::PathBuf;
use std::time::Duration;

use metagen_ai::{GeminiConfig, KeySelection, PollPolicy};
use tracing::warn;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Max request body size
    pub max_body_size: usize,
    /// Directory for downloaded videos
    pub temp_dir: PathBuf,
    /// Gemini API keys
    pub api_keys: Vec<String>,
    /// How keys are picked per request
    pub key_selection: KeySelection,
    pub gemini: GeminiConfig,
    /// Delay between processing status checks
    pub poll_interval: Duration,
    /// Status checks before giving up; `None` means no limit
    pub poll_max_attempts: Option<u32>,
    /// Connect timeout for video downloads
    pub download_connect_timeout: Duration,
    pub metrics_enabled: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        let poll = PollPolicy::default();
        Self {
            host: "0.0.0.0".to_string(),
            port: 2411,
            cors_origins: vec!["*".to_string()],
            max_body_size: 1024 * 1024, // 1MB
            temp_dir: std::env::temp_dir(),
            api_keys: Vec::new(),
            key_selection: KeySelection::default(),
            gemini: GeminiConfig::default(),
            poll_interval: poll.interval,
            poll_max_attempts: poll.max_attempts,
            download_connect_timeout: Duration::from_secs(30),
            metrics_enabled: true,
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let key_selection = match std::env::var("KEY_SELECTION") {
            Ok(raw) => raw.parse().unwrap_or_else(|e| {
                warn!("{}, using round_robin", e);
                KeySelection::RoundRobin
            }),
            Err(_) => KeySelection::default(),
        };

        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2411),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_else(|_| vec!["*".to_string()]),
            max_body_size: std::env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1024 * 1024),
            temp_dir: std::env::var("TEMP_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| std::env::temp_dir()),
            api_keys: api_keys_from_env(),
            key_selection,
            gemini: GeminiConfig::from_env(),
            poll_interval: Duration::from_secs(
                std::env::var("POLL_INTERVAL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
            ),
            poll_max_attempts: parse_max_attempts(std::env::var("POLL_MAX_ATTEMPTS").ok().as_deref()),
            download_connect_timeout: Duration::from_secs(
                std::env::var("DOWNLOAD_CONNECT_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
            metrics_enabled: std::env::var("METRICS_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(true),
        }
    }

    /// Polling policy for remote processing.
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy::new(self.poll_interval, self.poll_max_attempts)
    }
}

/// `GEMINI_API_KEYS` (comma or newline separated), else `GEMINI_API_KEY`.
fn api_keys_from_env() -> Vec<String> {
    let raw = std::env::var("GEMINI_API_KEYS")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .or_else(|| std::env::var("GEMINI_API_KEY").ok())
        .unwrap_or_default();
    split_keys(&raw)
}

fn split_keys(raw: &str) -> Vec<String> {
    raw.split(|c| c == ',' || c == '\n')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

/// `0` disables the limit.
fn parse_max_attempts(raw: Option<&str>) -> Option<u32> {
    match raw.and_then(|s| s.trim().parse::<u32>().ok()) {
        Some(0) => None,
        Some(n) => Some(n),
        None => Some(60),
    }
}
