//! Liveness handlers.

use axum::Json;
use chrono::Utc;
use serde::Serialize;

/// Banner returned by `GET /`.
pub const INDEX_MESSAGE: &str = "Video Metadata API is Working!";

/// Health response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

/// Plain-text banner.
pub async fn index() -> &'static str {
    INDEX_MESSAGE
}

/// Health check endpoint (liveness probe).
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}
