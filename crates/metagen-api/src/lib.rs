//! Axum HTTP API server for video stock metadata.
//!
//! This crate provides:
//! - `POST /generate-video-metadata`: download, upload, poll, infer, normalize
//! - Guaranteed cleanup of local and remote files on every exit path
//! - Health check and Prometheus metrics
//! - A start/stop handle for running the server in-process

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod services;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use server::ServerHandle;
pub use services::MetadataService;
pub use state::AppState;
