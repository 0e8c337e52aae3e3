//! Application state.

use std::sync::Arc;

use crate::config::ApiConfig;
use crate::error::ApiResult;
use crate::services::MetadataService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub metadata: Arc<MetadataService>,
}

impl AppState {
    /// Create application state backed by Gemini.
    pub fn new(config: ApiConfig) -> ApiResult<Self> {
        let metadata = MetadataService::from_config(&config)?;
        Ok(Self::with_service(config, metadata))
    }

    /// Create application state around an existing service.
    pub fn with_service(config: ApiConfig, metadata: MetadataService) -> Self {
        Self {
            config,
            metadata: Arc::new(metadata),
        }
    }
}
