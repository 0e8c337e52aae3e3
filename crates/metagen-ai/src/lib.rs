//! Remote analysis for video stock metadata.
//!
//! This crate provides:
//! - The [`RemoteAnalysis`] contract (upload, status, inference, delete)
//! - A Gemini REST implementation with API-key rotation
//! - Bounded polling of remote processing state
//! - Normalization of loosely formatted model output into a [`MetadataRecord`]
//!
//! [`MetadataRecord`]: metagen_models::MetadataRecord

pub mod client;
pub mod error;
pub mod gemini;
pub mod keys;
pub mod normalize;
pub mod poll;
pub mod prompt;

pub use client::{AnalysisProvider, RemoteAnalysis};
pub use error::{AiError, AiResult};
pub use gemini::{GeminiClient, GeminiConfig, GeminiProvider};
pub use keys::{KeyPool, KeySelection};
pub use normalize::normalize_response;
pub use poll::{wait_until_ready, PollPolicy};
pub use prompt::SYSTEM_PROMPT;
