//! Shared data models for the video metadata service.
//!
//! This crate provides Serde-serializable types for:
//! - Incoming metadata requests
//! - Generated stock metadata records
//! - Remote file handles and their processing state
//! - Request lifecycle stages

pub mod file;
pub mod metadata;
pub mod request;
pub mod stage;

// Re-export common types
pub use file::{RemoteFile, RemoteFileState};
pub use metadata::MetadataRecord;
pub use request::MetadataRequest;
pub use stage::RequestStage;
