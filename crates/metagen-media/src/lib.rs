//! Video fetching for metadata generation.
//!
//! This crate provides:
//! - Streaming download of a remote video over HTTP(S)
//! - Uniquely named temporary artifacts that are removed exactly once

pub mod artifact;
pub mod download;
pub mod error;

pub use artifact::TempArtifact;
pub use download::{Fetcher, BROWSER_USER_AGENT};
pub use error::{MediaError, MediaResult};
