//! Business logic services.

pub mod metadata;

pub use metadata::{MetadataService, MISSING_VIDEO_URL};
