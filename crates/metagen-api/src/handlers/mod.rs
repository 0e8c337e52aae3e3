//! HTTP request handlers.

pub mod health;
pub mod metadata;

pub use health::{health, index};
pub use metadata::generate_video_metadata;
