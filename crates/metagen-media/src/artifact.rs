//! Temporary video artifacts.

use std::path::{Path, PathBuf};

use tokio::fs::{File, OpenOptions};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::MediaResult;

/// MIME type assumed when the origin does not report a video type.
pub const DEFAULT_VIDEO_MIME: &str = "video/mp4";

/// A downloaded video stored under a unique name in a temp directory.
///
/// [`TempArtifact::remove`] consumes the artifact, so it can only be called
/// once. If an artifact is dropped without being removed, the file is
/// deleted synchronously in `Drop`.
#[derive(Debug)]
pub struct TempArtifact {
    path: PathBuf,
    mime_type: String,
    size_bytes: u64,
    removed: bool,
}

impl TempArtifact {
    /// Create a new, empty artifact file `<dir>/<uuid>.mp4`.
    pub async fn create(dir: &Path, mime_type: impl Into<String>) -> MediaResult<(Self, File)> {
        let path = dir.join(format!("{}.mp4", Uuid::new_v4()));

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;

        debug!("Created temporary file: {}", path.display());

        Ok((
            Self {
                path,
                mime_type: mime_type.into(),
                size_bytes: 0,
                removed: false,
            },
            file,
        ))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub(crate) fn add_bytes(&mut self, len: u64) {
        self.size_bytes += len;
    }

    /// Delete the file. A file that is already gone counts as removed.
    pub async fn remove(mut self) -> MediaResult<()> {
        self.removed = true;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                debug!("Deleted temporary file: {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl Drop for TempArtifact {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => warn!(
                "Temporary file {} was dropped without cleanup, deleted it",
                self.path.display()
            ),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                "Failed to delete dropped temporary file {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let (artifact, file) = TempArtifact::create(dir.path(), DEFAULT_VIDEO_MIME)
            .await
            .unwrap();
        drop(file);

        let path = artifact.path().to_path_buf();
        assert!(path.exists());
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("mp4"));
        assert_eq!(artifact.mime_type(), "video/mp4");

        artifact.remove().await.unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_names_are_unique() {
        let dir = tempfile::tempdir().unwrap();
        let (a, _fa) = TempArtifact::create(dir.path(), DEFAULT_VIDEO_MIME).await.unwrap();
        let (b, _fb) = TempArtifact::create(dir.path(), DEFAULT_VIDEO_MIME).await.unwrap();
        assert_ne!(a.path(), b.path());
    }

    #[tokio::test]
    async fn test_drop_deletes_file() {
        let dir = tempfile::tempdir().unwrap();
        let (artifact, file) = TempArtifact::create(dir.path(), DEFAULT_VIDEO_MIME)
            .await
            .unwrap();
        drop(file);
        let path = artifact.path().to_path_buf();

        drop(artifact);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_remove_missing_file_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let (artifact, file) = TempArtifact::create(dir.path(), DEFAULT_VIDEO_MIME)
            .await
            .unwrap();
        drop(file);
        std::fs::remove_file(artifact.path()).unwrap();

        assert!(artifact.remove().await.is_ok());
    }
}
