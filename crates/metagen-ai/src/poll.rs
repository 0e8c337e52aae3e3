//! Waiting for remote processing to finish.

use std::time::Duration;

use metagen_models::{RemoteFile, RemoteFileState};
use tracing::{info, warn};

use crate::client::RemoteAnalysis;
use crate::error::{AiError, AiResult};

/// How often and how long to poll an uploaded file.
#[derive(Debug, Clone)]
pub struct PollPolicy {
    /// Delay before each status check.
    pub interval: Duration,
    /// Maximum number of status checks; `None` polls until the file leaves
    /// processing, however long that takes.
    pub max_attempts: Option<u32>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            max_attempts: Some(60),
        }
    }
}

impl PollPolicy {
    pub fn new(interval: Duration, max_attempts: Option<u32>) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }
}

/// Poll `file` until it is ready.
///
/// Returns the ready handle along with the number of status checks made.
///
/// # Errors
///
/// - `ProcessingFailed` if the service marks the file as failed
/// - `ProcessingTimeout` if `max_attempts` checks pass without a terminal state
/// - any error from `get_status`
pub async fn wait_until_ready(
    client: &dyn RemoteAnalysis,
    file: RemoteFile,
    policy: &PollPolicy,
) -> AiResult<(RemoteFile, u32)> {
    let mut file = file;
    let mut attempts = 0u32;

    while !file.state.is_terminal() {
        if policy.max_attempts.is_some_and(|max| attempts >= max) {
            warn!(
                file = %file.name,
                state = %file.state,
                attempts,
                "Giving up on remote processing"
            );
            return Err(AiError::ProcessingTimeout { attempts });
        }

        info!(file = %file.name, state = %file.state, "Processing...");
        tokio::time::sleep(policy.interval).await;
        file = client.get_status(&file).await?;
        attempts += 1;
    }

    if file.state == RemoteFileState::Failed {
        warn!(file = %file.name, "Remote processing failed");
        return Err(AiError::ProcessingFailed);
    }

    Ok((file, attempts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::path::Path;
    use std::sync::Mutex;

    use async_trait::async_trait;

    /// Replays a fixed sequence of states on each status check.
    struct ScriptedStates {
        states: Mutex<VecDeque<RemoteFileState>>,
        checks: Mutex<u32>,
    }

    impl ScriptedStates {
        fn new(states: &[RemoteFileState]) -> Self {
            Self {
                states: Mutex::new(states.iter().copied().collect()),
                checks: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl RemoteAnalysis for ScriptedStates {
        async fn upload(&self, _path: &Path, _mime_type: &str) -> AiResult<RemoteFile> {
            unreachable!()
        }

        async fn get_status(&self, file: &RemoteFile) -> AiResult<RemoteFile> {
            *self.checks.lock().unwrap() += 1;
            let next = self
                .states
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(RemoteFileState::Processing);
            Ok(file.with_state(next))
        }

        async fn infer(&self, _file: &RemoteFile, _prompt: &str) -> AiResult<String> {
            unreachable!()
        }

        async fn delete(&self, _file: &RemoteFile) -> AiResult<()> {
            unreachable!()
        }
    }

    fn handle(state: RemoteFileState) -> RemoteFile {
        RemoteFile::new("files/abc", "https://files/abc", "video/mp4", state)
    }

    fn fast(max_attempts: Option<u32>) -> PollPolicy {
        PollPolicy::new(Duration::from_millis(1), max_attempts)
    }

    #[tokio::test]
    async fn test_pending_processing_ready() {
        let client = ScriptedStates::new(&[RemoteFileState::Processing, RemoteFileState::Ready]);
        let (file, attempts) = wait_until_ready(&client, handle(RemoteFileState::Pending), &fast(None))
            .await
            .unwrap();
        assert_eq!(file.state, RemoteFileState::Ready);
        assert_eq!(attempts, 2);
    }

    #[tokio::test]
    async fn test_ready_upload_skips_polling() {
        let client = ScriptedStates::new(&[]);
        let (_, attempts) = wait_until_ready(&client, handle(RemoteFileState::Ready), &fast(Some(3)))
            .await
            .unwrap();
        assert_eq!(attempts, 0);
        assert_eq!(*client.checks.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_failed_state() {
        let client = ScriptedStates::new(&[RemoteFileState::Failed]);
        let err = wait_until_ready(&client, handle(RemoteFileState::Processing), &fast(None))
            .await
            .unwrap_err();
        assert!(matches!(err, AiError::ProcessingFailed));
        assert_eq!(err.to_string(), "File processing failed.");
    }

    #[tokio::test]
    async fn test_max_attempts() {
        let client = ScriptedStates::new(&[]);
        let err = wait_until_ready(&client, handle(RemoteFileState::Processing), &fast(Some(3)))
            .await
            .unwrap_err();
        assert!(matches!(err, AiError::ProcessingTimeout { attempts: 3 }));
        assert_eq!(*client.checks.lock().unwrap(), 3);
    }
}
