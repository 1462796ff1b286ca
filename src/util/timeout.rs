//! Timeout helper.

use std::future::Future;
use std::time::Duration;

use crate::agent_loop::CallStage;
use crate::error::TaskLoopError;

/// Wrap a collaborator call with a timeout.
pub async fn with_timeout<T>(
    stage: CallStage,
    duration: Duration,
    future: impl Future<Output = Result<T, TaskLoopError>>,
) -> Result<T, TaskLoopError> {
    match tokio::time::timeout(duration, future).await {
        Ok(result) => result,
        Err(_) => Err(TaskLoopError::Timeout {
            stage,
            after_ms: duration.as_millis() as u64,
        }),
    }
}
