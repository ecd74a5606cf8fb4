//! Bounded poll-until-terminal loop for generation tasks.
//!
//! Polling is advisory and idempotent: repeated reads of the same task
//! have no provider-side effect, so the loop can run from any caller
//! (or several at once) without coordination. Non-terminal responses
//! and transport errors wait on distinct intervals, and the loop gives
//! up after a fixed attempt budget.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::client::{MeshyClient, MeshyError};
use crate::types::TextTo3DTask;

/// Tunable parameters for the status poll.
pub struct PollConfig {
    /// Delay between polls while the task reports a non-terminal state.
    pub poll_interval: Duration,
    /// Delay before retrying after a transport error.
    pub error_retry_interval: Duration,
    /// Total attempts before giving up with a timeout.
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(3),
            error_retry_interval: Duration::from_secs(5),
            max_attempts: 20,
        }
    }
}

/// Poll a task until it reaches a terminal state.
///
/// Returns the terminal task, `Err(MeshyError::PollTimeout)` when the
/// attempt budget runs out, or `Ok(None)` if `cancel` fires first.
/// Non-2xx API responses count as attempts and wait the transport-error
/// interval; the task may still complete on a later poll.
pub async fn poll_until_terminal(
    client: &MeshyClient,
    task_id: &str,
    config: &PollConfig,
    cancel: &CancellationToken,
) -> Result<Option<TextTo3DTask>, MeshyError> {
    let mut attempt = 0u32;

    loop {
        attempt += 1;

        let delay = tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!(task_id, attempt, "Status poll cancelled");
                return Ok(None);
            }
            result = client.get_task(task_id) => match result {
                Ok(task) if task.status.is_terminal() => {
                    tracing::info!(task_id, status = ?task.status, attempt, "Task reached terminal state");
                    return Ok(Some(task));
                }
                Ok(task) => {
                    tracing::debug!(
                        task_id,
                        status = ?task.status,
                        progress = task.progress,
                        attempt,
                        "Task still pending",
                    );
                    config.poll_interval
                }
                Err(e) => {
                    tracing::warn!(task_id, error = %e, "Status poll attempt {attempt} failed");
                    config.error_retry_interval
                }
            }
        };

        if attempt >= config.max_attempts {
            return Err(MeshyError::PollTimeout {
                task_id: task_id.to_string(),
                attempts: attempt,
            });
        }

        // Wait before the next attempt, respecting cancellation.
        tokio::select! {
            _ = cancel.cancelled() => return Ok(None),
            _ = tokio::time::sleep(delay) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_budget() {
        let config = PollConfig::default();
        assert_eq!(config.poll_interval, Duration::from_secs(3));
        assert_eq!(config.error_retry_interval, Duration::from_secs(5));
        assert_eq!(config.max_attempts, 20);
    }
}
