//! Cancellable fixed-interval polling of a remote task.

use async_trait::async_trait;
use lemouniq_core::PipelineResult;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// State of a remote task as reported by one status request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskState<T> {
    Pending,
    Completed(T),
    Failed(Option<String>),
}

/// Anything that can report the state of a task by key.
#[async_trait]
pub trait TaskStatusSource: Send + Sync {
    type Output: Send;

    async fn fetch_status(&self, task_key: &str) -> PipelineResult<TaskState<Self::Output>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl PollSettings {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    Completed(T),
    Failed(Option<String>),
    TimedOut { attempts: u32 },
    Cancelled,
}

/// Poll `source` until the task reaches a terminal state, the attempt budget is
/// spent, or `cancel` fires.
///
/// There is no sleep after the final attempt. Status request errors end the poll
/// and are returned to the caller.
pub async fn poll_until_terminal<S>(
    source: &S,
    task_key: &str,
    settings: PollSettings,
    cancel: &CancellationToken,
) -> PipelineResult<PollOutcome<S::Output>>
where
    S: TaskStatusSource + ?Sized,
{
    for attempt in 1..=settings.max_attempts {
        let state = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(PollOutcome::Cancelled),
            state = source.fetch_status(task_key) => state?,
        };

        match state {
            TaskState::Completed(output) => {
                tracing::info!(task_key = %task_key, attempts = attempt, "Task completed");
                return Ok(PollOutcome::Completed(output));
            }
            TaskState::Failed(reason) => {
                tracing::warn!(
                    task_key = %task_key,
                    attempts = attempt,
                    reason = reason.as_deref().unwrap_or("unknown"),
                    "Task failed"
                );
                return Ok(PollOutcome::Failed(reason));
            }
            TaskState::Pending => {
                tracing::debug!(
                    task_key = %task_key,
                    attempt = attempt,
                    max_attempts = settings.max_attempts,
                    "Task still pending"
                );
            }
        }

        if attempt < settings.max_attempts {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Ok(PollOutcome::Cancelled),
                _ = tokio::time::sleep(settings.interval) => {}
            }
        }
    }

    tracing::warn!(
        task_key = %task_key,
        attempts = settings.max_attempts,
        "Task abandoned after exhausting poll attempts"
    );
    Ok(PollOutcome::TimedOut {
        attempts: settings.max_attempts,
    })
}
