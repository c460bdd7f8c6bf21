// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Relay Task Watcher
//!
//! Polls a relay until a task reaches a terminal state.
//!
//! `wait` never gives up on its own: it runs until the relay reports a
//! terminal state. Callers that need an upper bound use `wait_with_timeout`,
//! `wait_until_cancelled` or `watch_task`, which wrap the same loop.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::client::RelayStatusSource;
use super::types::{RelayTask, TaskState};
use super::RelayError;

/// Default interval between status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Once a poll fails the interval never drops below this.
const BACKOFF_FLOOR: Duration = Duration::from_secs(30);

/// Added to the interval on every failed poll.
const BACKOFF_STEP: Duration = Duration::from_secs(1);

/// Markers preceding the useful part of a relay diagnostic.
const RELAY_MESSAGE_DELIMITERS: [&str; 2] = ["RegisterDelegate", "Execution error:"];

/// Interval to use after a failed poll: `max(30 s, ttl + 1 s)`.
pub fn next_backoff(ttl: Duration) -> Duration {
    BACKOFF_FLOOR.max(ttl + BACKOFF_STEP)
}

/// Extract the human-readable reason from a relay diagnostic.
///
/// Takes the text after the last `RegisterDelegate` / `Execution error:`
/// marker. Without a marker the whole message is returned; without a
/// message, an empty string.
pub fn extract_relay_message(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return String::new();
    };

    let cut = RELAY_MESSAGE_DELIMITERS
        .iter()
        .filter_map(|delimiter| raw.rfind(delimiter).map(|idx| idx + delimiter.len()))
        .max();

    match cut {
        Some(idx) => raw[idx..].trim().to_string(),
        None => raw.trim().to_string(),
    }
}

/// Outcome of a task in its current state, `None` while still pending.
fn outcome(task: &RelayTask) -> Option<Result<String, RelayError>> {
    let failure = |message: String| {
        Err(RelayError::TerminalFailure {
            task_id: task.task_id.clone(),
            state: task.state,
            message,
        })
    };

    match task.state {
        TaskState::CheckPending | TaskState::ExecPending | TaskState::WaitingForConfirmation => {
            None
        }
        TaskState::ExecSuccess => Some(Ok(task.transaction_hash.clone().unwrap_or_default())),
        TaskState::ExecReverted | TaskState::Cancelled | TaskState::Blacklisted => Some(failure(
            extract_relay_message(task.last_message.as_deref()),
        )),
        TaskState::NotFound => Some(failure(format!("relay task {} not found", task.task_id))),
    }
}

/// Watches relay tasks through a [`RelayStatusSource`].
pub struct TaskWatcher<S: ?Sized> {
    source: Arc<S>,
    poll_interval: Duration,
}

impl<S: ?Sized> Clone for TaskWatcher<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            poll_interval: self.poll_interval,
        }
    }
}

impl<S: RelayStatusSource + ?Sized> TaskWatcher<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self {
            source,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Override the initial polling interval.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Wait for a task to finish, resolving with its transaction hash.
    ///
    /// An absent hash on success resolves to an empty string.
    pub async fn wait(&self, task_id: &str) -> Result<String, RelayError> {
        let mut task = RelayTask::new(task_id, self.poll_interval);
        self.watch(&mut task).await
    }

    /// Drive `task` to a terminal state, recording every observation on it.
    ///
    /// A task that is already terminal is settled without polling again.
    pub async fn watch(&self, task: &mut RelayTask) -> Result<String, RelayError> {
        loop {
            if let Some(result) = outcome(task) {
                return result;
            }

            task.polls += 1;
            match self.source.task_status(&task.task_id).await {
                Ok(None) => {
                    task.state = TaskState::NotFound;
                    warn!(task_id = %task.task_id, polls = task.polls, "Relay task not found");
                    continue;
                }
                Ok(Some(status)) => {
                    task.state = status.task_state;
                    task.transaction_hash = status.transaction_hash;
                    task.last_message = status.last_check_message;

                    if task.state.is_terminal() {
                        if task.state.is_failure() {
                            warn!(
                                task_id = %task.task_id,
                                state = %task.state,
                                message = ?task.last_message,
                                "Relay task failed"
                            );
                        } else {
                            info!(
                                task_id = %task.task_id,
                                tx_hash = ?task.transaction_hash,
                                polls = task.polls,
                                "Relay task executed"
                            );
                        }
                        continue;
                    }

                    debug!(task_id = %task.task_id, state = %task.state, "Relay task pending");
                }
                Err(e) => {
                    let previous = task.ttl;
                    task.ttl = next_backoff(task.ttl);
                    warn!(
                        task_id = %task.task_id,
                        error = %e,
                        previous_ttl_ms = previous.as_millis() as u64,
                        ttl_ms = task.ttl.as_millis() as u64,
                        "Relay status poll failed, backing off"
                    );
                }
            }

            tokio::time::sleep(task.ttl).await;
        }
    }

    /// [`wait`](Self::wait) bounded by `timeout`.
    pub async fn wait_with_timeout(
        &self,
        task_id: &str,
        timeout: Duration,
    ) -> Result<String, RelayError> {
        match tokio::time::timeout(timeout, self.wait(task_id)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(task_id = %task_id, timeout_ms = timeout.as_millis() as u64, "Relay task watch timed out");
                Err(RelayError::Timeout {
                    task_id: task_id.to_string(),
                    after: timeout,
                })
            }
        }
    }

    /// [`wait`](Self::wait) that gives up when `shutdown` is cancelled.
    pub async fn wait_until_cancelled(
        &self,
        task_id: &str,
        shutdown: &CancellationToken,
    ) -> Result<String, RelayError> {
        self.watch_task(task_id, None, shutdown).await
    }

    /// Cancellable watch with an optional timeout; `None` waits indefinitely.
    pub async fn watch_task(
        &self,
        task_id: &str,
        timeout: Option<Duration>,
        shutdown: &CancellationToken,
    ) -> Result<String, RelayError> {
        let watch = async {
            match timeout {
                Some(limit) => self.wait_with_timeout(task_id, limit).await,
                None => self.wait(task_id).await,
            }
        };

        tokio::select! {
            result = watch => result,
            _ = shutdown.cancelled() => {
                info!(task_id = %task_id, "Relay task watch cancelled");
                Err(RelayError::Cancelled { task_id: task_id.to_string() })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::types::TaskStatus;
    use crate::testing::ScriptedRelay;
    use tokio::time::Instant;

    fn pending(state: TaskState) -> Result<Option<TaskStatus>, RelayError> {
        Ok(Some(TaskStatus::new(state)))
    }

    fn throttled() -> Result<Option<TaskStatus>, RelayError> {
        Err(RelayError::Status {
            status: 429,
            body: "Too many requests".to_string(),
        })
    }

    #[tokio::test(start_paused = true)]
    async fn resolves_with_hash_after_three_polls() {
        let relay = Arc::new(ScriptedRelay::new(vec![
            pending(TaskState::CheckPending),
            pending(TaskState::ExecPending),
            Ok(Some(TaskStatus::new(TaskState::ExecSuccess).with_hash("0xabc"))),
        ]));
        let watcher = TaskWatcher::new(relay.clone()).with_poll_interval(Duration::from_millis(250));

        let start = Instant::now();
        let mut task = RelayTask::new("task-1", watcher.poll_interval());
        let hash = watcher.watch(&mut task).await.unwrap();

        assert_eq!(hash, "0xabc");
        assert_eq!(task.polls, 3);
        assert_eq!(relay.polls(), 3);
        assert_eq!(task.state, TaskState::ExecSuccess);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(500), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(750), "{elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn success_without_hash_resolves_empty() {
        let relay = Arc::new(ScriptedRelay::new(vec![pending(TaskState::ExecSuccess)]));
        let watcher = TaskWatcher::new(relay);

        assert_eq!(watcher.wait("task-1").await.unwrap(), "");
    }

    #[tokio::test(start_paused = true)]
    async fn reverted_task_rejects_with_execution_error() {
        let relay = Arc::new(ScriptedRelay::new(vec![
            pending(TaskState::WaitingForConfirmation),
            Ok(Some(
                TaskStatus::new(TaskState::ExecReverted)
                    .with_message("Reverted 0x08c379a0 Execution error: insufficient funds"),
            )),
        ]));
        let watcher = TaskWatcher::new(relay);

        let err = watcher.wait("task-1").await.unwrap_err();
        assert_eq!(err.to_string(), "insufficient funds");
        assert_eq!(err.terminal_state(), Some(TaskState::ExecReverted));
        assert_eq!(err.code(), "RELAY_TERMINAL_FAILURE");
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_and_blacklisted_are_failures() {
        for state in [TaskState::Cancelled, TaskState::Blacklisted] {
            let relay = Arc::new(ScriptedRelay::new(vec![pending(state)]));
            let err = TaskWatcher::new(relay).wait("task-1").await.unwrap_err();
            assert_eq!(err.terminal_state(), Some(state));
            assert_eq!(err.to_string(), "");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn missing_status_rejects_as_not_found() {
        let relay = Arc::new(ScriptedRelay::new(vec![Ok(None)]));
        let watcher = TaskWatcher::new(relay.clone());

        let mut task = RelayTask::new("ghost", DEFAULT_POLL_INTERVAL);
        let err = watcher.watch(&mut task).await.unwrap_err();

        assert_eq!(task.state, TaskState::NotFound);
        assert_eq!(err.terminal_state(), Some(TaskState::NotFound));
        assert_eq!(relay.polls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn poll_errors_back_off_instead_of_rejecting() {
        let relay = Arc::new(ScriptedRelay::new(vec![
            throttled(),
            throttled(),
            Ok(Some(TaskStatus::new(TaskState::ExecSuccess).with_hash("0xdef"))),
        ]));
        let watcher = TaskWatcher::new(relay);

        let start = Instant::now();
        let mut task = RelayTask::new("task-1", DEFAULT_POLL_INTERVAL);
        let hash = watcher.watch(&mut task).await.unwrap();

        assert_eq!(hash, "0xdef");
        assert_eq!(task.polls, 3);
        // 500ms -> 30s -> 31s
        assert_eq!(task.ttl, Duration::from_secs(31));
        assert!(start.elapsed() >= Duration::from_secs(61));
    }

    #[tokio::test(start_paused = true)]
    async fn not_yet_indexed_task_keeps_polling() {
        let relay = Arc::new(ScriptedRelay::new(vec![
            Err(RelayError::Status {
                status: 404,
                body: "Task not found".to_string(),
            }),
            Ok(Some(TaskStatus::new(TaskState::ExecSuccess).with_hash("0xabc"))),
        ]));
        let watcher = TaskWatcher::new(relay.clone()).with_poll_interval(Duration::from_millis(10));

        let hash = watcher.wait("task-1").await.unwrap();

        assert_eq!(hash, "0xabc");
        assert_eq!(relay.polls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn backoff_is_kept_after_recovery() {
        let relay = Arc::new(ScriptedRelay::new(vec![
            throttled(),
            pending(TaskState::ExecPending),
            pending(TaskState::ExecSuccess),
        ]));
        let watcher = TaskWatcher::new(relay);

        let mut task = RelayTask::new("task-1", DEFAULT_POLL_INTERVAL);
        watcher.watch(&mut task).await.unwrap();
        assert_eq!(task.ttl, Duration::from_secs(30));
    }

    #[test]
    fn backoff_is_monotonic_with_floor() {
        let mut ttl = Duration::from_millis(500);
        for _ in 0..50 {
            let next = next_backoff(ttl);
            assert!(next >= ttl);
            assert!(next >= Duration::from_secs(30));
            assert_eq!(next, Duration::from_secs(30).max(ttl + Duration::from_secs(1)));
            ttl = next;
        }
        assert_eq!(ttl, Duration::from_secs(79));
    }

    #[test]
    fn extract_relay_message_handles_both_delimiters() {
        assert_eq!(
            extract_relay_message(Some("foo Execution error: insufficient funds")),
            "insufficient funds"
        );
        assert_eq!(
            extract_relay_message(Some("GelatoRelay RegisterDelegate signature expired")),
            "signature expired"
        );
        // The later marker wins.
        assert_eq!(
            extract_relay_message(Some("RegisterDelegate reverted. Execution error: nonce")),
            "nonce"
        );
        assert_eq!(extract_relay_message(Some("  gas too low ")), "gas too low");
        assert_eq!(extract_relay_message(None), "");
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_wrapper_rejects_stuck_tasks() {
        let relay = Arc::new(ScriptedRelay::pending_forever());
        let watcher = TaskWatcher::new(relay);

        let err = watcher
            .wait_with_timeout("stuck", Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::Timeout { .. }));
        assert_eq!(err.code(), "RELAY_TIMEOUT");
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_polling() {
        let relay = Arc::new(ScriptedRelay::pending_forever());
        let watcher = TaskWatcher::new(relay.clone());
        let shutdown = CancellationToken::new();

        let canceller = shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(2)).await;
            canceller.cancel();
        });

        let err = watcher
            .wait_until_cancelled("stuck", &shutdown)
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::Cancelled { .. }));

        let polls = relay.polls();
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(relay.polls(), polls);
    }

    #[tokio::test(start_paused = true)]
    async fn finished_task_is_not_polled_again() {
        let relay = Arc::new(ScriptedRelay::new(vec![]));
        let watcher = TaskWatcher::new(relay.clone());

        let mut task = RelayTask::new("done", DEFAULT_POLL_INTERVAL);
        task.state = TaskState::ExecSuccess;
        task.transaction_hash = Some("0x01".to_string());

        assert_eq!(watcher.watch(&mut task).await.unwrap(), "0x01");
        assert_eq!(relay.polls(), 0);
    }
}
