// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Relay task types.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use alloy::primitives::{Address, Bytes};
use serde::{Deserialize, Serialize};

/// Relay task state as reported by the status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskState {
    CheckPending,
    ExecPending,
    WaitingForConfirmation,
    ExecSuccess,
    ExecReverted,
    Cancelled,
    Blacklisted,
    /// Never reported by the relay; the watcher got no status payload.
    NotFound,
}

impl TaskState {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskState::CheckPending => "CheckPending",
            TaskState::ExecPending => "ExecPending",
            TaskState::WaitingForConfirmation => "WaitingForConfirmation",
            TaskState::ExecSuccess => "ExecSuccess",
            TaskState::ExecReverted => "ExecReverted",
            TaskState::Cancelled => "Cancelled",
            TaskState::Blacklisted => "Blacklisted",
            TaskState::NotFound => "NotFound",
        }
    }

    pub fn is_terminal(self) -> bool {
        match self {
            TaskState::CheckPending | TaskState::ExecPending | TaskState::WaitingForConfirmation => {
                false
            }
            TaskState::ExecSuccess
            | TaskState::ExecReverted
            | TaskState::Cancelled
            | TaskState::Blacklisted
            | TaskState::NotFound => true,
        }
    }

    pub fn is_failure(self) -> bool {
        self.is_terminal() && self != TaskState::ExecSuccess
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CheckPending" => Ok(TaskState::CheckPending),
            "ExecPending" => Ok(TaskState::ExecPending),
            "WaitingForConfirmation" => Ok(TaskState::WaitingForConfirmation),
            "ExecSuccess" => Ok(TaskState::ExecSuccess),
            "ExecReverted" => Ok(TaskState::ExecReverted),
            "Cancelled" => Ok(TaskState::Cancelled),
            "Blacklisted" => Ok(TaskState::Blacklisted),
            "NotFound" => Ok(TaskState::NotFound),
            other => Err(format!("unknown relay task state `{other}`")),
        }
    }
}

/// Status payload returned by the relay for one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatus {
    pub task_state: TaskState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_check_message: Option<String>,
}

impl TaskStatus {
    pub fn new(task_state: TaskState) -> Self {
        Self {
            task_state,
            transaction_hash: None,
            last_check_message: None,
        }
    }

    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.transaction_hash = Some(hash.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.last_check_message = Some(message.into());
        self
    }
}

/// One in-flight relayed transaction as seen by the watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayTask {
    pub task_id: String,
    pub state: TaskState,
    pub transaction_hash: Option<String>,
    pub last_message: Option<String>,
    /// Current polling interval; only ever grows.
    pub ttl: Duration,
    /// Number of status queries issued so far
    pub polls: u32,
}

impl RelayTask {
    pub fn new(task_id: impl Into<String>, ttl: Duration) -> Self {
        Self {
            task_id: task_id.into(),
            state: TaskState::CheckPending,
            transaction_hash: None,
            last_message: None,
            ttl,
            polls: 0,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_terminal()
    }
}

/// A sponsored call request: the relay pays gas to execute `data` on `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SponsoredCall {
    pub chain_id: u64,
    pub target: Address,
    pub data: Bytes,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_classification_covers_every_state() {
        let pending = [
            TaskState::CheckPending,
            TaskState::ExecPending,
            TaskState::WaitingForConfirmation,
        ];
        let failures = [
            TaskState::ExecReverted,
            TaskState::Cancelled,
            TaskState::Blacklisted,
            TaskState::NotFound,
        ];

        for state in pending {
            assert!(!state.is_terminal(), "{state} should keep polling");
        }
        for state in failures {
            assert!(state.is_failure(), "{state} should be a failure");
        }
        assert!(TaskState::ExecSuccess.is_terminal());
        assert!(!TaskState::ExecSuccess.is_failure());
    }

    #[test]
    fn state_names_round_trip_through_from_str() {
        for state in [
            TaskState::CheckPending,
            TaskState::WaitingForConfirmation,
            TaskState::Blacklisted,
        ] {
            assert_eq!(state.as_str().parse::<TaskState>(), Ok(state));
        }
        assert!("Exploded".parse::<TaskState>().is_err());
    }

    #[test]
    fn status_deserializes_relay_payload() {
        let status: TaskStatus = serde_json::from_str(
            r#"{"taskId":"0xabc","taskState":"ExecReverted","lastCheckMessage":"Execution error: nope"}"#,
        )
        .unwrap();
        assert_eq!(status.task_state, TaskState::ExecReverted);
        assert_eq!(status.transaction_hash, None);
        assert_eq!(
            status.last_check_message.as_deref(),
            Some("Execution error: nope")
        );
    }

    #[test]
    fn new_task_starts_check_pending() {
        let task = RelayTask::new("task-1", Duration::from_millis(500));
        assert_eq!(task.state, TaskState::CheckPending);
        assert_eq!(task.polls, 0);
        assert!(!task.is_finished());
    }
}
