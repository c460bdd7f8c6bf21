// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Relay Tasks
//!
//! Gas-sponsored transactions are handed to a relay which answers with an
//! opaque task id. The [`TaskWatcher`] polls the relay until the task reaches
//! a terminal state and turns that into either a transaction hash or a
//! [`RelayError`].
//!
//! ## State machine
//!
//! ```text
//! CheckPending ─┐
//! ExecPending ──┼─ poll every ttl ─▶ ExecSuccess            (resolve with tx hash)
//! WaitingFor ───┘                  ├▶ ExecReverted | Cancelled | Blacklisted (reject)
//! Confirmation                     └▶ NotFound (no status payload, reject)
//! ```
//!
//! A failing poll (rate limiting, transport errors) never ends the watch. The
//! interval grows to `max(30 s, ttl + 1 s)` and polling continues.

pub mod attester;
pub mod client;
pub mod types;
pub mod watcher;

pub use attester::RelayedAttester;
pub use client::{GelatoRelayClient, RelayStatusSource, SponsoredRelay};
pub use types::{RelayTask, SponsoredCall, TaskState, TaskStatus};
pub use watcher::{extract_relay_message, next_backoff, TaskWatcher, DEFAULT_POLL_INTERVAL};

/// Errors produced while submitting or watching relay tasks.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// The task ended in a failure state. Displays the relay's diagnostic.
    #[error("{message}")]
    TerminalFailure {
        task_id: String,
        state: TaskState,
        message: String,
    },

    #[error("relay task {task_id} did not finish within {after:?}")]
    Timeout {
        task_id: String,
        after: std::time::Duration,
    },

    #[error("watch of relay task {task_id} was cancelled")]
    Cancelled { task_id: String },

    #[error("relay request failed: {0}")]
    Request(String),

    #[error("relay returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("relay response was invalid: {0}")]
    InvalidResponse(String),
}

impl RelayError {
    /// Stable error code.
    pub fn code(&self) -> &'static str {
        match self {
            RelayError::TerminalFailure { .. } => "RELAY_TERMINAL_FAILURE",
            RelayError::Timeout { .. } => "RELAY_TIMEOUT",
            RelayError::Cancelled { .. } => "RELAY_CANCELLED",
            RelayError::Request(_) => "RELAY_REQUEST_FAILED",
            RelayError::Status { status: 429, .. } => "RELAY_RATE_LIMITED",
            RelayError::Status { .. } => "RELAY_HTTP_ERROR",
            RelayError::InvalidResponse(_) => "RELAY_INVALID_RESPONSE",
        }
    }

    /// Terminal state of the task, when the error came from one.
    pub fn terminal_state(&self) -> Option<TaskState> {
        match self {
            RelayError::TerminalFailure { state, .. } => Some(*state),
            _ => None,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, RelayError::Status { status: 429, .. })
    }
}
