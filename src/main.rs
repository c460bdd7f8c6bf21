// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! `gap-relay-watch` - follow relay tasks until they settle.
//!
//! Usage: `gap-relay-watch <task-id>...`
//!
//! Every task is watched concurrently. Ctrl-C cancels all watchers. The
//! process exits non-zero if any task failed, timed out or was cancelled.

use std::process::ExitCode;
use std::sync::Arc;

use gap_attest::config::Config;
use gap_attest::relay::{GelatoRelayClient, TaskWatcher};
use gap_attest::telemetry;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(2);
        }
    };
    telemetry::init_tracing(config.log_format);

    let task_ids: Vec<String> = std::env::args().skip(1).collect();
    if task_ids.is_empty() {
        eprintln!("usage: gap-relay-watch <task-id>...");
        return ExitCode::from(2);
    }

    let relay = match GelatoRelayClient::new(
        config.relay.api_url.clone(),
        config.relay.sponsor_api_key.clone(),
    ) {
        Ok(relay) => Arc::new(relay),
        Err(e) => {
            error!(error = %e, "Failed to create relay client");
            return ExitCode::FAILURE;
        }
    };
    let watcher = TaskWatcher::new(relay).with_poll_interval(config.relay.poll_interval);
    let shutdown = CancellationToken::new();

    let ctrl_c = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling watchers");
            ctrl_c.cancel();
        }
    });

    let mut watchers = JoinSet::new();
    for task_id in task_ids {
        let watcher = watcher.clone();
        let shutdown = shutdown.clone();
        let timeout = config.relay.timeout;
        watchers.spawn(async move {
            let result = watcher.watch_task(&task_id, timeout, &shutdown).await;
            (task_id, result)
        });
    }

    let mut failed = 0usize;
    while let Some(joined) = watchers.join_next().await {
        match joined {
            Ok((task_id, Ok(tx_hash))) => {
                info!(task_id = %task_id, tx_hash = %tx_hash, "Task succeeded");
                println!("{task_id} ok {tx_hash}");
            }
            Ok((task_id, Err(e))) => {
                failed += 1;
                error!(task_id = %task_id, code = e.code(), error = %e, "Task failed");
                println!("{task_id} {} {e}", e.code());
            }
            Err(e) => {
                failed += 1;
                error!(error = %e, "Watcher panicked");
            }
        }
    }

    if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
