// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared fixtures for unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use alloy::primitives::{Address, B256};
use async_trait::async_trait;

use crate::attestation::{Schema, SchemaRegistry};
use crate::chain::{AttestationSigner, ChainError, MultiAttestData, ReceiptSource};
use crate::relay::{RelayError, RelayStatusSource, SponsoredCall, SponsoredRelay, TaskState, TaskStatus};

/// Serve `router` on an ephemeral local port and return its base URL.
pub(crate) async fn serve(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("test server");
    });
    format!("http://{addr}")
}

/// Relay that replays a fixed list of status responses, then stays pending.
pub(crate) struct ScriptedRelay {
    responses: Mutex<VecDeque<Result<Option<TaskStatus>, RelayError>>>,
    polls: AtomicU32,
    submitted: Mutex<Vec<SponsoredCall>>,
}

impl ScriptedRelay {
    pub(crate) fn new(responses: Vec<Result<Option<TaskStatus>, RelayError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            polls: AtomicU32::new(0),
            submitted: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn pending_forever() -> Self {
        Self::new(Vec::new())
    }

    pub(crate) fn polls(&self) -> u32 {
        self.polls.load(Ordering::SeqCst)
    }

    pub(crate) fn submitted(&self) -> Vec<SponsoredCall> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl RelayStatusSource for ScriptedRelay {
    async fn task_status(&self, _task_id: &str) -> Result<Option<TaskStatus>, RelayError> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Some(TaskStatus::new(TaskState::ExecPending))))
    }
}

#[async_trait]
impl SponsoredRelay for ScriptedRelay {
    async fn sponsored_call(&self, call: &SponsoredCall) -> Result<String, RelayError> {
        let mut submitted = self.submitted.lock().unwrap();
        submitted.push(call.clone());
        Ok(format!("task-{}", submitted.len()))
    }
}

/// Receipt source that reports the same UIDs for any transaction.
pub(crate) struct FixedReceipts {
    uids: Vec<B256>,
}

impl FixedReceipts {
    pub(crate) fn new(uids: Vec<B256>) -> Self {
        Self { uids }
    }
}

#[async_trait]
impl ReceiptSource for FixedReceipts {
    async fn attested_uids(&self, _tx_hash: B256) -> Result<Vec<B256>, ChainError> {
        Ok(self.uids.clone())
    }
}

/// In-memory signer that mints sequential UIDs and can be told to revert.
pub(crate) struct MockSigner {
    attester: Address,
    next_uid: AtomicU64,
    failures: AtomicUsize,
    calls: Mutex<Vec<Vec<MultiAttestData>>>,
    revocations: Mutex<Vec<(B256, B256)>>,
}

impl MockSigner {
    pub(crate) fn new() -> Self {
        Self {
            attester: Address::repeat_byte(0xa7),
            next_uid: AtomicU64::new(1),
            failures: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
            revocations: Mutex::new(Vec::new()),
        }
    }

    /// Revert the next `count` calls.
    pub(crate) fn failing(count: usize) -> Self {
        let signer = Self::new();
        signer.failures.store(count, Ordering::SeqCst);
        signer
    }

    pub(crate) fn calls(&self) -> Vec<Vec<MultiAttestData>> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn revocations(&self) -> Vec<(B256, B256)> {
        self.revocations.lock().unwrap().clone()
    }

    fn should_fail(&self) -> bool {
        self.failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl AttestationSigner for MockSigner {
    fn attester(&self) -> Address {
        self.attester
    }

    async fn multi_attest(&self, payloads: &[MultiAttestData]) -> Result<Vec<B256>, ChainError> {
        self.calls.lock().unwrap().push(payloads.to_vec());
        if self.should_fail() {
            return Err(ChainError::Reverted("execution reverted".to_string()));
        }

        Ok(payloads
            .iter()
            .map(|_| {
                let n = self.next_uid.fetch_add(1, Ordering::SeqCst);
                B256::left_padding_from(&n.to_be_bytes())
            })
            .collect())
    }

    async fn revoke(&self, schema_uid: B256, uid: B256) -> Result<B256, ChainError> {
        if self.should_fail() {
            return Err(ChainError::Reverted("execution reverted".to_string()));
        }
        self.revocations.lock().unwrap().push((schema_uid, uid));
        Ok(B256::repeat_byte(0xee))
    }
}

/// Registry with the grant-tracking schemas used across tests.
pub(crate) fn registry() -> Arc<SchemaRegistry> {
    let schemas = [
        ("Community", "bool community", true, 0x10),
        ("Grant", "bytes32 communityUID", true, 0x11),
        ("Details", "string json", true, 0x12),
        ("Milestone", "string json", true, 0x13),
        ("GrantUpdate", "string json", true, 0x14),
        ("Verification", "bool approved, string reason", false, 0x15),
    ]
    .into_iter()
    .map(|(name, definition, revocable, byte)| {
        Schema::parse(B256::repeat_byte(byte), name, definition, revocable).expect("valid schema")
    });

    Arc::new(SchemaRegistry::new(schemas).expect("unique schemas"))
}
