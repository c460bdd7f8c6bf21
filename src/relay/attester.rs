// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Attestation signer that submits through a gas-sponsoring relay.

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, Bytes, B256};
use async_trait::async_trait;
use tracing::info;

use super::client::SponsoredRelay;
use super::types::SponsoredCall;
use super::watcher::TaskWatcher;
use crate::chain::eas::{encode_multi_attest, encode_revoke};
use crate::chain::{AttestationSigner, ChainError, MultiAttestData, NetworkConfig, ReceiptSource};

/// Submits attestation calls as sponsored relay tasks and waits for them.
pub struct RelayedAttester<R: ?Sized, C> {
    relay: Arc<R>,
    watcher: TaskWatcher<R>,
    receipts: C,
    chain_id: u64,
    multi_attester: Address,
    eas_address: Address,
    attester: Address,
    timeout: Option<Duration>,
}

impl<R: SponsoredRelay + ?Sized, C: ReceiptSource> RelayedAttester<R, C> {
    /// `attester` is the account the relayed calls are made on behalf of.
    pub fn new(
        relay: Arc<R>,
        receipts: C,
        network: &NetworkConfig,
        attester: Address,
    ) -> Result<Self, ChainError> {
        let multi_attester = network.multi_attester.ok_or_else(|| {
            ChainError::InvalidAddress("multi-attester contract is not configured".to_string())
        })?;

        Ok(Self {
            watcher: TaskWatcher::new(Arc::clone(&relay)),
            relay,
            receipts,
            chain_id: network.chain_id,
            multi_attester,
            eas_address: network.eas_address,
            attester,
            timeout: None,
        })
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.watcher = self.watcher.with_poll_interval(poll_interval);
        self
    }

    /// Bound every task watch; the default waits until the relay settles.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Relay a call and return the hash of the transaction that executed it.
    async fn relay_call(&self, target: Address, data: Bytes) -> Result<B256, ChainError> {
        let call = SponsoredCall {
            chain_id: self.chain_id,
            target,
            data,
        };
        let task_id = self.relay.sponsored_call(&call).await?;
        info!(task_id = %task_id, target = %target, "Submitted sponsored call");

        let tx_hash = match self.timeout {
            Some(limit) => self.watcher.wait_with_timeout(&task_id, limit).await?,
            None => self.watcher.wait(&task_id).await?,
        };

        tx_hash.parse().map_err(|e| {
            ChainError::RpcError(format!(
                "relay task {task_id} returned invalid transaction hash `{tx_hash}`: {e}"
            ))
        })
    }
}

#[async_trait]
impl<R: SponsoredRelay + ?Sized, C: ReceiptSource> AttestationSigner for RelayedAttester<R, C> {
    fn attester(&self) -> Address {
        self.attester
    }

    async fn multi_attest(&self, payloads: &[MultiAttestData]) -> Result<Vec<B256>, ChainError> {
        let tx_hash = self
            .relay_call(self.multi_attester, encode_multi_attest(payloads))
            .await?;
        self.receipts.attested_uids(tx_hash).await
    }

    async fn revoke(&self, schema_uid: B256, uid: B256) -> Result<B256, ChainError> {
        self.relay_call(self.eas_address, encode_revoke(schema_uid, uid))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::types::{TaskState, TaskStatus};
    use crate::relay::RelayError;
    use crate::testing::{FixedReceipts, ScriptedRelay};

    const TX_HASH: &str = "0x1111111111111111111111111111111111111111111111111111111111111111";

    fn network() -> NetworkConfig {
        let mut network = NetworkConfig::optimism_sepolia();
        network.multi_attester = Some(Address::repeat_byte(0x33));
        network
    }

    fn payload() -> MultiAttestData {
        MultiAttestData {
            schema_uid: B256::repeat_byte(0x01),
            recipient: Address::repeat_byte(0x02),
            ref_uid: B256::ZERO,
            ref_idx: None,
            data: Bytes::new(),
            revocable: true,
            expiration_time: 0,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn multi_attest_waits_for_task_and_reads_receipt() {
        let relay = Arc::new(ScriptedRelay::new(vec![
            Ok(Some(TaskStatus::new(TaskState::ExecPending))),
            Ok(Some(TaskStatus::new(TaskState::ExecSuccess).with_hash(TX_HASH))),
        ]));
        let uids = vec![B256::repeat_byte(0xa1), B256::repeat_byte(0xa2)];
        let attester = RelayedAttester::new(
            relay.clone(),
            FixedReceipts::new(uids.clone()),
            &network(),
            Address::repeat_byte(0x44),
        )
        .unwrap();

        let result = attester.multi_attest(&[payload(), payload()]).await.unwrap();
        assert_eq!(result, uids);

        let submitted = relay.submitted();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].target, Address::repeat_byte(0x33));
        assert_eq!(submitted[0].chain_id, 11_155_420);
    }

    #[tokio::test(start_paused = true)]
    async fn reverted_task_surfaces_relay_error() {
        let relay = Arc::new(ScriptedRelay::new(vec![Ok(Some(
            TaskStatus::new(TaskState::ExecReverted).with_message("Execution error: paused"),
        ))]));
        let attester = RelayedAttester::new(
            relay,
            FixedReceipts::new(vec![]),
            &network(),
            Address::ZERO,
        )
        .unwrap();

        let err = attester.multi_attest(&[payload()]).await.unwrap_err();
        match err {
            ChainError::Relay(RelayError::TerminalFailure { message, .. }) => {
                assert_eq!(message, "paused")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_applies_to_relayed_calls() {
        let relay = Arc::new(ScriptedRelay::pending_forever());
        let attester = RelayedAttester::new(
            relay,
            FixedReceipts::new(vec![]),
            &network(),
            Address::ZERO,
        )
        .unwrap()
        .with_timeout(Some(Duration::from_secs(3)));

        let err = attester
            .revoke(B256::repeat_byte(1), B256::repeat_byte(2))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "RELAY_TIMEOUT");
    }

    #[test]
    fn requires_multi_attester_address() {
        let relay = Arc::new(ScriptedRelay::new(vec![]));
        let result = RelayedAttester::new(
            relay,
            FixedReceipts::new(vec![]),
            &NetworkConfig::optimism_sepolia(),
            Address::ZERO,
        );
        assert!(matches!(result, Err(ChainError::InvalidAddress(_))));
    }
}
