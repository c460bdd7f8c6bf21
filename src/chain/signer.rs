// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Signer capability used to put attestations on chain.
//!
//! Key custody is not handled here. Implementations either hold a local
//! wallet ([`EasClient`](super::EasClient)) or forward calls to a gas
//! sponsoring relay ([`RelayedAttester`](crate::relay::RelayedAttester)).

use alloy::primitives::{Address, B256};
use async_trait::async_trait;

use super::client::ChainError;
use super::types::MultiAttestData;

/// Anything able to submit attestations and revocations.
#[async_trait]
pub trait AttestationSigner: Send + Sync {
    /// Address recorded as the attester.
    fn attester(&self) -> Address;

    /// Submit all payloads in one transaction, returning UIDs in input order.
    async fn multi_attest(&self, payloads: &[MultiAttestData]) -> Result<Vec<B256>, ChainError>;

    /// Revoke an attestation, returning the transaction hash.
    async fn revoke(&self, schema_uid: B256, uid: B256) -> Result<B256, ChainError>;
}

/// Reads attestation UIDs back out of a mined transaction.
#[async_trait]
pub trait ReceiptSource: Send + Sync {
    async fn attested_uids(&self, tx_hash: B256) -> Result<Vec<B256>, ChainError>;
}
