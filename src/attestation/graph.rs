// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Attestation graph with local referential integrity.

use std::collections::HashSet;
use std::sync::Arc;

use alloy::primitives::{Address, B256};
use serde_json::Value;
use tracing::debug;

use super::node::{Attestation, NULL_REF};
use super::registry::SchemaRegistry;
use super::schema::Schema;
use super::AttestationError;
use crate::chain::AttestationSigner;

/// Builds attestations against a shared schema registry and tracks which
/// UIDs are known to exist on chain.
///
/// A UID is known once it was submitted through this graph or registered
/// with [`AttestationGraph::register_existing`] (typically after reading it
/// back from the indexer).
#[derive(Debug, Clone)]
pub struct AttestationGraph {
    registry: Arc<SchemaRegistry>,
    chain_id: u64,
    known: HashSet<B256>,
}

impl AttestationGraph {
    pub fn new(registry: Arc<SchemaRegistry>, chain_id: u64) -> Self {
        Self {
            registry,
            chain_id,
            known: HashSet::new(),
        }
    }

    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Look up a schema by name.
    pub fn schema(&self, name: &str) -> Result<Arc<Schema>, AttestationError> {
        self.registry.get(name)
    }

    /// Mark UIDs that already exist on chain.
    pub fn register_existing(&mut self, uids: impl IntoIterator<Item = B256>) {
        self.known
            .extend(uids.into_iter().filter(|uid| *uid != NULL_REF));
    }

    pub fn contains(&self, uid: &B256) -> bool {
        self.known.contains(uid)
    }

    pub fn create_root(
        &self,
        schema: &str,
        recipient: Address,
        data: Value,
    ) -> Result<Attestation, AttestationError> {
        Attestation::create_root(self.schema(schema)?, self.chain_id, recipient, data)
    }

    /// Create a child of `parent`, which must be submitted and known.
    pub fn create_child(
        &self,
        parent: &Attestation,
        schema: &str,
        recipient: Address,
        data: Value,
    ) -> Result<Attestation, AttestationError> {
        let parent_uid = parent.uid();
        if parent_uid != NULL_REF && !self.known.contains(&parent_uid) {
            return Err(AttestationError::InvalidReference(format!(
                "parent {parent_uid:#x} is not a known attestation"
            )));
        }

        Attestation::create_child(parent, self.schema(schema)?, recipient, data)
    }

    /// Submit `node` with its pending children and record the new UIDs.
    ///
    /// Every explicit parent reference in the batch must be known; batch
    /// index references point at payloads of the same call.
    pub async fn attest<S: AttestationSigner + ?Sized>(
        &mut self,
        node: &mut Attestation,
        signer: &S,
    ) -> Result<B256, AttestationError> {
        let plan = node.plan();
        if let Some(unknown) = plan
            .payloads()
            .iter()
            .filter(|payload| payload.ref_idx.is_none())
            .map(|payload| payload.ref_uid)
            .find(|ref_uid| *ref_uid != NULL_REF && !self.known.contains(ref_uid))
        {
            return Err(AttestationError::InvalidReference(format!(
                "referenced attestation {unknown:#x} is not known"
            )));
        }

        let uid = node.attest(signer).await?;

        let mut recorded = 0usize;
        node.walk(&mut |attestation| {
            if attestation.is_submitted() && self.known.insert(attestation.uid()) {
                recorded += 1;
            }
        });
        debug!(uid = %uid, recorded, "Recorded attestation uids");

        Ok(uid)
    }
}
