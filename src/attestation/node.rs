// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Attestation nodes.

use std::sync::Arc;

use alloy::primitives::{Address, Bytes, B256};
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info};

use super::multi::MultiAttest;
use super::schema::Schema;
use super::AttestationError;
use crate::chain::{AttestationSigner, MultiAttestData};

/// Null reference: "no UID assigned yet" or "no parent".
pub const NULL_REF: B256 = B256::ZERO;

/// Pending payloads of a node and its descendants, parents before children.
///
/// A child whose parent is in the same plan carries the parent's batch index
/// instead of an explicit `ref_uid`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmissionPlan {
    payloads: Vec<MultiAttestData>,
}

impl SubmissionPlan {
    pub fn payloads(&self) -> &[MultiAttestData] {
        &self.payloads
    }

    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }
}

/// A single claim instance.
#[derive(Debug, Clone)]
pub struct Attestation {
    /// `NULL_REF` until the attestation is included on chain
    uid: B256,
    pub schema_uid: B256,
    /// Parent attestation, `NULL_REF` for roots
    ref_uid: B256,
    /// Zero until submitted
    attester: Address,
    pub recipient: Address,
    pub data: Value,
    revoked: bool,
    revocation_time: Option<DateTime<Utc>>,
    pub chain_id: u64,
    pub created_at: DateTime<Utc>,
    schema: Arc<Schema>,
    encoded: Bytes,
    children: Vec<Attestation>,
}

impl Attestation {
    fn build(
        schema: Arc<Schema>,
        chain_id: u64,
        ref_uid: B256,
        recipient: Address,
        data: Value,
    ) -> Result<Self, AttestationError> {
        let encoded = schema.encode(&data)?;

        Ok(Self {
            uid: NULL_REF,
            schema_uid: schema.uid,
            ref_uid,
            attester: Address::ZERO,
            recipient,
            data,
            revoked: false,
            revocation_time: None,
            chain_id,
            created_at: Utc::now(),
            schema,
            encoded,
            children: Vec::new(),
        })
    }

    /// Create a root attestation.
    pub fn create_root(
        schema: Arc<Schema>,
        chain_id: u64,
        recipient: Address,
        data: Value,
    ) -> Result<Self, AttestationError> {
        Self::build(schema, chain_id, NULL_REF, recipient, data)
    }

    /// Create a child of an already submitted parent.
    pub fn create_child(
        parent: &Attestation,
        schema: Arc<Schema>,
        recipient: Address,
        data: Value,
    ) -> Result<Self, AttestationError> {
        if parent.uid == NULL_REF {
            return Err(AttestationError::InvalidReference(format!(
                "parent {} attestation has not been submitted",
                parent.schema.name
            )));
        }

        Self::build(schema, parent.chain_id, parent.uid, recipient, data)
    }

    /// Rebuild an attestation that already exists on chain, for example one
    /// read back from the indexer.
    #[allow(clippy::too_many_arguments)]
    pub fn existing(
        schema: Arc<Schema>,
        chain_id: u64,
        uid: B256,
        ref_uid: B256,
        attester: Address,
        recipient: Address,
        data: Value,
    ) -> Result<Self, AttestationError> {
        if uid == NULL_REF {
            return Err(AttestationError::InvalidReference(format!(
                "existing {} attestation must have a uid",
                schema.name
            )));
        }

        let mut attestation = Self::build(schema, chain_id, ref_uid, recipient, data)?;
        attestation.uid = uid;
        attestation.attester = attester;
        Ok(attestation)
    }

    /// Attach a child that is submitted together with this node.
    ///
    /// If this node is still unsubmitted the child references it by batch
    /// position and receives its `ref_uid` once the batch lands.
    pub fn push_child(
        &mut self,
        schema: Arc<Schema>,
        recipient: Address,
        data: Value,
    ) -> Result<&mut Attestation, AttestationError> {
        let child = Self::build(schema, self.chain_id, self.uid, recipient, data)?;
        self.children.push(child);
        let last = self.children.len() - 1;
        Ok(&mut self.children[last])
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// ABI-encoded payload.
    pub fn encoded_data(&self) -> &Bytes {
        &self.encoded
    }

    pub fn children(&self) -> &[Attestation] {
        &self.children
    }

    pub fn uid(&self) -> B256 {
        self.uid
    }

    pub fn ref_uid(&self) -> B256 {
        self.ref_uid
    }

    pub fn attester(&self) -> Address {
        self.attester
    }

    pub fn is_revoked(&self) -> bool {
        self.revoked
    }

    pub fn revocation_time(&self) -> Option<DateTime<Utc>> {
        self.revocation_time
    }

    pub fn is_submitted(&self) -> bool {
        self.uid != NULL_REF
    }

    /// Visit this node and every descendant, parents before children.
    pub fn walk(&self, visit: &mut impl FnMut(&Attestation)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }

    /// Flatten every unsubmitted node into batch order.
    pub fn plan(&self) -> SubmissionPlan {
        let mut payloads = Vec::new();
        self.collect_pending(None, &mut payloads);
        SubmissionPlan { payloads }
    }

    fn collect_pending(&self, parent_idx: Option<usize>, out: &mut Vec<MultiAttestData>) {
        let own_idx = if self.is_submitted() {
            None
        } else {
            out.push(MultiAttestData {
                schema_uid: self.schema_uid,
                recipient: self.recipient,
                ref_uid: if parent_idx.is_some() { NULL_REF } else { self.ref_uid },
                ref_idx: parent_idx,
                data: self.encoded.clone(),
                revocable: self.schema.revocable,
                expiration_time: 0,
            });
            Some(out.len() - 1)
        };

        for child in &self.children {
            child.collect_pending(own_idx, out);
        }
    }

    fn assign_uids(
        &mut self,
        parent_uid: Option<B256>,
        uids: &mut impl Iterator<Item = B256>,
        attester: Address,
    ) {
        if !self.is_submitted() {
            if let Some(parent_uid) = parent_uid {
                self.ref_uid = parent_uid;
            }
            if let Some(uid) = uids.next() {
                self.uid = uid;
                self.attester = attester;
            }
        }

        let own_uid = self.uid;
        for child in &mut self.children {
            child.assign_uids(Some(own_uid), uids, attester);
        }
    }

    /// Submit this node and its pending children in one multi-attestation.
    ///
    /// Nothing on the node changes unless the whole batch succeeds, so a
    /// failed call can simply be retried.
    pub async fn attest<S: AttestationSigner + ?Sized>(
        &mut self,
        signer: &S,
    ) -> Result<B256, AttestationError> {
        let plan = self.plan();
        if plan.is_empty() {
            return Err(AttestationError::AlreadySubmitted(self.uid));
        }

        let uids = MultiAttest::send(signer, plan.payloads()).await?;
        self.assign_uids(None, &mut uids.into_iter(), signer.attester());

        info!(
            schema = %self.schema.name,
            uid = %self.uid,
            attestations = plan.len(),
            "Attestation submitted"
        );
        Ok(self.uid)
    }

    /// Revoke this attestation. Revoking twice is a no-op.
    pub async fn revoke<S: AttestationSigner + ?Sized>(
        &mut self,
        signer: &S,
    ) -> Result<(), AttestationError> {
        if !self.schema.revocable {
            return Err(AttestationError::NotRevocable(self.schema.name.clone()));
        }
        if !self.is_submitted() {
            return Err(AttestationError::InvalidReference(format!(
                "cannot revoke an unsubmitted {} attestation",
                self.schema.name
            )));
        }
        if self.revoked {
            debug!(uid = %self.uid, "Attestation already revoked");
            return Ok(());
        }

        let tx_hash = signer
            .revoke(self.schema_uid, self.uid)
            .await
            .map_err(AttestationError::Revoke)?;

        self.revoked = true;
        self.revocation_time = Some(Utc::now());
        info!(uid = %self.uid, tx_hash = %tx_hash, "Attestation revoked");
        Ok(())
    }
}
