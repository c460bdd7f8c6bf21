// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Batch multi-attestation sender.

use alloy::primitives::B256;
use tracing::debug;

use super::AttestationError;
use crate::chain::{AttestationSigner, ChainError, MultiAttestData};

/// Sends a list of payloads as one multi-attestation transaction.
pub struct MultiAttest;

impl MultiAttest {
    /// Submit `payloads` atomically, returning their UIDs in input order.
    ///
    /// Either every payload lands or none does; a revert yields a single
    /// [`AttestationError::Attest`] and the whole batch must be resubmitted.
    pub async fn send<S: AttestationSigner + ?Sized>(
        signer: &S,
        payloads: &[MultiAttestData],
    ) -> Result<Vec<B256>, AttestationError> {
        validate(payloads)?;

        let uids = signer
            .multi_attest(payloads)
            .await
            .map_err(AttestationError::Attest)?;

        if uids.len() != payloads.len() {
            return Err(AttestationError::Attest(ChainError::Reverted(format!(
                "expected {} attestation uids, chain reported {}",
                payloads.len(),
                uids.len()
            ))));
        }

        debug!(
            count = uids.len(),
            attester = %signer.attester(),
            "Multi-attestation confirmed"
        );
        Ok(uids)
    }
}

fn validate(payloads: &[MultiAttestData]) -> Result<(), AttestationError> {
    if payloads.is_empty() {
        return Err(AttestationError::EmptyBatch);
    }

    for (index, payload) in payloads.iter().enumerate() {
        if let Some(ref_idx) = payload.ref_idx {
            if ref_idx >= index {
                return Err(AttestationError::InvalidReference(format!(
                    "payload {index} references payload {ref_idx}, which is not earlier in the batch"
                )));
            }
        }
    }

    Ok(())
}
