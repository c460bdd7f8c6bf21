// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! EAS and multi-attester contract calls.

use alloy::{
    primitives::{Bytes, B256, U256},
    rpc::types::TransactionReceipt,
    sol,
    sol_types::SolCall,
};

use super::types::MultiAttestData;

// Define the EAS request structs and the sequential multi-attester entry point
sol! {
    struct AttestationRequestData {
        address recipient;
        uint64 expirationTime;
        bool revocable;
        bytes32 refUID;
        bytes data;
        uint256 value;
    }

    struct MultiAttestationRequest {
        bytes32 schema;
        AttestationRequestData[] data;
    }

    /// `refIdx` equal to the request's own position means "use `refUID` as given".
    struct SequentialRequest {
        uint256 refIdx;
        MultiAttestationRequest multiRequest;
    }

    struct RevocationRequestData {
        bytes32 uid;
        uint256 value;
    }

    struct RevocationRequest {
        bytes32 schema;
        RevocationRequestData data;
    }

    interface IEAS {
        event Attested(address indexed recipient, address indexed attester, bytes32 uid, bytes32 indexed schemaUID);
        event Revoked(address indexed recipient, address indexed attester, bytes32 uid, bytes32 indexed schemaUID);

        function revoke(RevocationRequest calldata request) external payable;
    }

    interface IMultiAttester {
        function multiSequentialAttest(SequentialRequest[] calldata requests) external;
    }
}

/// Encode a batch as one `multiSequentialAttest` call.
pub fn encode_multi_attest(payloads: &[MultiAttestData]) -> Bytes {
    let requests = payloads
        .iter()
        .enumerate()
        .map(|(index, payload)| SequentialRequest {
            refIdx: U256::from(payload.ref_idx.unwrap_or(index)),
            multiRequest: MultiAttestationRequest {
                schema: payload.schema_uid,
                data: vec![AttestationRequestData {
                    recipient: payload.recipient,
                    expirationTime: payload.expiration_time,
                    revocable: payload.revocable,
                    refUID: payload.ref_uid,
                    data: payload.data.clone(),
                    value: U256::ZERO,
                }],
            },
        })
        .collect();

    IMultiAttester::multiSequentialAttestCall { requests }
        .abi_encode()
        .into()
}

/// Encode an EAS `revoke` call.
pub fn encode_revoke(schema_uid: B256, uid: B256) -> Bytes {
    IEAS::revokeCall {
        request: RevocationRequest {
            schema: schema_uid,
            data: RevocationRequestData {
                uid,
                value: U256::ZERO,
            },
        },
    }
    .abi_encode()
    .into()
}

/// Attestation UIDs emitted by a receipt, in log order.
pub fn attested_uids(receipt: &TransactionReceipt) -> Vec<B256> {
    receipt
        .inner
        .logs()
        .iter()
        .filter_map(|log| log.log_decode::<IEAS::Attested>().ok())
        .map(|decoded| decoded.inner.data.uid)
        .collect()
}
