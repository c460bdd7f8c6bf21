// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Chain types and constants.

use alloy::primitives::{address, Address, Bytes, B256};

/// EVM network configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    /// Network name for display
    pub name: String,
    /// Chain ID
    pub chain_id: u64,
    /// RPC endpoint URL
    pub rpc_url: String,
    /// EAS contract address
    pub eas_address: Address,
    /// Multi-attester contract used for sequential batch submission
    pub multi_attester: Option<Address>,
    /// Block explorer URL
    pub explorer_url: String,
}

/// EAS predeploy on OP Stack chains.
pub const OP_STACK_EAS: Address = address!("0x4200000000000000000000000000000000000021");

impl NetworkConfig {
    /// Optimism Sepolia testnet, the default development network.
    pub fn optimism_sepolia() -> Self {
        Self {
            name: "optimism-sepolia".to_string(),
            chain_id: 11_155_420,
            rpc_url: "https://sepolia.optimism.io".to_string(),
            eas_address: OP_STACK_EAS,
            multi_attester: None,
            explorer_url: "https://sepolia-optimism.etherscan.io".to_string(),
        }
    }

    /// Explorer link for a transaction hash.
    pub fn tx_url(&self, tx_hash: &B256) -> String {
        format!("{}/tx/{:#x}", self.explorer_url.trim_end_matches('/'), tx_hash)
    }
}

/// One entry of a multi-attestation batch.
///
/// A payload either carries an explicit `ref_uid` (its parent is already on
/// chain) or a `ref_idx` naming an earlier payload of the same batch whose
/// UID becomes the parent reference once the batch executes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiAttestData {
    pub schema_uid: B256,
    pub recipient: Address,
    pub ref_uid: B256,
    pub ref_idx: Option<usize>,
    /// ABI-encoded schema payload
    pub data: Bytes,
    pub revocable: bool,
    /// Unix seconds, zero for no expiration
    pub expiration_time: u64,
}
