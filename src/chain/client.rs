// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! EAS chain clients.
//!
//! [`EasClient`] signs and sends transactions with a local wallet.
//! [`ChainReader`] is read-only and is used to recover UIDs from
//! transactions that were mined on our behalf by a relay.

use alloy::{
    network::{Ethereum, EthereumWallet},
    primitives::{Address, Bytes, B256},
    providers::{
        fillers::{
            BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller,
            WalletFiller,
        },
        Identity, Provider, ProviderBuilder, RootProvider,
    },
    rpc::types::{TransactionReceipt, TransactionRequest},
    signers::local::PrivateKeySigner,
};
use async_trait::async_trait;

use super::eas::{attested_uids, encode_multi_attest, encode_revoke};
use super::signer::{AttestationSigner, ReceiptSource};
use super::types::{MultiAttestData, NetworkConfig};
use crate::relay::RelayError;

/// Read-only HTTP provider (with all fillers).
type HttpProvider = FillProvider<
    JoinFill<
        Identity,
        JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
    >,
    RootProvider<Ethereum>,
>;

/// HTTP provider with a wallet attached for signing.
type SignerProvider = FillProvider<
    JoinFill<
        JoinFill<
            Identity,
            JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
        >,
        WalletFiller<EthereumWallet>,
    >,
    RootProvider<Ethereum>,
>;

fn parse_rpc_url(network: &NetworkConfig) -> Result<url::Url, ChainError> {
    network
        .rpc_url
        .parse()
        .map_err(|e: url::ParseError| ChainError::InvalidRpcUrl(e.to_string()))
}

/// Read-only chain client.
pub struct ChainReader {
    network: NetworkConfig,
    provider: HttpProvider,
}

impl ChainReader {
    /// Create a new reader for the specified network.
    pub fn new(network: NetworkConfig) -> Result<Self, ChainError> {
        let url = parse_rpc_url(&network)?;
        let provider = ProviderBuilder::new().connect_http(url);

        Ok(Self { network, provider })
    }

    /// Get a transaction receipt, `None` while the transaction is unknown or pending.
    pub async fn get_receipt(
        &self,
        tx_hash: B256,
    ) -> Result<Option<TransactionReceipt>, ChainError> {
        self.provider
            .get_transaction_receipt(tx_hash)
            .await
            .map_err(|e| ChainError::RpcError(format!("Failed to get receipt: {}", e)))
    }

    /// Get the network configuration.
    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }
}

#[async_trait]
impl ReceiptSource for ChainReader {
    async fn attested_uids(&self, tx_hash: B256) -> Result<Vec<B256>, ChainError> {
        let receipt = self
            .get_receipt(tx_hash)
            .await?
            .ok_or_else(|| ChainError::RpcError(format!("Transaction {tx_hash:#x} not found")))?;

        if !receipt.status() {
            return Err(ChainError::Reverted(self.network.tx_url(&tx_hash)));
        }

        Ok(attested_uids(&receipt))
    }
}

/// Signing EAS client that submits transactions directly.
pub struct EasClient {
    network: NetworkConfig,
    attester: Address,
    provider: SignerProvider,
}

impl EasClient {
    /// Create a new client with signing capabilities.
    pub fn new(network: NetworkConfig, signer: PrivateKeySigner) -> Result<Self, ChainError> {
        let url = parse_rpc_url(&network)?;
        let attester = signer.address();
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(url);

        Ok(Self {
            network,
            attester,
            provider,
        })
    }

    /// Create a signer from a private key (hex string, with or without 0x prefix).
    pub fn create_signer(private_key_hex: &str) -> Result<PrivateKeySigner, ChainError> {
        let key_bytes = alloy::hex::decode(private_key_hex.trim())
            .map_err(|e| ChainError::InvalidPrivateKey(e.to_string()))?;

        PrivateKeySigner::from_slice(&key_bytes)
            .map_err(|e| ChainError::InvalidPrivateKey(e.to_string()))
    }

    /// Get the network configuration.
    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    /// Send a call and wait for it to be mined successfully.
    async fn send_call(&self, to: Address, input: Bytes) -> Result<TransactionReceipt, ChainError> {
        let tx = TransactionRequest::default().to(to).input(input.into());

        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| ChainError::TransactionFailed(format!("Failed to send: {}", e)))?;

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| ChainError::RpcError(format!("Failed to get receipt: {}", e)))?;

        if !receipt.status() {
            return Err(ChainError::Reverted(
                self.network.tx_url(&receipt.transaction_hash),
            ));
        }

        tracing::debug!(
            tx_hash = %receipt.transaction_hash,
            block_number = receipt.block_number.unwrap_or(0),
            "Transaction mined"
        );

        Ok(receipt)
    }
}

#[async_trait]
impl AttestationSigner for EasClient {
    fn attester(&self) -> Address {
        self.attester
    }

    async fn multi_attest(&self, payloads: &[MultiAttestData]) -> Result<Vec<B256>, ChainError> {
        let target = self.network.multi_attester.ok_or_else(|| {
            ChainError::InvalidAddress("multi-attester contract is not configured".to_string())
        })?;

        let receipt = self
            .send_call(target, encode_multi_attest(payloads))
            .await?;
        Ok(attested_uids(&receipt))
    }

    async fn revoke(&self, schema_uid: B256, uid: B256) -> Result<B256, ChainError> {
        let receipt = self
            .send_call(self.network.eas_address, encode_revoke(schema_uid, uid))
            .await?;
        Ok(receipt.transaction_hash)
    }
}

/// Errors that can occur during chain operations.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("RPC error: {0}")]
    RpcError(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Transaction reverted: {0}")]
    Reverted(String),

    #[error("Relay error: {0}")]
    Relay(#[from] RelayError),
}

impl ChainError {
    /// Stable error code.
    pub fn code(&self) -> &'static str {
        match self {
            ChainError::InvalidRpcUrl(_) => "INVALID_RPC_URL",
            ChainError::InvalidAddress(_) => "INVALID_ADDRESS",
            ChainError::InvalidPrivateKey(_) => "INVALID_PRIVATE_KEY",
            ChainError::RpcError(_) => "RPC_ERROR",
            ChainError::TransactionFailed(_) => "TRANSACTION_FAILED",
            ChainError::Reverted(_) => "TRANSACTION_REVERTED",
            ChainError::Relay(e) => e.code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_KEY: &str = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

    #[test]
    fn create_signer_accepts_prefixed_and_bare_hex() {
        let bare = EasClient::create_signer(TEST_KEY).unwrap();
        let prefixed = EasClient::create_signer(&format!("0x{TEST_KEY}")).unwrap();
        assert_eq!(bare.address(), prefixed.address());
    }

    #[test]
    fn create_signer_rejects_garbage() {
        let err = EasClient::create_signer("not-a-key").unwrap_err();
        assert_eq!(err.code(), "INVALID_PRIVATE_KEY");
    }

    #[test]
    fn client_records_signer_address_as_attester() {
        let signer = EasClient::create_signer(TEST_KEY).unwrap();
        let expected = signer.address();
        let client = EasClient::new(NetworkConfig::optimism_sepolia(), signer).unwrap();
        assert_eq!(client.attester(), expected);
    }

    #[test]
    fn reader_rejects_bad_rpc_url() {
        let mut network = NetworkConfig::optimism_sepolia();
        network.rpc_url = "not a url".to_string();
        assert!(matches!(
            ChainReader::new(network),
            Err(ChainError::InvalidRpcUrl(_))
        ));
    }
}
