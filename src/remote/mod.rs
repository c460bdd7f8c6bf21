// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Remote Storage
//!
//! Large attestation payloads are kept off chain. The payload is uploaded to a
//! content-addressed store and only the resulting [`RemoteStorageRecord`]
//! (storage type + content id) is embedded in the attestation.
//!
//! [`RemoteStorage`] wraps a [`StorageBackend`] and decides once, at
//! construction, whether writes go to the backend directly or to a sponsor
//! endpoint that pays for storage on the caller's behalf.

pub mod cache;
pub mod client;
pub mod ipfs;
pub mod memory;
pub mod sponsor;

pub use cache::RetrievalCache;
pub use client::{RemoteStorage, SaveStrategy};
pub use ipfs::IpfsClient;
pub use memory::MemoryStorage;
pub use sponsor::{ResponseParser, SponsorEndpoint};

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of remote store. The numeric codes are the on-chain representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", from = "u8")]
pub enum StorageType {
    Ipfs,
    Arweave,
    Swarm,
    Unknown,
}

impl StorageType {
    pub fn code(self) -> u8 {
        match self {
            StorageType::Ipfs => 0,
            StorageType::Arweave => 1,
            StorageType::Swarm => 2,
            StorageType::Unknown => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StorageType::Ipfs => "IPFS",
            StorageType::Arweave => "ARWEAVE",
            StorageType::Swarm => "SWARM",
            StorageType::Unknown => "UNKNOWN",
        }
    }
}

impl From<u8> for StorageType {
    fn from(code: u8) -> Self {
        match code {
            0 => StorageType::Ipfs,
            1 => StorageType::Arweave,
            2 => StorageType::Swarm,
            _ => StorageType::Unknown,
        }
    }
}

impl From<StorageType> for u8 {
    fn from(storage_type: StorageType) -> Self {
        storage_type.code()
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pointer to a payload held in remote storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteStorageRecord {
    pub storage_type: StorageType,
    pub content_id: String,
}

impl RemoteStorageRecord {
    pub fn new(storage_type: StorageType, content_id: impl Into<String>) -> Self {
        Self {
            storage_type,
            content_id: content_id.into(),
        }
    }
}

/// Upload shape produced by [`StorageBackend::encode`].
#[derive(Debug, Clone, PartialEq)]
pub enum EncodedPayload {
    Json(Value),
    File {
        file_name: String,
        content_type: String,
        bytes: Vec<u8>,
    },
}

/// A content-addressed store.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    fn storage_type(&self) -> StorageType;

    /// Pure transform of `data` into the shape [`StorageBackend::upload`] expects.
    fn encode(&self, data: &Value) -> Result<EncodedPayload, RemoteStorageError>;

    /// Store an encoded payload and return its content id.
    async fn upload(&self, payload: EncodedPayload) -> Result<String, RemoteStorageError>;

    async fn fetch(&self, content_id: &str) -> Result<Value, RemoteStorageError>;
}

/// Remote storage errors, tagged with the storage type.
#[derive(Debug, thiserror::Error)]
pub enum RemoteStorageError {
    #[error("{storage_type}_UPLOAD: {message}")]
    Upload {
        storage_type: StorageType,
        message: String,
    },

    #[error("{storage_type}_RETRIEVAL: {content_id}: {message}")]
    Retrieval {
        storage_type: StorageType,
        content_id: String,
        message: String,
    },

    #[error("{storage_type}_ENCODE: {message}")]
    Encode {
        storage_type: StorageType,
        message: String,
    },
}

impl RemoteStorageError {
    pub fn upload(storage_type: StorageType, message: impl Into<String>) -> Self {
        RemoteStorageError::Upload {
            storage_type,
            message: message.into(),
        }
    }

    pub fn retrieval(
        storage_type: StorageType,
        content_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        RemoteStorageError::Retrieval {
            storage_type,
            content_id: content_id.into(),
            message: message.into(),
        }
    }

    pub fn encode(storage_type: StorageType, message: impl Into<String>) -> Self {
        RemoteStorageError::Encode {
            storage_type,
            message: message.into(),
        }
    }

    /// Stable error code.
    pub fn code(&self) -> &'static str {
        "REMOTE_STORAGE_ERROR"
    }

    /// Operation tag such as `IPFS_UPLOAD`.
    pub fn tag(&self) -> String {
        match self {
            RemoteStorageError::Upload { storage_type, .. } => format!("{storage_type}_UPLOAD"),
            RemoteStorageError::Retrieval { storage_type, .. } => {
                format!("{storage_type}_RETRIEVAL")
            }
            RemoteStorageError::Encode { storage_type, .. } => format!("{storage_type}_ENCODE"),
        }
    }

    pub fn storage_type(&self) -> StorageType {
        match self {
            RemoteStorageError::Upload { storage_type, .. }
            | RemoteStorageError::Retrieval { storage_type, .. }
            | RemoteStorageError::Encode { storage_type, .. } => *storage_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_type_codes() {
        for (storage_type, code) in [
            (StorageType::Ipfs, 0u8),
            (StorageType::Arweave, 1),
            (StorageType::Swarm, 2),
            (StorageType::Unknown, 3),
        ] {
            assert_eq!(storage_type.code(), code);
            assert_eq!(StorageType::from(code), storage_type);
        }
        assert_eq!(StorageType::from(9), StorageType::Unknown);
    }

    #[test]
    fn record_serializes_numeric_type() {
        let record = RemoteStorageRecord::new(StorageType::Ipfs, "bafy123");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json, serde_json::json!({ "storageType": 0, "contentId": "bafy123" }));

        let back: RemoteStorageRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn error_tags() {
        let err = RemoteStorageError::upload(StorageType::Ipfs, "connection refused");
        assert_eq!(err.tag(), "IPFS_UPLOAD");
        assert_eq!(err.code(), "REMOTE_STORAGE_ERROR");
        assert_eq!(err.to_string(), "IPFS_UPLOAD: connection refused");

        let err = RemoteStorageError::retrieval(StorageType::Arweave, "ar-1", "not found");
        assert_eq!(err.tag(), "ARWEAVE_RETRIEVAL");
        assert!(err.to_string().contains("ar-1"));
    }
}
