// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-process content-addressed store for local development and tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use sha2::{Digest, Sha256};

use super::{EncodedPayload, RemoteStorageError, StorageBackend, StorageType};

/// Stores payloads in memory under the hex SHA-256 of their JSON bytes.
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    storage_type: StorageType,
    entries: Arc<Mutex<HashMap<String, Value>>>,
}

impl MemoryStorage {
    pub fn new(storage_type: StorageType) -> Self {
        Self {
            storage_type,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn remove(&self, content_id: &str) -> Option<Value> {
        self.entries.lock().ok()?.remove(content_id)
    }

    fn content_id(bytes: &[u8]) -> String {
        alloy::hex::encode(Sha256::digest(bytes))
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new(StorageType::Ipfs)
    }
}

#[async_trait]
impl StorageBackend for MemoryStorage {
    fn storage_type(&self) -> StorageType {
        self.storage_type
    }

    fn encode(&self, data: &Value) -> Result<EncodedPayload, RemoteStorageError> {
        Ok(EncodedPayload::Json(data.clone()))
    }

    async fn upload(&self, payload: EncodedPayload) -> Result<String, RemoteStorageError> {
        let value = match payload {
            EncodedPayload::Json(value) => value,
            EncodedPayload::File { bytes, .. } => serde_json::from_slice(&bytes).map_err(|e| {
                RemoteStorageError::upload(self.storage_type, format!("file is not JSON: {e}"))
            })?,
        };

        let bytes = serde_json::to_vec(&value)
            .map_err(|e| RemoteStorageError::upload(self.storage_type, e.to_string()))?;
        let content_id = Self::content_id(&bytes);

        self.entries
            .lock()
            .map_err(|_| RemoteStorageError::upload(self.storage_type, "store lock poisoned"))?
            .insert(content_id.clone(), value);

        Ok(content_id)
    }

    async fn fetch(&self, content_id: &str) -> Result<Value, RemoteStorageError> {
        let entries = self.entries.lock().map_err(|_| {
            RemoteStorageError::retrieval(self.storage_type, content_id, "store lock poisoned")
        })?;

        entries
            .get(content_id)
            .cloned()
            .ok_or_else(|| RemoteStorageError::retrieval(self.storage_type, content_id, "not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn same_payload_same_id() {
        let storage = MemoryStorage::default();
        let a = storage.upload(EncodedPayload::Json(json!({ "a": 1, "b": 2 }))).await.unwrap();
        let b = storage.upload(EncodedPayload::Json(json!({ "b": 2, "a": 1 }))).await.unwrap();

        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert_eq!(storage.len(), 1);
    }

    #[tokio::test]
    async fn file_payloads_are_parsed() {
        let storage = MemoryStorage::new(StorageType::Swarm);
        let id = storage
            .upload(EncodedPayload::File {
                file_name: "data.json".to_string(),
                content_type: "application/json".to_string(),
                bytes: br#"{"title":"x"}"#.to_vec(),
            })
            .await
            .unwrap();

        assert_eq!(storage.fetch(&id).await.unwrap(), json!({ "title": "x" }));
    }

    #[tokio::test]
    async fn missing_id_names_the_id() {
        let storage = MemoryStorage::new(StorageType::Arweave);
        let err = storage.fetch("missing-id").await.unwrap_err();

        assert_eq!(err.tag(), "ARWEAVE_RETRIEVAL");
        assert!(err.to_string().contains("missing-id"));
    }
}
