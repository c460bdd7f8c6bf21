// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Remote storage front: strategy selection, records and retrieval cache.

use serde_json::Value;
use tracing::{debug, info};

use crate::config::{StorageConfig, DEFAULT_CACHE_TTL};

use super::cache::RetrievalCache;
use super::ipfs::IpfsClient;
use super::sponsor::SponsorEndpoint;
use super::{EncodedPayload, RemoteStorageError, RemoteStorageRecord, StorageBackend, StorageType};

/// Where `save` sends payloads. Chosen once at construction.
#[derive(Debug, Clone)]
pub enum SaveStrategy {
    /// Upload through the backend.
    Direct,
    /// POST to a sponsor endpoint; the backend is never written to.
    Sponsored(SponsorEndpoint),
}

#[derive(Debug)]
pub struct RemoteStorage<B> {
    backend: B,
    strategy: SaveStrategy,
    cache: Option<RetrievalCache>,
}

impl<B: StorageBackend> RemoteStorage<B> {
    pub fn new(backend: B, sponsor: Option<SponsorEndpoint>) -> Self {
        let strategy = match sponsor {
            Some(endpoint) => {
                info!(
                    storage_type = %backend.storage_type(),
                    sponsor = %endpoint.url(),
                    "Remote storage writes go through sponsor"
                );
                SaveStrategy::Sponsored(endpoint)
            }
            None => SaveStrategy::Direct,
        };

        Self {
            backend,
            strategy,
            cache: None,
        }
    }

    pub fn with_cache(mut self, cache: RetrievalCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn has_cache(&self) -> bool {
        self.cache.is_some()
    }

    pub fn storage_type(&self) -> StorageType {
        self.backend.storage_type()
    }

    pub fn strategy(&self) -> &SaveStrategy {
        &self.strategy
    }

    pub fn is_sponsored(&self) -> bool {
        matches!(self.strategy, SaveStrategy::Sponsored(_))
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Store `data` and return its content id.
    pub async fn save(&self, data: &Value, schema_name: &str) -> Result<String, RemoteStorageError> {
        let content_id = match &self.strategy {
            SaveStrategy::Direct => {
                let payload = self.backend.encode(data)?;
                self.backend.upload(payload).await?
            }
            SaveStrategy::Sponsored(endpoint) => {
                endpoint
                    .save(data, schema_name, self.backend.storage_type())
                    .await?
            }
        };

        debug!(
            storage_type = %self.storage_type(),
            schema = %schema_name,
            content_id = %content_id,
            "Saved remote payload"
        );
        Ok(content_id)
    }

    /// Store `data` and return the record to embed on chain.
    pub async fn save_record(
        &self,
        data: &Value,
        schema_name: &str,
    ) -> Result<RemoteStorageRecord, RemoteStorageError> {
        let content_id = self.save(data, schema_name).await?;
        Ok(RemoteStorageRecord::new(self.storage_type(), content_id))
    }

    pub async fn get(&self, content_id: &str) -> Result<Value, RemoteStorageError> {
        if let Some(data) = self.cache.as_ref().and_then(|cache| cache.get(content_id)) {
            return Ok(data);
        }

        let data = self.backend.fetch(content_id).await?;
        if let Some(cache) = &self.cache {
            cache.put(content_id, data.clone());
        }
        Ok(data)
    }

    /// Transform `data` into the backend's upload shape without storing it.
    pub fn encode(&self, data: &Value) -> Result<EncodedPayload, RemoteStorageError> {
        self.backend.encode(data)
    }
}

impl RemoteStorage<IpfsClient> {
    /// IPFS storage as configured: sponsored when `sponsor_url` is set,
    /// cached unless `cache_capacity` is zero.
    pub fn from_config(config: &StorageConfig) -> Result<Self, RemoteStorageError> {
        let backend = IpfsClient::new(
            config.ipfs_api_url.clone(),
            config.ipfs_gateway_url.clone(),
            config.ipfs_api_token.clone(),
        )?;
        let sponsor = config
            .sponsor_url
            .as_deref()
            .map(SponsorEndpoint::new)
            .transpose()?;

        let storage = Self::new(backend, sponsor);
        Ok(match config.cache_capacity {
            0 => storage,
            capacity => storage.with_cache(RetrievalCache::new(capacity, DEFAULT_CACHE_TTL)),
        })
    }
}
