// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! IPFS backend over a Kubo-compatible HTTP API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{multipart, Client};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{EncodedPayload, RemoteStorageError, StorageBackend, StorageType};

pub const DEFAULT_IPFS_API_URL: &str = "http://127.0.0.1:5001";
pub const DEFAULT_IPFS_GATEWAY_URL: &str = "https://ipfs.io";

const UPLOAD_FILE_NAME: &str = "data.json";

#[derive(Debug, Clone)]
pub struct IpfsClient {
    api_url: String,
    gateway_url: String,
    api_token: Option<String>,
    http: Client,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AddResponse {
    hash: String,
}

impl IpfsClient {
    pub fn new(
        api_url: impl Into<String>,
        gateway_url: impl Into<String>,
        api_token: Option<String>,
    ) -> Result<Self, RemoteStorageError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                RemoteStorageError::upload(
                    StorageType::Ipfs,
                    format!("failed to build HTTP client: {e}"),
                )
            })?;

        Ok(Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            gateway_url: gateway_url.into().trim_end_matches('/').to_string(),
            api_token,
            http,
        })
    }

    fn file_part(payload: EncodedPayload) -> Result<multipart::Part, RemoteStorageError> {
        let (file_name, content_type, bytes) = match payload {
            EncodedPayload::File {
                file_name,
                content_type,
                bytes,
            } => (file_name, content_type, bytes),
            EncodedPayload::Json(value) => (
                UPLOAD_FILE_NAME.to_string(),
                "application/json".to_string(),
                serde_json::to_vec(&value)
                    .map_err(|e| RemoteStorageError::encode(StorageType::Ipfs, e.to_string()))?,
            ),
        };

        multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(&content_type)
            .map_err(|e| RemoteStorageError::encode(StorageType::Ipfs, e.to_string()))
    }
}

#[async_trait]
impl StorageBackend for IpfsClient {
    fn storage_type(&self) -> StorageType {
        StorageType::Ipfs
    }

    fn encode(&self, data: &Value) -> Result<EncodedPayload, RemoteStorageError> {
        let bytes = serde_json::to_vec(data)
            .map_err(|e| RemoteStorageError::encode(StorageType::Ipfs, e.to_string()))?;

        Ok(EncodedPayload::File {
            file_name: UPLOAD_FILE_NAME.to_string(),
            content_type: "application/json".to_string(),
            bytes,
        })
    }

    async fn upload(&self, payload: EncodedPayload) -> Result<String, RemoteStorageError> {
        let path = "/api/v0/add?pin=true";
        let form = multipart::Form::new().part("file", Self::file_part(payload)?);

        let mut request = self
            .http
            .post(format!("{}{path}", self.api_url))
            .multipart(form);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            RemoteStorageError::upload(StorageType::Ipfs, format!("POST {path} failed: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteStorageError::upload(
                StorageType::Ipfs,
                format!("POST {path} returned {status}: {body}"),
            ));
        }

        let added: AddResponse = response.json().await.map_err(|e| {
            RemoteStorageError::upload(StorageType::Ipfs, format!("POST {path} invalid JSON: {e}"))
        })?;

        debug!(cid = %added.hash, "Pinned payload on IPFS");
        Ok(added.hash)
    }

    async fn fetch(&self, content_id: &str) -> Result<Value, RemoteStorageError> {
        let url = format!("{}/ipfs/{content_id}", self.gateway_url);

        let response = self.http.get(&url).send().await.map_err(|e| {
            RemoteStorageError::retrieval(StorageType::Ipfs, content_id, format!("GET {url} failed: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteStorageError::retrieval(
                StorageType::Ipfs,
                content_id,
                format!("GET {url} returned {status}: {body}"),
            ));
        }

        response.json().await.map_err(|e| {
            RemoteStorageError::retrieval(StorageType::Ipfs, content_id, format!("invalid JSON: {e}"))
        })
    }
}
