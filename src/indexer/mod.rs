// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Indexer Client
//!
//! HTTP client for the external GAP indexer. Once attestations are on chain
//! the caller pushes them here so they become queryable without scanning
//! logs. Every request carries the access token in `x-access-token`.
//!
//! ## Endpoints
//!
//! | Method | Path | Purpose |
//! |--------|------|---------|
//! | `POST` | `/attestations` | Index submitted attestations |
//! | `POST` | `/projects/check` | Look up an existing project |
//! | `PUT` | `/grants/external-id/bulk-update` | Attach external ids to grants |

use std::time::Duration;

use alloy::primitives::{Address, B256};
use chrono::{DateTime, Utc};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::attestation::Attestation;
use crate::config::IndexerConfig;

const ACCESS_TOKEN_HEADER: &str = "x-access-token";

/// Attestation in the shape the indexer stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexedAttestation {
    pub uid: B256,
    #[serde(rename = "chainID")]
    pub chain_id: u64,
    #[serde(rename = "schemaUID")]
    pub schema_uid: B256,
    #[serde(rename = "refUID")]
    pub ref_uid: B256,
    pub attester: Address,
    pub recipient: Address,
    pub revoked: bool,
    pub revocation_time: Option<DateTime<Utc>>,
    pub data: Value,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl IndexedAttestation {
    /// Normalize a submitted attestation. Returns `None` while it has no UID.
    pub fn from_attestation(
        attestation: &Attestation,
        kind: impl Into<String>,
        external_id: Option<String>,
    ) -> Option<Self> {
        if !attestation.is_submitted() {
            return None;
        }

        Some(Self {
            uid: attestation.uid(),
            chain_id: attestation.chain_id,
            schema_uid: attestation.schema_uid,
            ref_uid: attestation.ref_uid(),
            attester: attestation.attester(),
            recipient: attestation.recipient,
            revoked: attestation.is_revoked(),
            revocation_time: attestation.revocation_time(),
            data: attestation.data.clone(),
            kind: kind.into(),
            external_id,
            created_at: attestation.created_at,
        })
    }
}

/// External id assignment for a project's grant within a community.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalIdUpdate {
    #[serde(rename = "projectUID")]
    pub project_uid: B256,
    #[serde(rename = "communityUID")]
    pub community_uid: B256,
    pub external_id: String,
}

#[derive(Debug, Clone)]
pub struct IndexerClient {
    base_url: String,
    access_token: Option<String>,
    http: Client,
}

impl IndexerClient {
    pub fn new(base_url: impl Into<String>, access_token: Option<String>) -> Result<Self, IndexerError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| IndexerError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token,
            http,
        })
    }

    pub fn from_config(config: &IndexerConfig) -> Result<Self, IndexerError> {
        Self::new(config.url.clone(), config.access_token.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let request = self.http.request(method, format!("{}{path}", self.base_url));
        match &self.access_token {
            Some(token) => request.header(ACCESS_TOKEN_HEADER, token),
            None => request,
        }
    }

    async fn send(&self, method: Method, path: &str, body: &impl Serialize) -> Result<reqwest::Response, IndexerError> {
        let response = self
            .request(method.clone(), path)
            .json(body)
            .send()
            .await
            .map_err(|e| IndexerError::Request(format!("{method} {path} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() && status != StatusCode::NOT_FOUND {
            let body = response.text().await.unwrap_or_default();
            return Err(IndexerError::Status {
                status: status.as_u16(),
                message: format!("{method} {path} returned {status}: {body}"),
            });
        }

        Ok(response)
    }

    /// Index a batch of submitted attestations.
    pub async fn post_attestations(&self, attestations: &[IndexedAttestation]) -> Result<(), IndexerError> {
        if attestations.is_empty() {
            return Ok(());
        }

        let path = "/attestations";
        let response = self.send(Method::POST, path, &attestations).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(IndexerError::Status {
                status: 404,
                message: format!("POST {path} returned 404"),
            });
        }

        info!(count = attestations.len(), "Indexed attestations");
        Ok(())
    }

    /// Look up a project; `None` if the indexer does not know it.
    pub async fn check_project(&self, query: &Value) -> Result<Option<Value>, IndexerError> {
        let path = "/projects/check";
        let response = self.send(Method::POST, path, query).await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!("Project not found in indexer");
            return Ok(None);
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| IndexerError::InvalidResponse(format!("POST {path} invalid JSON: {e}")))?;

        Ok(match body {
            Value::Null => None,
            Value::Bool(false) => None,
            other => Some(other),
        })
    }

    pub async fn bulk_update_external_ids(&self, updates: &[ExternalIdUpdate]) -> Result<(), IndexerError> {
        let path = "/grants/external-id/bulk-update";
        let response = self.send(Method::PUT, path, &updates).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(IndexerError::Status {
                status: 404,
                message: format!("PUT {path} returned 404"),
            });
        }

        info!(count = updates.len(), "Updated grant external ids");
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IndexerError {
    #[error("Indexer request failed: {0}")]
    Request(String),

    #[error("Indexer error ({status}): {message}")]
    Status { status: u16, message: String },

    #[error("Indexer response was invalid: {0}")]
    InvalidResponse(String),
}

impl IndexerError {
    pub fn code(&self) -> &'static str {
        match self {
            IndexerError::Request(_) => "INDEXER_REQUEST_FAILED",
            IndexerError::Status { status: 401 | 403, .. } => "INDEXER_UNAUTHORIZED",
            IndexerError::Status { .. } => "INDEXER_ERROR",
            IndexerError::InvalidResponse(_) => "INDEXER_INVALID_RESPONSE",
        }
    }
}
