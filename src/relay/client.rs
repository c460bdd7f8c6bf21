// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Gelato relay HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::types::{SponsoredCall, TaskStatus};
use super::RelayError;

pub const DEFAULT_RELAY_API_URL: &str = "https://api.gelato.digital";

/// Source of relay task status.
#[async_trait]
pub trait RelayStatusSource: Send + Sync {
    /// `Ok(None)` means the relay has no status payload for this task.
    async fn task_status(&self, task_id: &str) -> Result<Option<TaskStatus>, RelayError>;
}

/// Relay that accepts sponsored calls.
#[async_trait]
pub trait SponsoredRelay: RelayStatusSource {
    /// Submit a call and return the relay's task id.
    async fn sponsored_call(&self, call: &SponsoredCall) -> Result<String, RelayError>;
}

#[derive(Debug, Clone)]
pub struct GelatoRelayClient {
    base_url: String,
    sponsor_api_key: Option<String>,
    http: Client,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SponsoredCallResponse {
    task_id: String,
}

#[derive(Debug, Deserialize)]
struct TaskStatusEnvelope {
    task: Option<TaskStatus>,
}

impl GelatoRelayClient {
    pub fn new(
        base_url: impl Into<String>,
        sponsor_api_key: Option<String>,
    ) -> Result<Self, RelayError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| RelayError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into(),
            sponsor_api_key,
            http,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl RelayStatusSource for GelatoRelayClient {
    async fn task_status(&self, task_id: &str) -> Result<Option<TaskStatus>, RelayError> {
        let path = format!("/tasks/status/{task_id}");
        let response = self
            .http
            .get(self.url(&path))
            .send()
            .await
            .map_err(|e| RelayError::Request(format!("GET {path} failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(RelayError::Status { status, body });
        }

        let envelope: TaskStatusEnvelope = response
            .json()
            .await
            .map_err(|e| RelayError::InvalidResponse(format!("GET {path} invalid JSON: {e}")))?;

        if envelope.task.is_none() {
            debug!(task_id = %task_id, "Relay returned no status payload");
        }
        Ok(envelope.task)
    }
}

#[async_trait]
impl SponsoredRelay for GelatoRelayClient {
    async fn sponsored_call(&self, call: &SponsoredCall) -> Result<String, RelayError> {
        let path = "/relays/v2/sponsored-call";
        let mut payload = json!({
            "chainId": call.chain_id.to_string(),
            "target": call.target.to_checksum(None),
            "data": alloy::hex::encode_prefixed(&call.data),
        });
        if let Some(key) = &self.sponsor_api_key {
            payload["sponsorApiKey"] = Value::String(key.clone());
        }

        let response = self
            .http
            .post(self.url(path))
            .json(&payload)
            .send()
            .await
            .map_err(|e| RelayError::Request(format!("POST {path} failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(RelayError::Status { status, body });
        }

        let accepted: SponsoredCallResponse = response
            .json()
            .await
            .map_err(|e| RelayError::InvalidResponse(format!("POST {path} invalid JSON: {e}")))?;

        debug!(task_id = %accepted.task_id, chain_id = call.chain_id, "Relay accepted sponsored call");
        Ok(accepted.task_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::types::TaskState;
    use crate::testing::serve;
    use alloy::primitives::{Address, Bytes};
    use axum::{extract::Path, http::StatusCode as AxumStatus, routing::get, routing::post, Json, Router};

    fn relay_router() -> Router {
        Router::new()
            .route(
                "/tasks/status/{task_id}",
                get(|Path(task_id): Path<String>| async move {
                    match task_id.as_str() {
                        "done" => (
                            AxumStatus::OK,
                            Json(json!({ "task": {
                                "taskId": "done",
                                "taskState": "ExecSuccess",
                                "transactionHash": "0xfeed"
                            }})),
                        ),
                        "throttled" => (
                            AxumStatus::TOO_MANY_REQUESTS,
                            Json(json!({ "message": "Too many requests" })),
                        ),
                        "empty" => (AxumStatus::OK, Json(json!({}))),
                        "null" => (AxumStatus::OK, Json(json!({ "task": null }))),
                        _ => (AxumStatus::NOT_FOUND, Json(json!({ "message": "Not found" }))),
                    }
                }),
            )
            .route(
                "/relays/v2/sponsored-call",
                post(|Json(body): Json<Value>| async move {
                    assert_eq!(body["chainId"], "10");
                    assert_eq!(body["sponsorApiKey"], "sponsor-key");
                    assert_eq!(body["data"], "0xdeadbeef");
                    Json(json!({ "taskId": "task-42" }))
                }),
            )
    }

    #[tokio::test]
    async fn task_status_reads_nested_task() {
        let base = serve(relay_router()).await;
        let client = GelatoRelayClient::new(base, None).unwrap();

        let status = client.task_status("done").await.unwrap().unwrap();
        assert_eq!(status.task_state, TaskState::ExecSuccess);
        assert_eq!(status.transaction_hash.as_deref(), Some("0xfeed"));
    }

    #[tokio::test]
    async fn missing_payload_is_none() {
        let base = serve(relay_router()).await;
        let client = GelatoRelayClient::new(base, None).unwrap();

        assert!(client.task_status("empty").await.unwrap().is_none());
        assert!(client.task_status("null").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn http_404_is_a_failed_poll() {
        let base = serve(relay_router()).await;
        let client = GelatoRelayClient::new(base, None).unwrap();

        let err = client.task_status("not-indexed-yet").await.unwrap_err();
        assert!(matches!(err, RelayError::Status { status: 404, .. }));
        assert_eq!(err.code(), "RELAY_HTTP_ERROR");
        assert!(err.terminal_state().is_none());
    }

    #[tokio::test]
    async fn rate_limit_surfaces_as_status_error() {
        let base = serve(relay_router()).await;
        let client = GelatoRelayClient::new(base, None).unwrap();

        let err = client.task_status("throttled").await.unwrap_err();
        assert!(err.is_rate_limited());
        assert_eq!(err.code(), "RELAY_RATE_LIMITED");
    }

    #[tokio::test]
    async fn sponsored_call_returns_task_id() {
        let base = serve(relay_router()).await;
        let client = GelatoRelayClient::new(base, Some("sponsor-key".to_string())).unwrap();

        let call = SponsoredCall {
            chain_id: 10,
            target: Address::repeat_byte(0x42),
            data: Bytes::from_static(&[0xde, 0xad, 0xbe, 0xef]),
        };
        assert_eq!(client.sponsored_call(&call).await.unwrap(), "task-42");
    }
}
