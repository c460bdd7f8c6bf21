// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Sponsored storage endpoint.
//!
//! A sponsor is an HTTP service that stores payloads on the caller's behalf.
//! It receives `{ "data": <payload>, "type": <schema name> }` and answers with
//! JSON containing the content id (by default under `cid`).

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use super::{RemoteStorageError, StorageType};

/// Extracts the content id from a sponsor response.
pub type ResponseParser = Arc<dyn Fn(&Value) -> Option<String> + Send + Sync>;

fn default_parser(response: &Value) -> Option<String> {
    response
        .get("cid")
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[derive(Clone)]
pub struct SponsorEndpoint {
    url: String,
    http: Client,
    parser: ResponseParser,
}

impl SponsorEndpoint {
    pub fn new(url: impl Into<String>) -> Result<Self, RemoteStorageError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                RemoteStorageError::upload(
                    StorageType::Unknown,
                    format!("failed to build HTTP client: {e}"),
                )
            })?;

        Ok(Self {
            url: url.into(),
            http,
            parser: Arc::new(default_parser),
        })
    }

    /// Replace the response parser.
    pub fn with_parser(mut self, parser: ResponseParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// POST `data` to the sponsor and return the content id it reports.
    pub async fn save(
        &self,
        data: &Value,
        schema_name: &str,
        storage_type: StorageType,
    ) -> Result<String, RemoteStorageError> {
        let payload = json!({ "data": data, "type": schema_name });

        let response = self
            .http
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| RemoteStorageError::upload(storage_type, format!("POST {} failed: {e}", self.url)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteStorageError::upload(
                storage_type,
                format!("POST {} returned {status}: {body}", self.url),
            ));
        }

        let body: Value = response.json().await.map_err(|e| {
            RemoteStorageError::upload(storage_type, format!("POST {} invalid JSON: {e}", self.url))
        })?;

        let content_id = (self.parser)(&body).ok_or_else(|| {
            RemoteStorageError::upload(
                storage_type,
                format!("POST {} response has no content id: {body}", self.url),
            )
        })?;

        debug!(schema = %schema_name, content_id = %content_id, "Sponsor stored payload");
        Ok(content_id)
    }
}

impl fmt::Debug for SponsorEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SponsorEndpoint")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_parser_reads_cid() {
        assert_eq!(default_parser(&json!({ "cid": "bafy1" })), Some("bafy1".to_string()));
        assert_eq!(default_parser(&json!({ "hash": "bafy1" })), None);
        assert_eq!(default_parser(&json!({ "cid": 7 })), None);
    }
}
