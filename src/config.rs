// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the crate. Configuration is loaded from the environment once at
//! startup with [`Config::from_env`].
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `GAP_NETWORK` | Network label | `optimism-sepolia` |
//! | `GAP_CHAIN_ID` | Chain id | `11155420` |
//! | `GAP_RPC_URL` | JSON-RPC endpoint | `https://sepolia.optimism.io` |
//! | `GAP_EXPLORER_URL` | Block explorer | `https://sepolia-optimism.etherscan.io` |
//! | `GAP_EAS_ADDRESS` | EAS contract | `0x4200000000000000000000000000000000000021` |
//! | `GAP_MULTI_ATTESTER` | Multi-attester contract | Required for batch submission |
//! | `RELAY_API_URL` | Relay base URL | `https://api.gelato.digital` |
//! | `RELAY_SPONSOR_API_KEY` | Relay sponsor key | Optional |
//! | `RELAY_POLL_INTERVAL_MS` | Initial watcher poll interval | `500` |
//! | `RELAY_TIMEOUT_SECS` | Watcher timeout | Unset (no timeout) |
//! | `IPFS_API_URL` | Kubo-compatible API | `http://127.0.0.1:5001` |
//! | `IPFS_GATEWAY_URL` | Retrieval gateway | `https://ipfs.io` |
//! | `IPFS_API_TOKEN` | Bearer token for hosted pinning | Optional |
//! | `STORAGE_SPONSOR_URL` | Sponsored storage endpoint | Optional |
//! | `STORAGE_CACHE_CAPACITY` | Retrieval cache entries (`0` disables) | `256` |
//! | `INDEXER_URL` | Indexer base URL | Optional |
//! | `INDEXER_ACCESS_TOKEN` | Indexer access token | Optional |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |

use std::str::FromStr;
use std::time::Duration;

use alloy::primitives::Address;

use crate::chain::{NetworkConfig, OP_STACK_EAS};
use crate::relay::client::DEFAULT_RELAY_API_URL;
use crate::remote::ipfs::{DEFAULT_IPFS_API_URL, DEFAULT_IPFS_GATEWAY_URL};
use crate::telemetry::LogFormat;

pub const NETWORK_ENV: &str = "GAP_NETWORK";
pub const CHAIN_ID_ENV: &str = "GAP_CHAIN_ID";
pub const RPC_URL_ENV: &str = "GAP_RPC_URL";
pub const EXPLORER_URL_ENV: &str = "GAP_EXPLORER_URL";
pub const EAS_ADDRESS_ENV: &str = "GAP_EAS_ADDRESS";
pub const MULTI_ATTESTER_ENV: &str = "GAP_MULTI_ATTESTER";

pub const RELAY_API_URL_ENV: &str = "RELAY_API_URL";
pub const RELAY_SPONSOR_API_KEY_ENV: &str = "RELAY_SPONSOR_API_KEY";
pub const RELAY_POLL_INTERVAL_MS_ENV: &str = "RELAY_POLL_INTERVAL_MS";
/// Unset means watchers wait until the task is terminal.
pub const RELAY_TIMEOUT_SECS_ENV: &str = "RELAY_TIMEOUT_SECS";

pub const IPFS_API_URL_ENV: &str = "IPFS_API_URL";
pub const IPFS_GATEWAY_URL_ENV: &str = "IPFS_GATEWAY_URL";
pub const IPFS_API_TOKEN_ENV: &str = "IPFS_API_TOKEN";
/// When set, remote storage writes go to this endpoint instead of IPFS.
pub const STORAGE_SPONSOR_URL_ENV: &str = "STORAGE_SPONSOR_URL";
pub const STORAGE_CACHE_CAPACITY_ENV: &str = "STORAGE_CACHE_CAPACITY";

pub const INDEXER_URL_ENV: &str = "INDEXER_URL";
pub const INDEXER_ACCESS_TOKEN_ENV: &str = "INDEXER_ACCESS_TOKEN";

pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;
pub const DEFAULT_CACHE_CAPACITY: usize = 256;
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(600);

/// Relay client and watcher settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayWatcherConfig {
    pub api_url: String,
    pub sponsor_api_key: Option<String>,
    pub poll_interval: Duration,
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub ipfs_api_url: String,
    pub ipfs_gateway_url: String,
    pub ipfs_api_token: Option<String>,
    pub sponsor_url: Option<String>,
    pub cache_capacity: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexerConfig {
    pub url: String,
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub network: NetworkConfig,
    pub relay: RelayWatcherConfig,
    pub storage: StorageConfig,
    pub indexer: Option<IndexerConfig>,
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to
    /// its raw value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(lookup);
        let defaults = NetworkConfig::optimism_sepolia();

        let network = NetworkConfig {
            name: env.or_default(NETWORK_ENV, &defaults.name),
            chain_id: env.parse::<u64>(CHAIN_ID_ENV)?.unwrap_or(defaults.chain_id),
            rpc_url: env.url(RPC_URL_ENV)?.unwrap_or(defaults.rpc_url),
            eas_address: env.parse::<Address>(EAS_ADDRESS_ENV)?.unwrap_or(OP_STACK_EAS),
            multi_attester: env.parse(MULTI_ATTESTER_ENV)?,
            explorer_url: env.url(EXPLORER_URL_ENV)?.unwrap_or(defaults.explorer_url),
        };

        let relay = RelayWatcherConfig {
            api_url: env
                .url(RELAY_API_URL_ENV)?
                .unwrap_or_else(|| DEFAULT_RELAY_API_URL.to_string()),
            sponsor_api_key: env.optional(RELAY_SPONSOR_API_KEY_ENV),
            poll_interval: Duration::from_millis(
                env.parse::<u64>(RELAY_POLL_INTERVAL_MS_ENV)?
                    .unwrap_or(DEFAULT_POLL_INTERVAL_MS),
            ),
            timeout: env.parse::<u64>(RELAY_TIMEOUT_SECS_ENV)?.map(Duration::from_secs),
        };

        let storage = StorageConfig {
            ipfs_api_url: env
                .url(IPFS_API_URL_ENV)?
                .unwrap_or_else(|| DEFAULT_IPFS_API_URL.to_string()),
            ipfs_gateway_url: env
                .url(IPFS_GATEWAY_URL_ENV)?
                .unwrap_or_else(|| DEFAULT_IPFS_GATEWAY_URL.to_string()),
            ipfs_api_token: env.optional(IPFS_API_TOKEN_ENV),
            sponsor_url: env.url(STORAGE_SPONSOR_URL_ENV)?,
            cache_capacity: env
                .parse::<usize>(STORAGE_CACHE_CAPACITY_ENV)?
                .unwrap_or(DEFAULT_CACHE_CAPACITY),
        };

        let indexer = env.url(INDEXER_URL_ENV)?.map(|url| IndexerConfig {
            url,
            access_token: env.optional(INDEXER_ACCESS_TOKEN_ENV),
        });

        let log_format = env.parse::<LogFormat>(LOG_FORMAT_ENV)?.unwrap_or_default();

        Ok(Self {
            network,
            relay,
            storage,
            indexer,
            log_format,
        })
    }
}

struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    /// Trimmed value, `None` when unset or blank.
    fn optional(&self, name: &str) -> Option<String> {
        (self.0)(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn or_default(&self, name: &str, default: &str) -> String {
        self.optional(name).unwrap_or_else(|| default.to_string())
    }

    fn parse<T>(&self, name: &str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(name)
            .map(|raw| {
                raw.parse().map_err(|e| ConfigError::Invalid {
                    name: name.to_string(),
                    value: raw.clone(),
                    reason: format!("{e}"),
                })
            })
            .transpose()
    }

    fn url(&self, name: &str) -> Result<Option<String>, ConfigError> {
        Ok(self
            .parse::<url::Url>(name)?
            .map(|url| url.as_str().trim_end_matches('/').to_string()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name} ({value}): {reason}")]
    Invalid {
        name: String,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::Invalid { .. } => "INVALID_CONFIG",
        }
    }
}
