// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Crate-level error.

use crate::attestation::AttestationError;
use crate::chain::ChainError;
use crate::config::ConfigError;
use crate::indexer::IndexerError;
use crate::relay::RelayError;
use crate::remote::RemoteStorageError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Attestation(#[from] AttestationError),

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error(transparent)]
    RemoteStorage(#[from] RemoteStorageError),

    #[error(transparent)]
    Relay(#[from] RelayError),

    #[error(transparent)]
    Indexer(#[from] IndexerError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    /// Stable code of the underlying error.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Attestation(e) => e.code(),
            Error::Chain(e) => e.code(),
            Error::RemoteStorage(e) => e.code(),
            Error::Relay(e) => e.code(),
            Error::Indexer(e) => e.code(),
            Error::Config(e) => e.code(),
        }
    }
}
