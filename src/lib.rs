// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! GAP Attest - attestation graph client for EAS-based grant tracking
//!
//! This crate records attestation trees (communities, grants, milestones and
//! their updates) on EVM chains, offloads large payloads to content-addressed
//! storage and follows gas-sponsored relay tasks to their final outcome.
//!
//! ## Modules
//!
//! - `attestation` - Schemas, attestation nodes and batch submission
//! - `chain` - EAS contract encoding and direct submission (alloy)
//! - `relay` - Sponsored relay client and task watcher
//! - `remote` - Remote payload storage (IPFS, sponsor endpoints)
//! - `indexer` - External indexer client
//! - `config` - Environment configuration

pub mod attestation;
pub mod chain;
pub mod config;
pub mod error;
pub mod indexer;
pub mod relay;
pub mod remote;
pub mod telemetry;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
