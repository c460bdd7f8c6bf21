// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Attestation Graph
//!
//! Attestations form a forest: a root (for example a Community) has children
//! (Grants), which have children of their own (Milestones, GrantUpdates and
//! their verifications). A child points at its parent through `ref_uid`.
//!
//! Referential integrity is checked locally before anything is sent:
//! a child can only be created against a parent that already has a UID, and
//! pending children attached to an unsubmitted node are submitted in the same
//! multi-attestation call, parents first.

pub mod graph;
pub mod multi;
pub mod node;
pub mod registry;
pub mod schema;

pub use graph::AttestationGraph;
pub use multi::MultiAttest;
pub use node::{Attestation, SubmissionPlan, NULL_REF};
pub use registry::SchemaRegistry;
pub use schema::{Schema, SchemaField};

use crate::chain::ChainError;

/// Errors raised by the attestation graph.
#[derive(Debug, thiserror::Error)]
pub enum AttestationError {
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    #[error("Unknown schema: {0}")]
    UnknownSchema(String),

    #[error("Duplicate schema: {0}")]
    DuplicateSchema(String),

    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    #[error("Attestation {0:#x} was already submitted")]
    AlreadySubmitted(alloy::primitives::B256),

    #[error("Empty multi-attestation batch")]
    EmptyBatch,

    #[error("Attestation failed: {0}")]
    Attest(#[source] ChainError),

    #[error("Revocation failed: {0}")]
    Revoke(#[source] ChainError),

    #[error("Schema `{0}` is not revocable")]
    NotRevocable(String),
}

impl AttestationError {
    /// Stable error code.
    pub fn code(&self) -> &'static str {
        match self {
            AttestationError::InvalidSchema(_) => "INVALID_SCHEMA",
            AttestationError::UnknownSchema(_) => "UNKNOWN_SCHEMA",
            AttestationError::DuplicateSchema(_) => "DUPLICATE_SCHEMA",
            AttestationError::InvalidReference(_) => "INVALID_REFERENCE",
            AttestationError::AlreadySubmitted(_) => "ALREADY_SUBMITTED",
            AttestationError::EmptyBatch => "EMPTY_BATCH",
            AttestationError::Attest(_) => "ATTEST_ERROR",
            AttestationError::Revoke(_) => "REVOKE_ERROR",
            AttestationError::NotRevocable(_) => "NOT_REVOCABLE",
        }
    }
}
