// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! EVM chain integration for attestation submission.
//!
//! This module provides functionality for:
//! - Encoding EAS multi-attestation and revocation calls
//! - Submitting them directly with a local wallet
//! - Recovering attestation UIDs from transaction receipts

pub mod client;
pub mod eas;
pub mod signer;
pub mod types;

pub use client::{ChainError, ChainReader, EasClient};
pub use signer::{AttestationSigner, ReceiptSource};
pub use types::*;
