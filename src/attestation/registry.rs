// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Schema registry.
//!
//! Built once at startup from the network's schema list and shared behind an
//! `Arc`; it is never written after construction.

use std::collections::HashMap;
use std::sync::Arc;

use alloy::primitives::B256;

use super::schema::Schema;
use super::AttestationError;

#[derive(Debug, Default)]
pub struct SchemaRegistry {
    by_name: HashMap<String, Arc<Schema>>,
    by_uid: HashMap<B256, Arc<Schema>>,
}

impl SchemaRegistry {
    /// Index `schemas`, rejecting duplicate names or UIDs.
    pub fn new(schemas: impl IntoIterator<Item = Schema>) -> Result<Self, AttestationError> {
        let mut registry = Self::default();

        for schema in schemas {
            if registry.by_name.contains_key(&schema.name) {
                return Err(AttestationError::DuplicateSchema(schema.name));
            }
            if registry.by_uid.contains_key(&schema.uid) {
                return Err(AttestationError::DuplicateSchema(format!(
                    "{} reuses uid {:#x}",
                    schema.name, schema.uid
                )));
            }

            let schema = Arc::new(schema);
            registry.by_uid.insert(schema.uid, Arc::clone(&schema));
            registry.by_name.insert(schema.name.clone(), schema);
        }

        Ok(registry)
    }

    /// Look up a schema by name.
    pub fn get(&self, name: &str) -> Result<Arc<Schema>, AttestationError> {
        self.by_name
            .get(name)
            .cloned()
            .ok_or_else(|| AttestationError::UnknownSchema(name.to_string()))
    }

    pub fn by_uid(&self, uid: &B256) -> Option<Arc<Schema>> {
        self.by_uid.get(uid).cloned()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
