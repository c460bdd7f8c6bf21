// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Schema field descriptors and payload encoding.
//!
//! Payloads are JSON objects keyed by field name. Encoding coerces each field
//! to its Solidity type and ABI-encodes the parameter tuple, the same layout
//! EAS uses for attestation data.

use alloy::{
    dyn_abi::{DynSolType, DynSolValue},
    primitives::{Bytes, B256},
};
use serde_json::{Map, Value};

use super::AttestationError;

/// One typed field of a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaField {
    pub name: String,
    pub kind: DynSolType,
}

impl SchemaField {
    pub fn new(name: impl Into<String>, kind: &str) -> Result<Self, AttestationError> {
        let name = name.into();
        let kind = DynSolType::parse(kind).map_err(|e| {
            AttestationError::InvalidSchema(format!("field `{name}` has invalid type `{kind}`: {e}"))
        })?;
        Ok(Self { name, kind })
    }
}

/// A registered class of claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// Chain-issued identifier
    pub uid: B256,
    /// Human label, unique per network
    pub name: String,
    pub fields: Vec<SchemaField>,
    pub revocable: bool,
}

impl Schema {
    pub fn new(uid: B256, name: impl Into<String>, fields: Vec<SchemaField>, revocable: bool) -> Self {
        Self {
            uid,
            name: name.into(),
            fields,
            revocable,
        }
    }

    /// Build a schema from an EAS definition string such as
    /// `"bool approved, string json"`.
    pub fn parse(
        uid: B256,
        name: impl Into<String>,
        definition: &str,
        revocable: bool,
    ) -> Result<Self, AttestationError> {
        let fields = definition
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                let (kind, field) = part.rsplit_once(char::is_whitespace).ok_or_else(|| {
                    AttestationError::InvalidSchema(format!(
                        "field definition `{part}` must be `<type> <name>`"
                    ))
                })?;
                SchemaField::new(field.trim(), kind.trim())
            })
            .collect::<Result<Vec<_>, _>>()?;

        if fields.is_empty() {
            return Err(AttestationError::InvalidSchema(
                "schema has no fields".to_string(),
            ));
        }

        Ok(Self::new(uid, name, fields, revocable))
    }

    /// EAS definition string for this schema.
    pub fn definition(&self) -> String {
        self.fields
            .iter()
            .map(|field| format!("{} {}", field.kind.sol_type_name(), field.name))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn tuple_type(&self) -> DynSolType {
        DynSolType::Tuple(self.fields.iter().map(|f| f.kind.clone()).collect())
    }

    /// ABI-encode `data` against the field descriptors.
    pub fn encode(&self, data: &Value) -> Result<Bytes, AttestationError> {
        let object = data.as_object().ok_or_else(|| {
            AttestationError::InvalidSchema(format!(
                "{} payload must be a JSON object",
                self.name
            ))
        })?;

        if let Some(unknown) = object
            .keys()
            .find(|key| !self.fields.iter().any(|f| &f.name == *key))
        {
            return Err(AttestationError::InvalidSchema(format!(
                "`{unknown}` is not a field of {}",
                self.name
            )));
        }

        let values = self
            .fields
            .iter()
            .map(|field| {
                let value = object.get(&field.name).ok_or_else(|| {
                    AttestationError::InvalidSchema(format!(
                        "{} payload is missing `{}`",
                        self.name, field.name
                    ))
                })?;
                coerce_field(field, value)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(DynSolValue::Tuple(values).abi_encode_params().into())
    }

    /// Decode ABI bytes back into a JSON object keyed by field name.
    pub fn decode(&self, bytes: &[u8]) -> Result<Value, AttestationError> {
        let decoded = self.tuple_type().abi_decode_params(bytes).map_err(|e| {
            AttestationError::InvalidSchema(format!("{} payload does not decode: {e}", self.name))
        })?;

        let values = match decoded {
            DynSolValue::Tuple(values) => values,
            single => vec![single],
        };

        let object: Map<String, Value> = self
            .fields
            .iter()
            .zip(values)
            .map(|(field, value)| (field.name.clone(), to_json(value)))
            .collect();
        Ok(Value::Object(object))
    }
}

fn coerce_field(field: &SchemaField, value: &Value) -> Result<DynSolValue, AttestationError> {
    let text = match (&field.kind, value) {
        (_, Value::Null) => {
            return Err(AttestationError::InvalidSchema(format!(
                "field `{}` is null",
                field.name
            )))
        }
        (DynSolType::String, Value::String(s)) => return Ok(DynSolValue::String(s.clone())),
        // Structured values stored in a string field travel as JSON text.
        (DynSolType::String, _) => return Ok(DynSolValue::String(value.to_string())),
        (_, Value::String(s)) => s.clone(),
        (_, other) => other.to_string(),
    };

    field.kind.coerce_str(&text).map_err(|e| {
        AttestationError::InvalidSchema(format!(
            "field `{}` cannot hold `{text}` as {}: {e}",
            field.name,
            field.kind.sol_type_name()
        ))
    })
}

fn to_json(value: DynSolValue) -> Value {
    match value {
        DynSolValue::Bool(b) => Value::Bool(b),
        DynSolValue::Int(i, _) => Value::String(i.to_string()),
        DynSolValue::Uint(u, _) => Value::String(u.to_string()),
        DynSolValue::FixedBytes(word, size) => {
            Value::String(alloy::hex::encode_prefixed(&word[..size]))
        }
        DynSolValue::Address(address) => Value::String(address.to_checksum(None)),
        DynSolValue::Bytes(bytes) => Value::String(alloy::hex::encode_prefixed(bytes)),
        DynSolValue::String(s) => Value::String(s),
        DynSolValue::Array(items) | DynSolValue::FixedArray(items) | DynSolValue::Tuple(items) => {
            Value::Array(items.into_iter().map(to_json).collect())
        }
        other => Value::String(format!("{other:?}")),
    }
}
