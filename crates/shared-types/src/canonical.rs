//! # Canonical JSON
//!
//! Object keys sorted, no whitespace. Two values with the same content
//! always produce the same bytes, regardless of the order fields were
//! inserted in.

use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Errors raised while canonicalizing a value.
#[derive(Debug, Error)]
pub enum CanonicalError {
    /// The value could not be represented as JSON.
    #[error("Canonical serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn sort_value(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut sorted = Map::new();
            for (key, inner) in entries {
                sorted.insert(key, sort_value(inner));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_value).collect()),
        other => other,
    }
}

/// Serialize `value` to canonical JSON bytes.
pub fn canonical_json(value: &impl Serialize) -> Result<Vec<u8>, CanonicalError> {
    let value = serde_json::to_value(value)?;
    Ok(serde_json::to_vec(&sort_value(value))?)
}

/// Lowercase hex SHA-256 of the canonical JSON form (64 characters).
pub fn content_hash(value: &impl Serialize) -> Result<String, CanonicalError> {
    let bytes = canonical_json(value)?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}
