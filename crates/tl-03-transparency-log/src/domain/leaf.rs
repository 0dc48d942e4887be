//! Leaf encoding for the in-memory log.
//!
//! A leaf is the canonical JSON of the submitted fields, so anyone holding
//! an entry can recompute its leaf hash and check the entry's proof.

use shared_types::merkle::{leaf_hash, Hash32};
use shared_types::{canonical_json, CanonicalError, TransparencyLogEntry};

/// Canonical leaf bytes.
pub fn leaf_data(
    artifact_hash: &str,
    signature: &str,
    certificate: Option<&str>,
    signer: &str,
) -> Result<Vec<u8>, CanonicalError> {
    canonical_json(&serde_json::json!({
        "artifact_hash": artifact_hash,
        "signature": signature,
        "certificate": certificate,
        "signer": signer,
    }))
}

/// RFC 6962 leaf hash of an entry's submitted fields.
pub fn entry_leaf_hash(entry: &TransparencyLogEntry) -> Result<Hash32, CanonicalError> {
    let data = leaf_data(
        &entry.artifact_hash,
        &entry.signature,
        entry.certificate.as_deref(),
        &entry.signer,
    )?;
    Ok(leaf_hash(&data))
}
