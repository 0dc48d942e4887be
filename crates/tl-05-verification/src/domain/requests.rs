//! Inbound request shapes, deserialized straight from HTTP bodies.

use serde::{Deserialize, Serialize};
use shared_types::Tier;
use std::collections::BTreeMap;

/// Single-signature check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyRequest {
    /// Artifact content, or its `sha256:<hex>` / bare hex digest.
    pub artifact: String,
    pub signature: String,
    #[serde(default)]
    pub certificate: Option<String>,
    /// Required signer identity, when the caller pins one.
    #[serde(default)]
    pub identity: Option<String>,
}

/// One signature in a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainSignature {
    pub signature: String,
    /// Resolved from the transparency log when absent.
    #[serde(default)]
    pub certificate: Option<String>,
    /// Outer signatures only: hash of the inner signature this one claims
    /// to cover.
    #[serde(default)]
    pub covers: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainSignatures {
    pub inner: ChainSignature,
    #[serde(default)]
    pub outer: Option<ChainSignature>,
}

/// Two-signer chain check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyChainRequest {
    /// Candidate locations of the artifact bytes, tried in order.
    pub artifact_locations: Vec<String>,
    pub signatures: ChainSignatures,
    #[serde(default)]
    pub sigstore_entry_id: Option<String>,
    #[serde(default)]
    pub tier: Tier,
}

/// Sign-and-log request as it arrives over HTTP.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignRequest {
    /// Artifact content, or its `sha256:<hex>` / bare hex digest.
    pub artifact: String,
    pub artifact_type: String,
    pub subject: String,
    #[serde(default)]
    pub predicates: BTreeMap<String, serde_json::Value>,
}
