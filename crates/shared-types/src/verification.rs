//! # Verification Results
//!
//! Derived values. Recomputed on every verification call, never persisted.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Signer identity reported when nothing trustworthy could be resolved.
pub const UNKNOWN_SIGNER: &str = "unknown";

/// Policy level an artifact is held to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Inner signer only.
    #[default]
    Basic,
    /// Inner signer plus an outer re-attestation over the inner signature.
    Verified,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Basic => write!(f, "basic"),
            Tier::Verified => write!(f, "verified"),
        }
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(Tier::Basic),
            "verified" => Ok(Tier::Verified),
            other => Err(format!("unknown tier: {}", other)),
        }
    }
}

/// Outcome of a single-signature verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub valid: bool,
    /// RFC 3339.
    pub verified_at: String,
    pub signer: String,
    pub transparency_index: Option<u64>,
    pub certificate_chain: Option<Vec<String>>,
    /// Why trust was not established, when `valid` is false.
    pub reason: Option<String>,
}

/// Outcome of a two-signer chain verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyChainResult {
    pub chain_verified: bool,
    pub inner_signature_valid: bool,
    pub outer_signature_valid: bool,
    pub chain_unbroken: bool,
    /// `chain_verified && chain_unbroken`.
    pub non_repudiation: bool,
    pub tier: Tier,
    pub signer_inner: Option<String>,
    pub signer_outer: Option<String>,
    /// Integration time of the referenced log entry, unix seconds.
    pub sigstore_timestamp: Option<i64>,
    pub transparency_index: Option<u64>,
    pub reason: Option<String>,
}

impl VerifyChainResult {
    /// A negative result for `tier`, with nothing established.
    pub fn rejected(tier: Tier, reason: impl Into<String>) -> Self {
        Self {
            chain_verified: false,
            inner_signature_valid: false,
            outer_signature_valid: false,
            chain_unbroken: false,
            non_repudiation: false,
            tier,
            signer_inner: Some(UNKNOWN_SIGNER.to_string()),
            signer_outer: None,
            sigstore_timestamp: None,
            transparency_index: None,
            reason: Some(reason.into()),
        }
    }
}
