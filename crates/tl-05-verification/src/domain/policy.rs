//! # Tier Policy
//!
//! | Tier | `chain_verified` requires |
//! |------|---------------------------|
//! | basic | inner signature valid |
//! | verified | inner valid and logged under its key, outer valid, chain unbroken |
//!
//! `non_repudiation` additionally needs the inner signature to be in the
//! transparency log under the key that made it, whatever the tier.
//!
//! The chain is unbroken when the outer signature is made over the SHA-256
//! of the inner signature text, so an outer signature cannot be moved onto
//! a different inner one.

use shared_crypto::ArtifactHash;
use shared_types::Tier;

/// Digest an outer signature must cover: SHA-256 of the trimmed inner
/// signature text.
pub fn countersignature_digest(inner_signature: &str) -> ArtifactHash {
    ArtifactHash::of(inner_signature.trim().as_bytes())
}

/// Results of the individual chain checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChainChecks {
    pub inner_valid: bool,
    /// A log entry for the artifact was recorded under the inner signer's key.
    pub inner_logged: bool,
    pub outer_present: bool,
    pub outer_valid: bool,
    /// Outer signature covers this inner signature (and any declared
    /// `covers` hash matches).
    pub outer_covers_inner: bool,
}

impl ChainChecks {
    pub fn chain_unbroken(&self) -> bool {
        self.inner_valid && self.outer_valid && self.outer_covers_inner
    }
}

/// Outcome of applying a tier to a set of checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierDecision {
    pub chain_verified: bool,
    pub chain_unbroken: bool,
    pub non_repudiation: bool,
    pub reason: Option<String>,
}

pub fn apply_tier(tier: Tier, checks: &ChainChecks) -> TierDecision {
    let chain_unbroken = checks.chain_unbroken();

    let failure = if !checks.inner_valid {
        Some("inner signature invalid")
    } else {
        match tier {
            Tier::Basic => None,
            Tier::Verified if !checks.inner_logged => Some("inner signature not in transparency log under its key"),
            Tier::Verified if !checks.outer_present => Some("outer signature required for verified tier"),
            Tier::Verified if !checks.outer_valid => Some("outer signature invalid"),
            Tier::Verified if !chain_unbroken => Some("outer signature does not cover inner signature"),
            Tier::Verified => None,
        }
    };

    let chain_verified = failure.is_none();
    TierDecision {
        chain_verified,
        chain_unbroken,
        non_repudiation: chain_verified && chain_unbroken && checks.inner_logged,
        reason: failure.map(str::to_string),
    }
}
