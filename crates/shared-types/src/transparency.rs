//! # Transparency-Log Records
//!
//! Append-only entries and their Merkle inclusion proofs. Hashes are
//! carried as lowercase hex on the wire.

use crate::merkle::{hash_from_hex, verify_inclusion, Hash32};
use serde::{Deserialize, Serialize};

/// Merkle inclusion proof for one leaf of a log of `tree_size` leaves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InclusionProof {
    pub tree_size: u64,
    pub leaf_index: u64,
    /// Sibling hashes from the leaf upwards.
    pub hashes: Vec<String>,
    pub root_hash: String,
}

impl InclusionProof {
    /// True if `leaf` at `leaf_index` recomputes `root_hash` through `hashes`.
    ///
    /// Malformed hex anywhere in the proof makes it invalid.
    pub fn verify(&self, leaf: &Hash32) -> bool {
        let Some(root) = hash_from_hex(&self.root_hash) else {
            return false;
        };
        let path: Option<Vec<Hash32>> = self.hashes.iter().map(|h| hash_from_hex(h)).collect();
        match path {
            Some(path) => verify_inclusion(leaf, self.leaf_index, self.tree_size, &path, &root),
            None => false,
        }
    }
}

/// One entry of the transparency log.
///
/// `index` is assigned by the log at submission and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransparencyLogEntry {
    pub entry_id: String,
    pub index: u64,
    pub artifact_hash: String,
    pub signer: String,
    pub signature: String,
    /// Certificate or public key (PEM) the signature verifies under.
    pub certificate: Option<String>,
    /// Integration time, unix seconds.
    pub timestamp: i64,
    pub inclusion_proof: Option<InclusionProof>,
}

/// What the log returns on submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogReceipt {
    pub entry_id: String,
    pub index: u64,
    pub integrated_time: i64,
}

/// A signed artifact hash handed to the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSubmission {
    /// Bare lowercase hex (no `sha256:` prefix).
    pub artifact_hash: String,
    pub signature: String,
    pub certificate: Option<String>,
    /// Identity derived from the certificate or key.
    pub signer: String,
}
