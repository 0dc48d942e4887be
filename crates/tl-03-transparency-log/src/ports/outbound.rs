//! # Transparency Log Port

use crate::domain::LogError;
use async_trait::async_trait;
use shared_types::{InclusionProof, LogReceipt, LogSubmission, TransparencyLogEntry};

/// Append-only log of signed artifact hashes.
///
/// Indices are assigned by the log, strictly increase, and never change.
/// Only `submit` reports errors; reads degrade to "not found".
#[async_trait]
pub trait TransparencyLog: Send + Sync {
    /// `"memory"` or `"rekor"`, for logs and health output.
    fn kind(&self) -> &'static str;

    async fn submit(&self, submission: LogSubmission) -> Result<LogReceipt, LogError>;

    async fn get(&self, entry_id: &str) -> Option<TransparencyLogEntry>;

    /// Entries for `artifact_hash` (bare or `sha256:`-prefixed hex), oldest first.
    async fn search_by_hash(&self, artifact_hash: &str) -> Vec<TransparencyLogEntry>;

    /// Proof for `entry_id` against the tree of `tree_size` entries, or the
    /// current tree when `tree_size` is `None`.
    async fn inclusion_proof(
        &self,
        entry_id: &str,
        tree_size: Option<u64>,
    ) -> Option<InclusionProof>;
}

/// Normalize a hash for lookups: strip `sha256:`, lowercase.
pub fn normalize_hash(artifact_hash: &str) -> String {
    let trimmed = artifact_hash.trim();
    trimmed
        .strip_prefix("sha256:")
        .unwrap_or(trimmed)
        .to_ascii_lowercase()
}
