use crate::domain::EvidenceError;
use shared_types::SignedEvidence;
use std::path::PathBuf;

/// Durable, write-once storage for evidence bundles, keyed by evidence id.
///
/// Blocking; the generator calls it from a blocking task.
pub trait EvidenceStore: Send + Sync {
    /// Persist a bundle. Fails with `AlreadyExists` rather than overwrite.
    fn save(&self, evidence: &SignedEvidence) -> Result<PathBuf, EvidenceError>;

    fn load(&self, evidence_id: &str) -> Result<Option<SignedEvidence>, EvidenceError>;

    /// All stored evidence ids, sorted.
    fn list_ids(&self) -> Result<Vec<String>, EvidenceError>;
}
