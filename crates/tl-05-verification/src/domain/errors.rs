use thiserror::Error;
use tl_02_signing::SigningError;
use tl_03_transparency_log::LogError;

#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// No location yielded readable artifact bytes.
    #[error("Artifact unavailable at any of {0} location(s)")]
    ArtifactUnavailable(usize),

    /// No certificate supplied and none recorded in the log.
    #[error("No certificate available for signature")]
    MissingCertificate,

    #[error("Transparency log entry {0} not found")]
    EntryNotFound(String),

    /// Referenced log entry is for a different artifact.
    #[error("Transparency log entry {entry_id} does not match artifact {artifact_hash}")]
    EntryMismatch {
        entry_id: String,
        artifact_hash: String,
    },

    #[error(transparent)]
    Signing(#[from] SigningError),

    #[error(transparent)]
    Log(#[from] LogError),
}
