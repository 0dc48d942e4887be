//! Evidence pipeline errors.
//!
//! None of these escape `process_decision`; they decide which degraded
//! status the returned bundle carries and show up in logs.

use shared_types::CanonicalError;
use std::path::PathBuf;
use thiserror::Error;
use tl_02_signing::SigningError;

#[derive(Debug, Error)]
pub enum EvidenceError {
    #[error("Canonicalization failed: {0}")]
    Canonical(#[from] CanonicalError),

    #[error("Signing failed: {0}")]
    Signing(#[from] SigningError),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed evidence file {path}: {message}")]
    Malformed { path: PathBuf, message: String },

    /// Evidence ids become file names; anything but `[A-Za-z0-9_-]` is refused.
    #[error("Invalid evidence id: {0}")]
    InvalidId(String),

    /// Bundles are write-once.
    #[error("Evidence {0} already exists")]
    AlreadyExists(String),

    #[error("Storage task failed: {0}")]
    Task(String),
}

impl EvidenceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
