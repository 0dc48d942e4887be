//! One JSON file per bundle, `dec_<evidence_id>.json`, under a storage root.
//!
//! Each file is self-describing; there is no index. Writes go to a private
//! temp file that is synced and then hard-linked to the final name, so a
//! reader never sees a half-written bundle and the first writer of an id
//! wins. The temp file is removed whether or not publishing succeeded.

use crate::domain::EvidenceError;
use crate::ports::EvidenceStore;
use shared_types::{evidence_file_name, SignedEvidence};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

const FILE_PREFIX: &str = "dec_";
const FILE_SUFFIX: &str = ".json";

#[derive(Debug, Clone)]
pub struct FileEvidenceStore {
    root: PathBuf,
}

impl FileEvidenceStore {
    /// The root directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, evidence_id: &str) -> Result<PathBuf, EvidenceError> {
        let valid = !evidence_id.is_empty()
            && evidence_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(EvidenceError::InvalidId(evidence_id.to_string()));
        }
        Ok(self.root.join(evidence_file_name(evidence_id)))
    }
}

impl EvidenceStore for FileEvidenceStore {
    fn save(&self, evidence: &SignedEvidence) -> Result<PathBuf, EvidenceError> {
        let path = self.path_for(&evidence.evidence_id)?;

        fs::create_dir_all(&self.root).map_err(|e| EvidenceError::io(&self.root, e))?;

        let bytes = serde_json::to_vec_pretty(evidence).map_err(|e| EvidenceError::Malformed {
            path: path.clone(),
            message: e.to_string(),
        })?;

        let temp_path = self.root.join(format!(
            "{}.{}.tmp",
            evidence_file_name(&evidence.evidence_id),
            Uuid::new_v4().simple()
        ));
        let published = write_synced(&temp_path, &bytes).and_then(|()| {
            match fs::hard_link(&temp_path, &path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    Err(EvidenceError::AlreadyExists(evidence.evidence_id.clone()))
                }
                Err(e) => Err(EvidenceError::io(&path, e)),
            }
        });
        if let Err(e) = fs::remove_file(&temp_path) {
            if e.kind() != ErrorKind::NotFound {
                warn!(path = %temp_path.display(), error = %e, "[tl-04] Could not remove temp file");
            }
        }
        published?;

        info!(
            evidence_id = %evidence.evidence_id,
            status = evidence.verification_status.as_str(),
            path = %path.display(),
            "[tl-04] Evidence persisted"
        );
        Ok(path)
    }

    fn load(&self, evidence_id: &str) -> Result<Option<SignedEvidence>, EvidenceError> {
        let path = self.path_for(evidence_id)?;
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(EvidenceError::io(&path, e)),
        };
        let evidence = serde_json::from_slice(&bytes).map_err(|e| EvidenceError::Malformed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        Ok(Some(evidence))
    }

    fn list_ids(&self) -> Result<Vec<String>, EvidenceError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(EvidenceError::io(&self.root, e)),
        };

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| EvidenceError::io(&self.root, e))?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if let Some(id) = name
                .strip_prefix(FILE_PREFIX)
                .and_then(|rest| rest.strip_suffix(FILE_SUFFIX))
            {
                ids.push(id.to_string());
            }
        }
        ids.sort();
        debug!(count = ids.len(), "[tl-04] Listed evidence bundles");
        Ok(ids)
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> Result<(), EvidenceError> {
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| EvidenceError::io(path, e))?;
    file.write_all(bytes).map_err(|e| EvidenceError::io(path, e))?;
    file.sync_all().map_err(|e| EvidenceError::io(path, e))
}
