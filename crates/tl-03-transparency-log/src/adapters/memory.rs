//! In-memory transparency log.
//!
//! Lives for the process duration; nothing survives a restart. All state
//! sits behind one `RwLock`, so index assignment and the Merkle append
//! happen together and indices stay gap-free under concurrent submits.

use crate::domain::{leaf_data, LogError, MerkleLog};
use crate::ports::{normalize_hash, TransparencyLog};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_crypto::ArtifactHash;
use shared_types::merkle::leaf_hash;
use shared_types::{InclusionProof, LogReceipt, LogSubmission, TransparencyLogEntry};
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Default)]
struct LogState {
    entries: Vec<TransparencyLogEntry>,
    by_id: HashMap<String, u64>,
    by_hash: HashMap<String, Vec<u64>>,
    tree: MerkleLog,
}

#[derive(Default)]
pub struct InMemoryTransparencyLog {
    state: RwLock<LogState>,
}

impl InMemoryTransparencyLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> u64 {
        self.state.read().tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current root hash, hex.
    pub fn root_hash(&self) -> Option<String> {
        let state = self.state.read();
        state.tree.root_at(state.tree.size()).map(hex::encode)
    }

    fn with_proof(state: &LogState, index: u64) -> Option<TransparencyLogEntry> {
        let mut entry = state.entries.get(usize::try_from(index).ok()?)?.clone();
        entry.inclusion_proof = state.tree.proof(index, state.tree.size());
        Some(entry)
    }
}

#[async_trait]
impl TransparencyLog for InMemoryTransparencyLog {
    fn kind(&self) -> &'static str {
        "memory"
    }

    async fn submit(&self, submission: LogSubmission) -> Result<LogReceipt, LogError> {
        let artifact_hash = ArtifactHash::from_hex(&submission.artifact_hash)
            .map_err(|e| LogError::InvalidSubmission(e.to_string()))?
            .to_hex();
        if submission.signature.trim().is_empty() {
            return Err(LogError::InvalidSubmission("empty signature".into()));
        }

        let data = leaf_data(
            &artifact_hash,
            &submission.signature,
            submission.certificate.as_deref(),
            &submission.signer,
        )
        .map_err(|e| LogError::InvalidSubmission(e.to_string()))?;

        let entry_id = Uuid::new_v4().to_string();
        let integrated_time = chrono::Utc::now().timestamp();

        let index = {
            let mut state = self.state.write();
            let index = state.tree.append(leaf_hash(&data));
            state.entries.push(TransparencyLogEntry {
                entry_id: entry_id.clone(),
                index,
                artifact_hash: artifact_hash.clone(),
                signer: submission.signer.clone(),
                signature: submission.signature,
                certificate: submission.certificate,
                timestamp: integrated_time,
                inclusion_proof: None,
            });
            state.by_id.insert(entry_id.clone(), index);
            state
                .by_hash
                .entry(artifact_hash.clone())
                .or_default()
                .push(index);
            index
        };

        info!(
            entry_id = %entry_id,
            log_index = index,
            artifact_hash = %artifact_hash,
            signer = %submission.signer,
            "[tl-03] Entry appended to in-memory log"
        );

        Ok(LogReceipt {
            entry_id,
            index,
            integrated_time,
        })
    }

    async fn get(&self, entry_id: &str) -> Option<TransparencyLogEntry> {
        let state = self.state.read();
        let index = *state.by_id.get(entry_id)?;
        Self::with_proof(&state, index)
    }

    async fn search_by_hash(&self, artifact_hash: &str) -> Vec<TransparencyLogEntry> {
        let key = normalize_hash(artifact_hash);
        let state = self.state.read();
        let entries: Vec<_> = state
            .by_hash
            .get(&key)
            .map(|indices| {
                indices
                    .iter()
                    .filter_map(|&i| Self::with_proof(&state, i))
                    .collect()
            })
            .unwrap_or_default();
        debug!(artifact_hash = %key, matches = entries.len(), "[tl-03] Hash search");
        entries
    }

    async fn inclusion_proof(
        &self,
        entry_id: &str,
        tree_size: Option<u64>,
    ) -> Option<InclusionProof> {
        let state = self.state.read();
        let index = *state.by_id.get(entry_id)?;
        let size = tree_size.unwrap_or_else(|| state.tree.size());
        state.tree.proof(index, size)
    }
}
