//! Append-only Merkle leaf list with proofs at any historical size.

use shared_types::merkle::{inclusion_path, merkle_root, Hash32};
use shared_types::InclusionProof;

#[derive(Debug, Clone, Default)]
pub struct MerkleLog {
    leaves: Vec<Hash32>,
}

impl MerkleLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a leaf hash and return its index.
    pub fn append(&mut self, leaf: Hash32) -> u64 {
        self.leaves.push(leaf);
        (self.leaves.len() - 1) as u64
    }

    pub fn size(&self) -> u64 {
        self.leaves.len() as u64
    }

    /// Root of the first `tree_size` leaves.
    pub fn root_at(&self, tree_size: u64) -> Option<Hash32> {
        let size = usize::try_from(tree_size).ok()?;
        if size == 0 || size > self.leaves.len() {
            return None;
        }
        Some(merkle_root(&self.leaves[..size]))
    }

    /// Proof for `leaf_index` in the tree of the first `tree_size` leaves.
    ///
    /// `None` unless `leaf_index < tree_size <= size()`.
    pub fn proof(&self, leaf_index: u64, tree_size: u64) -> Option<InclusionProof> {
        let size = usize::try_from(tree_size).ok()?;
        let index = usize::try_from(leaf_index).ok()?;
        if size > self.leaves.len() || index >= size {
            return None;
        }
        let prefix = &self.leaves[..size];
        let path = inclusion_path(prefix, index)?;
        Some(InclusionProof {
            tree_size,
            leaf_index,
            hashes: path.iter().map(hex::encode).collect(),
            root_hash: hex::encode(merkle_root(prefix)),
        })
    }

    pub fn leaf(&self, index: u64) -> Option<Hash32> {
        self.leaves.get(usize::try_from(index).ok()?).copied()
    }
}
