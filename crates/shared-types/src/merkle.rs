//! # Merkle Tree Hashing (RFC 6962)
//!
//! Leaves are hashed as `SHA-256(0x00 || data)`, interior nodes as
//! `SHA-256(0x01 || left || right)`. The domain separation stops a leaf
//! from being passed off as an interior node.
//!
//! A tree of `n` leaves splits at the largest power of two below `n`, so
//! trees of any size are supported without padding.

use sha2::{Digest, Sha256};

pub type Hash32 = [u8; 32];

fn sha256(bytes: &[u8]) -> Hash32 {
    Sha256::digest(bytes).into()
}

pub fn leaf_hash(data: &[u8]) -> Hash32 {
    let mut buf = Vec::with_capacity(1 + data.len());
    buf.push(0u8);
    buf.extend_from_slice(data);
    sha256(&buf)
}

pub fn node_hash(left: &Hash32, right: &Hash32) -> Hash32 {
    let mut buf = [0u8; 65];
    buf[0] = 1;
    buf[1..33].copy_from_slice(left);
    buf[33..65].copy_from_slice(right);
    sha256(&buf)
}

fn split_point(n: usize) -> usize {
    debug_assert!(n > 1);
    1usize << (usize::BITS - 1 - (n - 1).leading_zeros())
}

/// Root over already-hashed leaves. The empty tree hashes the empty string.
pub fn merkle_root(leaves: &[Hash32]) -> Hash32 {
    match leaves.len() {
        0 => sha256(b""),
        1 => leaves[0],
        n => {
            let k = split_point(n);
            node_hash(&merkle_root(&leaves[..k]), &merkle_root(&leaves[k..]))
        }
    }
}

/// Sibling path for `leaf_index`, leaf level first.
///
/// Returns `None` when `leaf_index` is outside the tree.
pub fn inclusion_path(leaves: &[Hash32], leaf_index: usize) -> Option<Vec<Hash32>> {
    if leaf_index >= leaves.len() {
        return None;
    }
    Some(path_inner(leaves, leaf_index))
}

fn path_inner(leaves: &[Hash32], leaf_index: usize) -> Vec<Hash32> {
    if leaves.len() <= 1 {
        return Vec::new();
    }
    let k = split_point(leaves.len());
    if leaf_index < k {
        let mut path = path_inner(&leaves[..k], leaf_index);
        path.push(merkle_root(&leaves[k..]));
        path
    } else {
        let mut path = path_inner(&leaves[k..], leaf_index - k);
        path.push(merkle_root(&leaves[..k]));
        path
    }
}

/// Recompute the root from a leaf and its path and compare.
///
/// Walks up from the leaf: an odd index has its sibling on the left, an
/// even index below the right edge has it on the right, and the right edge
/// itself is promoted without hashing.
pub fn verify_inclusion(
    leaf: &Hash32,
    leaf_index: u64,
    tree_size: u64,
    path: &[Hash32],
    root: &Hash32,
) -> bool {
    if tree_size == 0 || leaf_index >= tree_size {
        return false;
    }

    let mut fn_idx = leaf_index;
    let mut sn_idx = tree_size - 1;
    let mut used = 0usize;
    let mut hash = *leaf;

    while sn_idx > 0 {
        if fn_idx % 2 == 1 {
            let Some(sibling) = path.get(used) else {
                return false;
            };
            hash = node_hash(sibling, &hash);
            used += 1;
        } else if fn_idx < sn_idx {
            let Some(sibling) = path.get(used) else {
                return false;
            };
            hash = node_hash(&hash, sibling);
            used += 1;
        }
        fn_idx /= 2;
        sn_idx /= 2;
    }

    used == path.len() && &hash == root
}

/// Decode a 64-char hex hash.
pub fn hash_from_hex(text: &str) -> Option<Hash32> {
    let bytes = hex::decode(text.trim()).ok()?;
    bytes.try_into().ok()
}
