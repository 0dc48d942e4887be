//! # SHA-256 Artifact Hashes
//!
//! Artifact hashes travel as lowercase hex, optionally prefixed with
//! `sha256:`. The prefix is stripped before converting to bytes.

use crate::CryptoError;
use sha2::{Digest, Sha256};
use std::fmt;

/// Prefix accepted (and emitted by [`ArtifactHash::prefixed`]).
pub const SHA256_PREFIX: &str = "sha256:";

/// One-shot SHA-256.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// 32-byte SHA-256 digest of an artifact.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArtifactHash([u8; 32]);

impl ArtifactHash {
    /// Hash artifact content.
    pub fn of(data: &[u8]) -> Self {
        Self(sha256(data))
    }

    /// Wrap an existing digest.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parse `sha256:<hex>` or bare hex (64 characters, any case).
    pub fn from_hex(text: &str) -> Result<Self, CryptoError> {
        let trimmed = text.trim();
        let bare = trimmed.strip_prefix(SHA256_PREFIX).unwrap_or(trimmed);
        if bare.len() != 64 {
            return Err(CryptoError::InvalidHash(format!(
                "expected 64 hex characters, got {}",
                bare.len()
            )));
        }
        let decoded = hex::decode(bare).map_err(|e| CryptoError::InvalidHash(e.to_string()))?;
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&decoded);
        Ok(Self(bytes))
    }

    /// True if `text` parses as a hash (used to tell digests from content).
    pub fn looks_like_hash(text: &str) -> bool {
        Self::from_hex(text).is_ok()
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex, no prefix.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// `sha256:<hex>`
    pub fn prefixed(&self) -> String {
        format!("{}{}", SHA256_PREFIX, self.to_hex())
    }
}

impl fmt::Display for ArtifactHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for ArtifactHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ArtifactHash({})", &self.to_hex()[..16])
    }
}
