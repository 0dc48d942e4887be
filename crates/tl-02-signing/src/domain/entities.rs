//! # Signing Entities

use shared_crypto::ArtifactHash;
use std::fmt;
use std::str::FromStr;

/// What is being signed: artifact bytes, or a digest computed upstream.
///
/// Either way the signature covers the 32-byte SHA-256 digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SigningInput {
    Content(Vec<u8>),
    Digest(ArtifactHash),
}

impl SigningInput {
    /// Interpret wire text: a `sha256:<hex>` or bare 64-hex string is a
    /// digest, anything else is UTF-8 artifact content.
    pub fn from_wire(text: &str) -> Self {
        match ArtifactHash::from_hex(text) {
            Ok(hash) => Self::Digest(hash),
            Err(_) => Self::Content(text.as_bytes().to_vec()),
        }
    }

    pub fn digest(&self) -> ArtifactHash {
        match self {
            Self::Content(bytes) => ArtifactHash::of(bytes),
            Self::Digest(hash) => *hash,
        }
    }
}

impl From<ArtifactHash> for SigningInput {
    fn from(hash: ArtifactHash) -> Self {
        Self::Digest(hash)
    }
}

/// Output of one signing operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureBundle {
    /// Hex signature (or the mock's fixed-format string).
    pub signature: String,
    /// PEM certificate or public key that verifies `signature`.
    pub certificate: String,
    pub artifact_hash: ArtifactHash,
    /// Identity derived from `certificate`.
    pub signer: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    Mock,
    Production,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mock => "mock",
            Self::Production => "production",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mock" => Ok(Self::Mock),
            "production" | "prod" => Ok(Self::Production),
            other => Err(format!("unknown signing backend: {}", other)),
        }
    }
}
