//! # Shared Crypto - Signing Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | SHA-256 | Artifact and content hashes |
//! | `keys` | RSA, ECDSA P-256, ECDSA secp256k1 | Key loading, sign/verify dispatch |
//! | `identity` | X.509 subject / SPKI fingerprint | Signer identity |
//! | `encoding` | hex, base64 | Signature wire formats |
//!
//! ## Signing Contract
//!
//! Every signature is made over the 32-byte SHA-256 digest of an artifact,
//! never over the artifact itself. The signature algorithms then hash that
//! digest again with SHA-256 as their message hash.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod encoding;
pub mod errors;
pub mod hashing;
pub mod identity;
pub mod keys;

// Re-exports
pub use encoding::decode_signature;
pub use errors::CryptoError;
pub use hashing::{sha256, ArtifactHash};
pub use identity::{key_fingerprint, signer_identity, MOCK_CERTIFICATE_PREFIX};
pub use keys::{parse_public_key, KeyAlgorithm, ParsedPublicKey, PrivateKeyMaterial, PublicKeyMaterial};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
