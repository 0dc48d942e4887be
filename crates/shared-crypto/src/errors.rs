//! Cryptographic error types.

use thiserror::Error;

/// Errors from hashing, key handling and signing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CryptoError {
    /// Artifact hash is not 64 hex characters.
    #[error("Invalid artifact hash: {0}")]
    InvalidHash(String),

    /// Public key or certificate could not be decoded.
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    /// Private key could not be decoded.
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// Encrypted private key without a password.
    #[error("Private key is encrypted and no password was configured")]
    PasswordRequired,

    /// Signature text could not be decoded.
    #[error("Invalid signature encoding: {0}")]
    InvalidSignature(String),

    /// Key algorithm or curve this crate does not sign or verify with.
    #[error("Unsupported key type: {0}")]
    UnsupportedKeyType(String),

    /// The signing primitive itself failed.
    #[error("Signing failed: {0}")]
    SigningFailed(String),
}
