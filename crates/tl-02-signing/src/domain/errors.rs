//! # Signing Errors

use shared_crypto::CryptoError;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SigningError {
    /// Backend could not be reached.
    #[error("Signing backend unavailable: {0}")]
    Unavailable(String),

    /// Backend did not answer in time.
    #[error("Signing timed out after {0:?}")]
    Timeout(Duration),

    /// Key-based signing without a usable key file.
    #[error("Signing key missing: {0}")]
    MissingKey(String),

    /// Key or certificate of a type no backend handles.
    #[error("Unsupported key type: {0}")]
    UnsupportedKeyType(String),

    /// Configured certificate does not belong to the configured key.
    #[error("Certificate public key does not match signing key")]
    CertificateMismatch,

    /// Certificate text belongs to the other backend variant.
    #[error("Certificate not issued by the {backend} backend")]
    ForeignCertificate { backend: &'static str },

    /// Key, certificate or signature could not be decoded.
    #[error(transparent)]
    Crypto(CryptoError),
}

impl SigningError {
    /// Errors that degrade evidence to `offline` rather than `failed`.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Timeout(_))
    }
}

impl From<CryptoError> for SigningError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::UnsupportedKeyType(msg) => Self::UnsupportedKeyType(msg),
            other => Self::Crypto(other),
        }
    }
}
