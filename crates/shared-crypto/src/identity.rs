//! Signer identity derivation.
//!
//! A certificate names its signer through its subject. A bare public key has no
//! name, so it is identified by a fingerprint of its SPKI encoding.

use crate::keys::{parse_public_key, PublicKeyMaterial};
use crate::{hashing::sha256, CryptoError};

/// Prefix of the synthetic certificates issued by the mock signer.
pub const MOCK_CERTIFICATE_PREFIX: &str = "mock-certificate:";

/// `key:sha256:<16 hex>` fingerprint of a public key.
pub fn key_fingerprint(key: &PublicKeyMaterial) -> Result<String, CryptoError> {
    let der = key.to_spki_der()?;
    let digest = hex::encode(sha256(&der));
    Ok(format!("key:sha256:{}", &digest[..16]))
}

/// Identity named by certificate or key text.
pub fn signer_identity(certificate: &str) -> Result<String, CryptoError> {
    if let Some(subject) = certificate.trim().strip_prefix(MOCK_CERTIFICATE_PREFIX) {
        return Ok(subject.to_string());
    }
    let parsed = parse_public_key(certificate)?;
    match parsed.certificate_subject {
        Some(subject) if !subject.is_empty() => Ok(subject),
        _ => key_fingerprint(&parsed.key),
    }
}
