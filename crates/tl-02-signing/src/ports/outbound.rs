//! # Signing Backend Port
//!
//! Consumed by the evidence pipeline and the verification service.

use crate::domain::{BackendKind, SignatureBundle, SigningError, SigningInput};
use async_trait::async_trait;

/// Signs artifact digests and checks signatures.
///
/// ## Contract
///
/// - `sign` fails on configuration problems (missing or unsupported key)
///   and on transport problems (`SigningError::is_unavailable`).
/// - `verify` returns `Ok(false)` for any cryptographic mismatch,
///   including an undecodable signature. It returns `Err` only when the
///   certificate cannot be used at all (unparseable, unsupported type, or
///   issued by the other backend variant).
#[async_trait]
pub trait SigningBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    async fn sign(
        &self,
        input: &SigningInput,
        subject: &str,
    ) -> Result<SignatureBundle, SigningError>;

    async fn verify(
        &self,
        input: &SigningInput,
        signature: &str,
        certificate: &str,
    ) -> Result<bool, SigningError>;

    /// Signer identity named by `certificate`.
    fn signer_identity(&self, certificate: &str) -> Result<String, SigningError> {
        shared_crypto::signer_identity(certificate).map_err(SigningError::from)
    }
}
