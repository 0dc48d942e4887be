//! Deterministic signer for tests and local development. No cryptography.

use crate::domain::{BackendKind, SignatureBundle, SigningError, SigningInput};
use crate::ports::SigningBackend;
use async_trait::async_trait;
use shared_crypto::{sha256, ArtifactHash, MOCK_CERTIFICATE_PREFIX};

const MOCK_SIGNATURE_PREFIX: &str = "mock-sig-";

#[derive(Debug, Default, Clone, Copy)]
pub struct MockSigningBackend;

impl MockSigningBackend {
    pub fn new() -> Self {
        Self
    }

    /// `mock-sig-<first 32 hex of sha256(hash_hex || subject)>`
    pub fn signature_for(hash: &ArtifactHash, subject: &str) -> String {
        let mut material = hash.to_hex().into_bytes();
        material.extend_from_slice(subject.as_bytes());
        let digest = hex::encode(sha256(&material));
        format!("{}{}", MOCK_SIGNATURE_PREFIX, &digest[..32])
    }

    pub fn certificate_for(subject: &str) -> String {
        format!("{}{}", MOCK_CERTIFICATE_PREFIX, subject)
    }
}

#[async_trait]
impl SigningBackend for MockSigningBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Mock
    }

    async fn sign(
        &self,
        input: &SigningInput,
        subject: &str,
    ) -> Result<SignatureBundle, SigningError> {
        let artifact_hash = input.digest();
        Ok(SignatureBundle {
            signature: Self::signature_for(&artifact_hash, subject),
            certificate: Self::certificate_for(subject),
            artifact_hash,
            signer: subject.to_string(),
        })
    }

    async fn verify(
        &self,
        input: &SigningInput,
        signature: &str,
        certificate: &str,
    ) -> Result<bool, SigningError> {
        let subject = certificate
            .trim()
            .strip_prefix(MOCK_CERTIFICATE_PREFIX)
            .ok_or(SigningError::ForeignCertificate { backend: "mock" })?;
        Ok(signature.trim() == Self::signature_for(&input.digest(), subject))
    }
}
