//! # Artifact Signing Service
//!
//! Sign-and-log: one signature from the configured backend, one entry in
//! the transparency log. A log failure fails the whole operation; a
//! signature nobody can look up is not handed out.

use crate::domain::{countersignature_digest, SignRequest, VerificationError};
use shared_crypto::ArtifactHash;
use shared_types::{ArtifactSignRequest, ArtifactSignResponse, LogSubmission, TransparencyLogEntry};
use std::sync::Arc;
use std::time::Duration;
use tl_02_signing::{SigningBackend, SigningError, SigningInput};
use tl_03_transparency_log::TransparencyLog;
use tracing::{debug, info, warn};

/// `artifact_type` recorded for countersignatures.
pub const COUNTERSIGNATURE_TYPE: &str = "countersignature";

const DEFAULT_SIGNING_TIMEOUT: Duration = Duration::from_secs(5);

pub struct ArtifactSigningService {
    signer: Arc<dyn SigningBackend>,
    log: Arc<dyn TransparencyLog>,
    signing_timeout: Duration,
}

impl ArtifactSigningService {
    pub fn new(signer: Arc<dyn SigningBackend>, log: Arc<dyn TransparencyLog>) -> Self {
        Self {
            signer,
            log,
            signing_timeout: DEFAULT_SIGNING_TIMEOUT,
        }
    }

    pub fn with_signing_timeout(mut self, timeout: Duration) -> Self {
        self.signing_timeout = timeout;
        self
    }

    /// Hash the wire artifact and sign it.
    pub async fn sign(&self, request: SignRequest) -> Result<ArtifactSignResponse, VerificationError> {
        let artifact_hash = SigningInput::from_wire(&request.artifact).digest();
        self.sign_artifact(&ArtifactSignRequest {
            artifact_hash: artifact_hash.to_hex(),
            artifact_type: request.artifact_type,
            subject: request.subject,
            predicates: request.predicates,
        })
        .await
    }

    pub async fn sign_artifact(
        &self,
        request: &ArtifactSignRequest,
    ) -> Result<ArtifactSignResponse, VerificationError> {
        let digest = ArtifactHash::from_hex(&request.artifact_hash)
            .map_err(|e| VerificationError::InvalidRequest(e.to_string()))?;
        if request.subject.trim().is_empty() {
            return Err(VerificationError::InvalidRequest("subject is empty".into()));
        }

        let input = SigningInput::Digest(digest);
        let bundle = tokio::time::timeout(self.signing_timeout, self.signer.sign(&input, &request.subject))
            .await
            .map_err(|_| SigningError::Timeout(self.signing_timeout))??;

        let submission = LogSubmission {
            artifact_hash: digest.to_hex(),
            signature: bundle.signature.clone(),
            certificate: Some(bundle.certificate.clone()),
            signer: bundle.signer.clone(),
        };
        let receipt = self.log.submit(submission).await.map_err(|e| {
            warn!(
                artifact_hash = %digest.to_hex(),
                log = self.log.kind(),
                error = %e,
                "[tl-05] Transparency log submission failed, signing aborted"
            );
            e
        })?;

        // Prefer the log's own view of the entry (it carries the proof).
        let transparency_entry = match self.log.get(&receipt.entry_id).await {
            Some(entry) => entry,
            None => {
                debug!(entry_id = %receipt.entry_id, "[tl-05] Entry not yet readable, using receipt");
                TransparencyLogEntry {
                    entry_id: receipt.entry_id.clone(),
                    index: receipt.index,
                    artifact_hash: digest.to_hex(),
                    signer: bundle.signer.clone(),
                    signature: bundle.signature.clone(),
                    certificate: Some(bundle.certificate.clone()),
                    timestamp: receipt.integrated_time,
                    inclusion_proof: None,
                }
            }
        };

        info!(
            entry_id = %receipt.entry_id,
            log_index = receipt.index,
            artifact_type = %request.artifact_type,
            signer = %bundle.signer,
            backend = self.signer.kind().as_str(),
            "[tl-05] Artifact signed and logged"
        );

        Ok(ArtifactSignResponse {
            entry_id: receipt.entry_id,
            signature: bundle.signature,
            certificate: Some(bundle.certificate),
            transparency_entry,
        })
    }

    /// Outer signature over the SHA-256 of `inner_signature`, logged like
    /// any other artifact.
    pub async fn countersign(
        &self,
        inner_signature: &str,
        subject: &str,
    ) -> Result<ArtifactSignResponse, VerificationError> {
        if inner_signature.trim().is_empty() {
            return Err(VerificationError::InvalidRequest("inner signature is empty".into()));
        }
        self.sign_artifact(&ArtifactSignRequest {
            artifact_hash: countersignature_digest(inner_signature).to_hex(),
            artifact_type: COUNTERSIGNATURE_TYPE.to_string(),
            subject: subject.to_string(),
            predicates: Default::default(),
        })
        .await
    }
}
