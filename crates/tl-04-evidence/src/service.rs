//! # Evidence Generator
//!
//! Turns one `IntegrityDecision` into one persisted `SignedEvidence`.
//!
//! ```text
//! decision ─→ canonical JSON ─→ sha256 ─→ sign (bounded) ─→ [log] ─→ persist
//!                                           │                          │
//!                          timeout/unavailable → offline     error → failed fallback
//!                          other error ──────────────────────────────→ failed fallback
//! ```
//!
//! `process_decision` never fails. A degraded bundle is still a bundle.

use crate::domain::{signing_subject, EvidenceConfig, EvidenceError};
use crate::ports::EvidenceStore;
use chrono::Utc;
use shared_crypto::ArtifactHash;
use shared_types::{
    content_hash, IntegrityDecision, LogSubmission, SignedEvidence, TransparencyLogEntry,
    VerificationStatus, FAILED_CONTENT_HASH,
};
use std::sync::Arc;
use tl_02_signing::{SignatureBundle, SigningBackend, SigningError, SigningInput};
use tl_03_transparency_log::TransparencyLog;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

pub struct EvidenceGenerator {
    signer: Arc<dyn SigningBackend>,
    store: Arc<dyn EvidenceStore>,
    log: Option<Arc<dyn TransparencyLog>>,
    config: EvidenceConfig,
}

impl EvidenceGenerator {
    pub fn new(
        signer: Arc<dyn SigningBackend>,
        store: Arc<dyn EvidenceStore>,
        config: EvidenceConfig,
    ) -> Self {
        Self {
            signer,
            store,
            log: None,
            config,
        }
    }

    /// Also record signed bundles in `log` (best effort).
    pub fn with_transparency_log(mut self, log: Arc<dyn TransparencyLog>) -> Self {
        self.log = Some(log);
        self
    }

    pub fn store(&self) -> &Arc<dyn EvidenceStore> {
        &self.store
    }

    /// Canonicalize, sign, persist. Always returns a bundle.
    pub async fn process_decision(&self, decision: IntegrityDecision) -> SignedEvidence {
        let evidence_id = Uuid::new_v4().to_string();

        let evidence = match self.build(&evidence_id, &decision).await {
            Ok(evidence) => evidence,
            Err(e) => {
                warn!(
                    evidence_id = %evidence_id,
                    decision_id = %decision.decision_id,
                    error = %e,
                    "[tl-04] Evidence signing failed, writing fallback bundle"
                );
                return self.persist_fallback(evidence_id, decision).await;
            }
        };

        match self.persist(evidence.clone()).await {
            Ok(()) => evidence,
            Err(e) => {
                // The log entry, if any, outlives the lost bundle.
                let entry = evidence.transparency_log_entry.as_ref();
                error!(
                    evidence_id = %evidence_id,
                    content_hash = %evidence.content_hash,
                    log_entry_id = entry.map(|e| e.entry_id.as_str()).unwrap_or("none"),
                    log_index = ?entry.map(|e| e.index),
                    error = %e,
                    "[tl-04] Evidence persistence failed, writing fallback bundle"
                );
                self.persist_fallback(evidence_id, decision).await
            }
        }
    }

    /// Steps up to (not including) persistence.
    async fn build(
        &self,
        evidence_id: &str,
        decision: &IntegrityDecision,
    ) -> Result<SignedEvidence, EvidenceError> {
        let hash = content_hash(decision)?;
        let digest = ArtifactHash::from_hex(&hash).map_err(SigningError::from)?;
        let subject = signing_subject(&decision.decision_id);

        let mut evidence = SignedEvidence {
            evidence_id: evidence_id.to_string(),
            timestamp: Utc::now(),
            decision: decision.clone(),
            content_hash: hash,
            signature: None,
            signer_certificate: None,
            transparency_log_entry: None,
            verification_status: VerificationStatus::Unsigned,
        };

        match self.sign(digest, &subject).await {
            Ok(bundle) => {
                evidence.transparency_log_entry = self.record(&evidence, &bundle).await;
                evidence.signature = Some(bundle.signature);
                evidence.signer_certificate = Some(bundle.certificate);
                evidence.verification_status = VerificationStatus::Signed;
            }
            Err(e) if e.is_unavailable() => {
                warn!(
                    evidence_id,
                    backend = self.signer.kind().as_str(),
                    error = %e,
                    "[tl-04] Signing backend unavailable, evidence stored offline"
                );
                evidence.verification_status = VerificationStatus::Offline;
            }
            Err(e) => return Err(e.into()),
        }

        Ok(evidence)
    }

    async fn sign(
        &self,
        digest: ArtifactHash,
        subject: &str,
    ) -> Result<SignatureBundle, SigningError> {
        let input = SigningInput::Digest(digest);
        match tokio::time::timeout(self.config.signing_timeout, self.signer.sign(&input, subject))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(SigningError::Timeout(self.config.signing_timeout)),
        }
    }

    /// Submit a signed bundle to the transparency log. Failures leave the
    /// bundle without a log entry.
    async fn record(
        &self,
        evidence: &SignedEvidence,
        bundle: &SignatureBundle,
    ) -> Option<TransparencyLogEntry> {
        if !self.config.submit_to_log {
            return None;
        }
        let log = self.log.as_ref()?;

        let submission = LogSubmission {
            artifact_hash: evidence.content_hash.clone(),
            signature: bundle.signature.clone(),
            certificate: Some(bundle.certificate.clone()),
            signer: bundle.signer.clone(),
        };
        match log.submit(submission).await {
            Ok(receipt) => {
                let inclusion_proof = log.inclusion_proof(&receipt.entry_id, None).await;
                debug!(
                    evidence_id = %evidence.evidence_id,
                    entry_id = %receipt.entry_id,
                    log_index = receipt.index,
                    "[tl-04] Evidence recorded in transparency log"
                );
                Some(TransparencyLogEntry {
                    entry_id: receipt.entry_id,
                    index: receipt.index,
                    artifact_hash: evidence.content_hash.clone(),
                    signer: bundle.signer.clone(),
                    signature: bundle.signature.clone(),
                    certificate: Some(bundle.certificate.clone()),
                    timestamp: receipt.integrated_time,
                    inclusion_proof,
                })
            }
            Err(e) => {
                warn!(
                    evidence_id = %evidence.evidence_id,
                    log = log.kind(),
                    error = %e,
                    "[tl-04] Transparency log submission failed, bundle kept without entry"
                );
                None
            }
        }
    }

    async fn persist(&self, evidence: SignedEvidence) -> Result<(), EvidenceError> {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || store.save(&evidence))
            .await
            .map_err(|e| EvidenceError::Task(e.to_string()))??;
        Ok(())
    }

    /// Minimal bundle recording that the pipeline failed for `decision`.
    async fn persist_fallback(
        &self,
        evidence_id: String,
        decision: IntegrityDecision,
    ) -> SignedEvidence {
        let fallback = SignedEvidence {
            evidence_id,
            timestamp: Utc::now(),
            decision,
            content_hash: FAILED_CONTENT_HASH.to_string(),
            signature: None,
            signer_certificate: None,
            transparency_log_entry: None,
            verification_status: VerificationStatus::Failed,
        };

        match self.persist(fallback.clone()).await {
            Ok(()) => info!(
                evidence_id = %fallback.evidence_id,
                "[tl-04] Fallback evidence persisted"
            ),
            Err(e) => error!(
                evidence_id = %fallback.evidence_id,
                decision_id = %fallback.decision.decision_id,
                error = %e,
                "[tl-04] Fallback evidence could not be persisted"
            ),
        }
        fallback
    }
}
