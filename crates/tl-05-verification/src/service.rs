//! # Verification Service
//!
//! Re-checks signatures cryptographically and cross-checks them against the
//! transparency log. Both entry points return a result value for every
//! input; internal errors become a negative result with signer `unknown`.

use crate::domain::{
    apply_tier, countersignature_digest, ChainChecks, VerificationError, VerifyChainRequest,
    VerifyRequest,
};
use crate::ports::ArtifactResolver;
use chrono::Utc;
use shared_crypto::{parse_public_key, ArtifactHash};
use shared_types::{
    Tier, TransparencyLogEntry, VerifyChainResult, VerifyResponse, UNKNOWN_SIGNER,
};
use std::sync::Arc;
use tl_02_signing::{SigningBackend, SigningInput};
use tl_03_transparency_log::TransparencyLog;
use tracing::{debug, info, warn};

pub struct VerificationService {
    signer: Arc<dyn SigningBackend>,
    log: Arc<dyn TransparencyLog>,
    resolver: Arc<dyn ArtifactResolver>,
}

/// One signature checked against its certificate.
struct CheckedSignature {
    valid: bool,
    signer: String,
}

/// A checked signature plus the log entry recorded for its key, if any.
struct Attributed {
    certificate: String,
    checked: CheckedSignature,
    entry: Option<TransparencyLogEntry>,
}

impl VerificationService {
    pub fn new(
        signer: Arc<dyn SigningBackend>,
        log: Arc<dyn TransparencyLog>,
        resolver: Arc<dyn ArtifactResolver>,
    ) -> Self {
        Self {
            signer,
            log,
            resolver,
        }
    }

    /// Single-signer check: signature valid, artifact logged, signer
    /// matches `identity` when one is pinned.
    pub async fn verify(&self, request: &VerifyRequest) -> VerifyChainResult {
        self.verify_with_certificate(request).await.0
    }

    /// [`verify`](Self::verify) in the HTTP response shape.
    pub async fn verify_response(&self, request: &VerifyRequest) -> VerifyResponse {
        let (result, certificate) = self.verify_with_certificate(request).await;
        VerifyResponse {
            valid: result.chain_verified,
            verified_at: Utc::now().to_rfc3339(),
            signer: result
                .signer_inner
                .unwrap_or_else(|| UNKNOWN_SIGNER.to_string()),
            transparency_index: result.transparency_index,
            certificate_chain: certificate.map(|c| vec![c]),
            reason: result.reason,
        }
    }

    async fn verify_with_certificate(
        &self,
        request: &VerifyRequest,
    ) -> (VerifyChainResult, Option<String>) {
        match self.try_verify(request).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "[tl-05] Verification failed");
                (VerifyChainResult::rejected(Tier::Basic, e.to_string()), None)
            }
        }
    }

    async fn try_verify(
        &self,
        request: &VerifyRequest,
    ) -> Result<(VerifyChainResult, Option<String>), VerificationError> {
        let input = SigningInput::from_wire(&request.artifact);
        let digest = input.digest();
        let entries = self.log.search_by_hash(&digest.to_hex()).await;

        // (1) cryptographic check, bound to the log entry for that key
        let attributed = self
            .attribute(
                &input,
                &request.signature,
                request.certificate.as_deref(),
                &entries,
            )
            .await?;
        let Attributed {
            certificate,
            checked,
            entry,
        } = attributed;
        if !checked.valid {
            return Ok((
                negative(Tier::Basic, false, checked.signer, None, "signature invalid"),
                Some(certificate),
            ));
        }

        // (2) logged under this signer's key?
        let Some(entry) = entry else {
            let reason = if entries.is_empty() {
                "no transparency log entry for artifact"
            } else {
                "no transparency log entry for this signer's key"
            };
            return Ok((
                negative(Tier::Basic, true, checked.signer, None, reason),
                Some(certificate),
            ));
        };

        // (3) (4) signer named by the matched certificate, against the pinned identity
        if let Some(identity) = &request.identity {
            if identity != &checked.signer {
                debug!(expected = %identity, actual = %checked.signer, "[tl-05] Signer identity mismatch");
                return Ok((
                    negative(
                        Tier::Basic,
                        true,
                        checked.signer,
                        Some(&entry),
                        "signer identity does not match",
                    ),
                    Some(certificate),
                ));
            }
        }

        info!(
            artifact_hash = %digest.to_hex(),
            signer = %checked.signer,
            log_index = entry.index,
            "[tl-05] Signature verified"
        );
        Ok((
            VerifyChainResult {
                chain_verified: true,
                inner_signature_valid: true,
                outer_signature_valid: false,
                // A single logged signature is a chain of one.
                chain_unbroken: true,
                non_repudiation: true,
                tier: Tier::Basic,
                signer_inner: Some(checked.signer),
                signer_outer: None,
                sigstore_timestamp: Some(entry.timestamp),
                transparency_index: Some(entry.index),
                reason: None,
            },
            Some(certificate),
        ))
    }

    /// Two-signer check under `request.tier`.
    pub async fn verify_chain(&self, request: &VerifyChainRequest) -> VerifyChainResult {
        match self.try_verify_chain(request).await {
            Ok(result) => {
                if result.chain_verified {
                    info!(
                        tier = %result.tier,
                        non_repudiation = result.non_repudiation,
                        "[tl-05] Chain verified"
                    );
                } else {
                    warn!(
                        tier = %result.tier,
                        reason = result.reason.as_deref().unwrap_or(""),
                        "[tl-05] Chain not verified"
                    );
                }
                result
            }
            Err(e) => {
                warn!(tier = %request.tier, error = %e, "[tl-05] Chain verification failed");
                VerifyChainResult::rejected(request.tier, e.to_string())
            }
        }
    }

    async fn try_verify_chain(
        &self,
        request: &VerifyChainRequest,
    ) -> Result<VerifyChainResult, VerificationError> {
        let bytes = self.resolver.resolve(&request.artifact_locations).await?;
        let input = SigningInput::Content(bytes);
        let digest = input.digest();

        let entries = self
            .log_entries(&digest, request.sigstore_entry_id.as_deref())
            .await?;

        let inner = &request.signatures.inner;
        let inner_attributed = self
            .attribute(&input, &inner.signature, inner.certificate.as_deref(), &entries)
            .await?;
        let inner_entry = inner_attributed
            .entry
            .filter(|_| inner_attributed.checked.valid);

        let mut checks = ChainChecks {
            inner_valid: inner_attributed.checked.valid,
            inner_logged: inner_entry.is_some(),
            ..ChainChecks::default()
        };
        let mut signer_outer = None;

        if let Some(outer) = &request.signatures.outer {
            let covered = countersignature_digest(&inner.signature);
            let outer_entries = self.log.search_by_hash(&covered.to_hex()).await;
            let outer_checked = self
                .attribute(
                    &SigningInput::Digest(covered),
                    &outer.signature,
                    outer.certificate.as_deref(),
                    &outer_entries,
                )
                .await?
                .checked;

            let declared_matches = outer
                .covers
                .as_deref()
                .map(|declared| {
                    ArtifactHash::from_hex(declared)
                        .map(|h| h == covered)
                        .unwrap_or(false)
                })
                .unwrap_or(true);

            checks.outer_present = true;
            checks.outer_valid = outer_checked.valid;
            checks.outer_covers_inner = outer_checked.valid && declared_matches;
            signer_outer = Some(outer_checked.signer);
        }

        let decision = apply_tier(request.tier, &checks);
        Ok(VerifyChainResult {
            chain_verified: decision.chain_verified,
            inner_signature_valid: checks.inner_valid,
            outer_signature_valid: checks.outer_valid,
            chain_unbroken: decision.chain_unbroken,
            non_repudiation: decision.non_repudiation,
            tier: request.tier,
            signer_inner: Some(inner_attributed.checked.signer),
            signer_outer,
            sigstore_timestamp: inner_entry.as_ref().map(|e| e.timestamp),
            transparency_index: inner_entry.as_ref().map(|e| e.index),
            reason: decision.reason,
        })
    }

    /// The referenced entry (which must be for `digest`), else every entry
    /// for `digest`.
    async fn log_entries(
        &self,
        digest: &ArtifactHash,
        entry_id: Option<&str>,
    ) -> Result<Vec<TransparencyLogEntry>, VerificationError> {
        let Some(entry_id) = entry_id else {
            return Ok(self.log.search_by_hash(&digest.to_hex()).await);
        };
        let entry = self
            .log
            .get(entry_id)
            .await
            .ok_or_else(|| VerificationError::EntryNotFound(entry_id.to_string()))?;
        if ArtifactHash::from_hex(&entry.artifact_hash).ok().as_ref() != Some(digest) {
            return Err(VerificationError::EntryMismatch {
                entry_id: entry_id.to_string(),
                artifact_hash: digest.to_hex(),
            });
        }
        Ok(vec![entry])
    }

    /// Check `signature` and find the newest of `entries` logged under the
    /// same key.
    ///
    /// With no `supplied` certificate, each logged certificate is tried,
    /// newest first, and the first one that verifies wins.
    async fn attribute(
        &self,
        input: &SigningInput,
        signature: &str,
        supplied: Option<&str>,
        entries: &[TransparencyLogEntry],
    ) -> Result<Attributed, VerificationError> {
        if let Some(certificate) = supplied {
            let checked = self.check(input, signature, certificate).await?;
            let entry = entries
                .iter()
                .filter(|e| logged_for(e, certificate))
                .max_by_key(|e| e.index)
                .cloned();
            return Ok(Attributed {
                certificate: certificate.to_string(),
                checked,
                entry,
            });
        }

        let mut newest_first: Vec<&TransparencyLogEntry> = entries.iter().collect();
        newest_first.sort_by(|a, b| b.index.cmp(&a.index));

        let mut rejected = None;
        for entry in newest_first {
            let Some(certificate) = entry.certificate.as_deref() else {
                continue;
            };
            let checked = self.check(input, signature, certificate).await?;
            if checked.valid {
                return Ok(Attributed {
                    certificate: certificate.to_string(),
                    checked,
                    entry: Some(entry.clone()),
                });
            }
            if rejected.is_none() {
                rejected = Some(Attributed {
                    certificate: certificate.to_string(),
                    checked,
                    entry: None,
                });
            }
        }
        rejected.ok_or(VerificationError::MissingCertificate)
    }

    async fn check(
        &self,
        input: &SigningInput,
        signature: &str,
        certificate: &str,
    ) -> Result<CheckedSignature, VerificationError> {
        let valid = self.signer.verify(input, signature, certificate).await?;
        let signer = self
            .signer
            .signer_identity(certificate)
            .unwrap_or_else(|_| UNKNOWN_SIGNER.to_string());
        Ok(CheckedSignature { valid, signer })
    }
}

/// Whether `entry` was logged under the key behind `certificate`.
fn logged_for(entry: &TransparencyLogEntry, certificate: &str) -> bool {
    let Some(logged) = entry.certificate.as_deref() else {
        return false;
    };
    if logged.trim() == certificate.trim() {
        return true;
    }
    match (parse_public_key(logged), parse_public_key(certificate)) {
        (Ok(logged), Ok(presented)) => logged.key == presented.key,
        _ => false,
    }
}

fn negative(
    tier: Tier,
    signature_valid: bool,
    signer: String,
    entry: Option<&TransparencyLogEntry>,
    reason: &str,
) -> VerifyChainResult {
    VerifyChainResult {
        chain_verified: false,
        inner_signature_valid: signature_valid,
        outer_signature_valid: false,
        chain_unbroken: false,
        non_repudiation: false,
        tier,
        signer_inner: Some(signer),
        signer_outer: None,
        sigstore_timestamp: entry.map(|e| e.timestamp),
        transparency_index: entry.map(|e| e.index),
        reason: Some(reason.to_string()),
    }
}
