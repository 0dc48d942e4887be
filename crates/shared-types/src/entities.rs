//! # Decision & Evidence Entities
//!
//! ## Clusters
//!
//! - **Guardrail output**: `IntegrityDecision`, `DecisionOutcome`
//! - **Evidence**: `SignedEvidence`, `VerificationStatus`
//! - **Artifact signing**: `ArtifactSignRequest`, `ArtifactSignResponse`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::trace::TraceContext;
use crate::transparency::TransparencyLogEntry;

/// Outcome of a guarded request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionOutcome {
    /// Request admitted.
    Allowed,
    /// Request rejected.
    Denied,
    /// Request admitted although the guardrail would have denied it
    /// (shadow mode).
    Degraded,
}

impl DecisionOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Allowed => "allowed",
            Self::Denied => "denied",
            Self::Degraded => "degraded",
        }
    }
}

/// One access-control decision made by a guardrail.
///
/// Created once per guarded request and consumed exactly once by the
/// evidence pipeline. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrityDecision {
    pub decision_id: String,
    pub timestamp: DateTime<Utc>,
    pub trace_id: String,
    pub span_id: String,
    /// Service that made the decision.
    pub service: String,
    pub decision: DecisionOutcome,
    pub reason: String,
    /// Name of the guardrail that decided (e.g. `rate_limit`).
    pub guardrail: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
}

impl IntegrityDecision {
    /// Create a decision stamped with a fresh id and the current time.
    pub fn new(
        service: impl Into<String>,
        guardrail: impl Into<String>,
        decision: DecisionOutcome,
        reason: impl Into<String>,
        trace: &TraceContext,
    ) -> Self {
        Self {
            decision_id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            trace_id: trace.trace_id.clone(),
            span_id: trace.span_id.clone(),
            service: service.into(),
            decision,
            reason: reason.into(),
            guardrail: guardrail.into(),
            metadata: BTreeMap::new(),
        }
    }

    /// Builder-style metadata attachment, used before the decision is emitted.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Trust level reached by an evidence bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    /// Not (yet) signed.
    Unsigned,
    /// Signature obtained from the signing backend.
    Signed,
    /// Pipeline failed; the bundle is a minimal fallback.
    Failed,
    /// Signing backend unreachable or timed out.
    Offline,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unsigned => "unsigned",
            Self::Signed => "signed",
            Self::Failed => "failed",
            Self::Offline => "offline",
        }
    }
}

/// Content hash recorded in a fallback bundle.
pub const FAILED_CONTENT_HASH: &str = "error";

/// A decision snapshot with its hash, signature and trust status.
///
/// Write-once; persisted under `dec_<evidence_id>.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedEvidence {
    pub evidence_id: String,
    pub timestamp: DateTime<Utc>,
    pub decision: IntegrityDecision,
    /// Hex SHA-256 of the canonical decision, or `"error"` for a fallback.
    pub content_hash: String,
    pub signature: Option<String>,
    pub signer_certificate: Option<String>,
    pub transparency_log_entry: Option<TransparencyLogEntry>,
    pub verification_status: VerificationStatus,
}

impl SignedEvidence {
    /// Storage file name for this bundle.
    pub fn file_name(&self) -> String {
        evidence_file_name(&self.evidence_id)
    }
}

/// `dec_<evidence_id>.json`
pub fn evidence_file_name(evidence_id: &str) -> String {
    format!("dec_{}.json", evidence_id)
}

/// Request to sign a supply-chain artifact (SARIF, SBOM, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactSignRequest {
    /// Lowercase hex SHA-256, optionally `sha256:`-prefixed.
    pub artifact_hash: String,
    pub artifact_type: String,
    pub subject: String,
    #[serde(default)]
    pub predicates: BTreeMap<String, Value>,
}

/// Result of a sign-and-log operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactSignResponse {
    pub entry_id: String,
    pub signature: String,
    pub certificate: Option<String>,
    pub transparency_entry: TransparencyLogEntry,
}
