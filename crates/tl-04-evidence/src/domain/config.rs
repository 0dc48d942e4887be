use std::time::Duration;

/// Upper bound on one signing call.
pub const DEFAULT_SIGNING_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct EvidenceConfig {
    pub signing_timeout: Duration,
    /// Submit signed bundles to the transparency log, when one is wired in.
    pub submit_to_log: bool,
}

impl Default for EvidenceConfig {
    fn default() -> Self {
        Self {
            signing_timeout: DEFAULT_SIGNING_TIMEOUT,
            submit_to_log: true,
        }
    }
}

/// Subject passed to the signing backend for a decision.
pub fn signing_subject(decision_id: &str) -> String {
    format!("evidence:{}", decision_id)
}
