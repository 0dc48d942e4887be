//! Guardrail configuration errors.
//!
//! Admission itself never fails; only building a guardrail can.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GuardrailError {
    /// Whitelist entry is neither an IP address nor a CIDR range.
    #[error("Invalid whitelist entry '{entry}': {reason}")]
    InvalidWhitelistEntry { entry: String, reason: String },

    /// Burst limit larger than the per-minute limit can never trigger.
    #[error("Burst limit {burst} exceeds per-minute limit {limit}")]
    BurstExceedsLimit { burst: u32, limit: u32 },
}
