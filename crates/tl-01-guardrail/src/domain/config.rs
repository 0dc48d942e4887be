//! Guardrail configuration and admission value objects.

use super::errors::GuardrailError;
use super::whitelist::Whitelist;
use serde::Serialize;
use std::time::Duration;

/// Sliding window length.
pub const WINDOW: Duration = Duration::from_secs(60);

/// Burst sub-window length.
pub const BURST_WINDOW: Duration = Duration::from_secs(10);

/// Minimum spacing between idle-client cleanup passes.
pub const CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

/// `Retry-After` hint sent with a 429.
pub const RETRY_AFTER_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardrailConfig {
    /// Requests per client per 60s window. 0 disables limiting.
    pub requests_per_minute: u32,
    /// Requests per client per 10s burst window. 0 disables the burst check.
    pub burst_limit: u32,
    /// Evaluate and log, never block.
    pub shadow_mode: bool,
    pub whitelist: Whitelist,
}

impl Default for GuardrailConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: 100,
            burst_limit: 20,
            shadow_mode: false,
            whitelist: Whitelist::default(),
        }
    }
}

impl GuardrailConfig {
    pub fn validate(&self) -> Result<(), GuardrailError> {
        if self.requests_per_minute > 0 && self.burst_limit > self.requests_per_minute {
            return Err(GuardrailError::BurstExceedsLimit {
                burst: self.burst_limit,
                limit: self.requests_per_minute,
            });
        }
        Ok(())
    }

    pub fn is_disabled(&self) -> bool {
        self.requests_per_minute == 0
    }
}

/// Which limit a request ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    Burst,
    Window,
}

impl DenialReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Burst => "burst_limit_exceeded",
            Self::Window => "rate_limit_exceeded",
        }
    }
}

/// How an admission was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionOutcome {
    /// Counted against the window and admitted.
    Admitted,
    /// Whitelisted client, not counted.
    Whitelisted,
    /// Limiting disabled (limit 0).
    Unlimited,
    /// Rejected.
    Denied(DenialReason),
    /// Would have been rejected; admitted because of shadow mode.
    ShadowViolation(DenialReason),
}

impl AdmissionOutcome {
    /// Reason string recorded in the emitted decision.
    pub fn reason(&self) -> String {
        match self {
            Self::Admitted => "within_limit".to_string(),
            Self::Whitelisted => "whitelisted".to_string(),
            Self::Unlimited => "rate_limit_disabled".to_string(),
            Self::Denied(reason) => reason.as_str().to_string(),
            Self::ShadowViolation(reason) => format!("shadow_mode:{}", reason.as_str()),
        }
    }
}

/// Result of one admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmissionResult {
    pub allowed: bool,
    pub remaining: u32,
    pub limit: u32,
    /// Unix seconds at which the oldest counted request leaves the window.
    pub reset_at: u64,
    pub outcome: AdmissionOutcome,
}

/// Point-in-time guardrail counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GuardrailStats {
    pub tracked_clients: usize,
    pub denials: u64,
    pub shadow_violations: u64,
}
