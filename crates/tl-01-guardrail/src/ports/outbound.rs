//! Outbound ports for the guardrail.

use shared_types::IntegrityDecision;

/// Time source trait for testability.
pub trait TimeSource: Send + Sync {
    /// Milliseconds since the unix epoch.
    fn now_millis(&self) -> u64;
}

/// System time implementation
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now_millis(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            // Clock before the epoch: report 0 rather than panic.
            .unwrap_or(0)
    }
}

/// Receives every decision the guardrail layer makes.
///
/// Called inline on the request path, so implementations must hand the
/// decision off without blocking (spawn, channel send) and must not fail.
pub trait DecisionSink: Send + Sync {
    fn submit(&self, decision: IntegrityDecision);
}

/// Sink that drops decisions, for deployments without evidence capture.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDecisionSink;

impl DecisionSink for NullDecisionSink {
    fn submit(&self, _decision: IntegrityDecision) {}
}
