//! # Guardrail Service
//!
//! Owns the per-client windows for the process lifetime. Nothing is
//! persisted; a restart starts every client with a fresh window.
//!
//! Admission never sweeps the client map. Idle clients are dropped only by
//! [`cleanup_task`], which the owner spawns next to the guardrail.

use crate::domain::{
    AdmissionOutcome, AdmissionResult, ClientWindow, DenialReason, GuardrailConfig,
    GuardrailError, GuardrailStats, CLEANUP_INTERVAL,
};
use crate::ports::{SystemTimeSource, TimeSource};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Value of the `guardrail` field in emitted decisions.
pub const GUARDRAIL_NAME: &str = "rate_limit";

pub struct RateLimitGuardrail {
    config: GuardrailConfig,
    clients: DashMap<String, ClientWindow>,
    denials: AtomicU64,
    shadow_violations: AtomicU64,
    last_cleanup_ms: AtomicU64,
    time: Arc<dyn TimeSource>,
}

impl RateLimitGuardrail {
    pub fn new(config: GuardrailConfig) -> Result<Self, GuardrailError> {
        Self::with_time_source(config, Arc::new(SystemTimeSource))
    }

    pub fn with_time_source(
        config: GuardrailConfig,
        time: Arc<dyn TimeSource>,
    ) -> Result<Self, GuardrailError> {
        config.validate()?;
        info!(
            limit = config.requests_per_minute,
            burst = config.burst_limit,
            shadow_mode = config.shadow_mode,
            whitelist_entries = config.whitelist.len(),
            "[tl-01] Rate-limit guardrail configured"
        );
        let now = time.now_millis();
        Ok(Self {
            config,
            clients: DashMap::new(),
            denials: AtomicU64::new(0),
            shadow_violations: AtomicU64::new(0),
            last_cleanup_ms: AtomicU64::new(now),
            time,
        })
    }

    pub fn config(&self) -> &GuardrailConfig {
        &self.config
    }

    /// Admit a request from `client_id` at the time-source's current time.
    pub fn admit_now(&self, client_id: &str) -> AdmissionResult {
        self.admit(client_id, self.time.now_millis())
    }

    /// Decide whether `client_id` may proceed at `now_ms` (unix millis).
    ///
    /// An admitted request is recorded in the client's window before the
    /// entry lock is released, so two concurrent requests can never both
    /// take the last slot.
    pub fn admit(&self, client_id: &str, now_ms: u64) -> AdmissionResult {
        let limit = self.config.requests_per_minute;

        if self.config.is_disabled() {
            return AdmissionResult {
                allowed: true,
                remaining: 0,
                limit,
                reset_at: now_ms.div_ceil(1000),
                outcome: AdmissionOutcome::Unlimited,
            };
        }

        if self.config.whitelist.contains_client(client_id) {
            debug!(client = client_id, "[tl-01] Whitelisted client bypasses limit");
            return AdmissionResult {
                allowed: true,
                remaining: limit,
                limit,
                reset_at: now_ms.div_ceil(1000),
                outcome: AdmissionOutcome::Whitelisted,
            };
        }

        let result = {
            let mut window = self.clients.entry(client_id.to_string()).or_default();
            window.prune(now_ms);

            let count = window.count();
            let burst = self.config.burst_limit;
            let violation = if burst > 0 && window.burst_count(now_ms) >= burst {
                Some(DenialReason::Burst)
            } else if count >= limit {
                Some(DenialReason::Window)
            } else {
                None
            };

            match violation {
                Some(reason) if !self.config.shadow_mode => AdmissionResult {
                    allowed: false,
                    remaining: 0,
                    limit,
                    reset_at: window.reset_at(now_ms),
                    outcome: AdmissionOutcome::Denied(reason),
                },
                other => {
                    window.record(now_ms);
                    AdmissionResult {
                        allowed: true,
                        remaining: limit.saturating_sub(count + 1),
                        limit,
                        reset_at: window.reset_at(now_ms),
                        outcome: match other {
                            Some(reason) => AdmissionOutcome::ShadowViolation(reason),
                            None => AdmissionOutcome::Admitted,
                        },
                    }
                }
            }
        };

        match result.outcome {
            AdmissionOutcome::Denied(reason) => {
                self.denials.fetch_add(1, Ordering::Relaxed);
                warn!(
                    client = client_id,
                    reason = reason.as_str(),
                    limit,
                    "[tl-01] Rate limit exceeded"
                );
            }
            AdmissionOutcome::ShadowViolation(reason) => {
                self.shadow_violations.fetch_add(1, Ordering::Relaxed);
                warn!(
                    client = client_id,
                    reason = reason.as_str(),
                    limit,
                    "[tl-01] Shadow mode: request would have been denied"
                );
            }
            _ => {}
        }

        result
    }

    /// Run [`cleanup`](Self::cleanup) if the last pass is at least five
    /// minutes old. Concurrent callers race on a CAS; only one wins.
    pub fn maybe_cleanup(&self, now_ms: u64) {
        let last = self.last_cleanup_ms.load(Ordering::Relaxed);
        let interval = CLEANUP_INTERVAL.as_millis() as u64;
        if now_ms.saturating_sub(last) < interval {
            return;
        }
        if self
            .last_cleanup_ms
            .compare_exchange(last, now_ms, Ordering::AcqRel, Ordering::Relaxed)
            .is_ok()
        {
            self.cleanup(now_ms);
        }
    }

    /// Prune every window and forget clients whose window is now empty.
    ///
    /// Runs shard by shard under the shard's write lock, so it never
    /// interleaves with an admission for a client in the same shard.
    pub fn cleanup(&self, now_ms: u64) -> usize {
        let before = self.clients.len();
        self.clients.retain(|_, window| {
            window.prune(now_ms);
            !window.is_empty()
        });
        let removed = before.saturating_sub(self.clients.len());
        if removed > 0 {
            debug!(removed, "[tl-01] Removed idle rate-limit clients");
        }
        removed
    }

    pub fn stats(&self) -> GuardrailStats {
        GuardrailStats {
            tracked_clients: self.clients.len(),
            denials: self.denials.load(Ordering::Relaxed),
            shadow_violations: self.shadow_violations.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn now_millis(&self) -> u64 {
        self.time.now_millis()
    }
}

/// Background task to clean up idle clients.
pub async fn cleanup_task(guardrail: Arc<RateLimitGuardrail>, interval: Duration) {
    let mut cleanup_interval = tokio::time::interval(interval);
    cleanup_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        cleanup_interval.tick().await;
        guardrail.maybe_cleanup(guardrail.now_millis());
    }
}
