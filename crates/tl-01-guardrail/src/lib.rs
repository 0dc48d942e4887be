//! # Rate-Limit Guardrail (tl-01)
//!
//! Per-client admission control placed inline in front of every guarded
//! request. Each admission produces an [`AdmissionResult`]; the HTTP layer
//! turns that into rate-limit headers, an optional 429, and one
//! `IntegrityDecision` handed to a [`DecisionSink`].
//!
//! ## Algorithm
//!
//! ```text
//! admit(client, now)
//!   │
//!   ├─ limit == 0 ───────────────→ allowed (limiting disabled)
//!   ├─ client in whitelist ──────→ allowed (bypass)
//!   │
//!   ├─ drop timestamps older than 60s
//!   ├─ count in last 10s >= burst ─→ deny (burst)
//!   ├─ count in last 60s >= limit ─→ deny (window)
//!   └─ record now, remaining = limit - count
//! ```
//!
//! Shadow mode evaluates the same way but never blocks: a would-be denial
//! is counted as a shadow violation and the request proceeds.
//!
//! ## Concurrency
//!
//! State lives in a `DashMap` keyed by client id. Evaluation and recording
//! happen under the entry lock of that one client, so concurrent requests
//! from the same client are serialized while other clients proceed.
//! Idle cleanup runs off the request path in `cleanup_task`, at most every
//! five minutes, and only removes clients whose window is empty after
//! pruning.

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod domain;
pub mod middleware;
pub mod ports;
pub mod service;

pub use domain::{
    AdmissionOutcome, AdmissionResult, DenialReason, GuardrailConfig, GuardrailError,
    GuardrailStats, IpRange, Whitelist, BURST_WINDOW, CLEANUP_INTERVAL, RETRY_AFTER_SECS,
    WINDOW,
};
pub use middleware::{extract_client_id, GuardrailLayer, GuardrailService, UNKNOWN_CLIENT};
pub use ports::{DecisionSink, NullDecisionSink, SystemTimeSource, TimeSource};
pub use service::{cleanup_task, RateLimitGuardrail, GUARDRAIL_NAME};
