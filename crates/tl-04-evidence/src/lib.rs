//! # Evidence Pipeline (tl-04)
//!
//! Every guardrail decision becomes a `SignedEvidence` bundle on disk:
//! canonical JSON, SHA-256 content hash, a signature from the configured
//! backend, and optionally a transparency-log entry.
//!
//! ## Status Outcomes
//!
//! | Situation | `verification_status` | `content_hash` |
//! |-----------|-----------------------|----------------|
//! | Signed | `signed` | canonical hash |
//! | Backend timed out or unreachable | `offline` | canonical hash |
//! | Any other signing error | `failed` | `"error"` |
//! | Bundle could not be written | `failed` | `"error"` |
//!
//! Nothing is retried here; retries belong to the signing and log clients.
//!
//! ## Scheduling
//!
//! [`EvidenceDispatcher`] implements the guardrail's `DecisionSink`. It
//! spawns one task per decision and keeps its handle until completion.
//! Bundles still in flight when the process exits are lost; `drain` at
//! shutdown narrows that window.

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod adapters;
pub mod dispatcher;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::FileEvidenceStore;
pub use dispatcher::EvidenceDispatcher;
pub use domain::{signing_subject, EvidenceConfig, EvidenceError, DEFAULT_SIGNING_TIMEOUT};
pub use ports::EvidenceStore;
pub use service::EvidenceGenerator;
