//! # Shared Types Crate
//!
//! This crate contains the records that cross subsystem boundaries in the
//! trust runtime: guardrail decisions, signed evidence bundles, artifact
//! signing requests, transparency-log entries and verification results.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-subsystem types are defined here.
//! - **Write-Once Records**: `IntegrityDecision` and `SignedEvidence` are
//!   created once and never mutated afterwards.
//! - **Canonical Hashing**: Anything that gets signed is serialized through
//!   [`canonical_json`] first, so field order never changes a hash.

pub mod canonical;
pub mod entities;
pub mod merkle;
pub mod trace;
pub mod transparency;
pub mod verification;

pub use canonical::{canonical_json, content_hash, CanonicalError};
pub use entities::*;
pub use trace::TraceContext;
pub use transparency::*;
pub use verification::*;
