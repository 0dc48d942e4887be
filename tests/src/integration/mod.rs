//! # Integration Tests
//!
//! Each module wires real subsystem implementations together; only the
//! network-facing transparency log is replaced by the in-memory one.

pub mod artifact_flow;
pub mod evidence_flow;
pub mod runtime_flow;
