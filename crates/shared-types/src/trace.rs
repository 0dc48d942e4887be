//! # Trace Context
//!
//! Minimal W3C `traceparent` handling so every decision carries the trace
//! and span of the request that produced it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Trace and span identifiers attached to a guarded request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceContext {
    /// 32 lowercase hex characters.
    pub trace_id: String,
    /// 16 lowercase hex characters.
    pub span_id: String,
}

impl TraceContext {
    /// Fresh random identifiers.
    pub fn generate() -> Self {
        let trace_id = Uuid::new_v4().simple().to_string();
        let span_id = Uuid::new_v4().simple().to_string()[..16].to_string();
        Self { trace_id, span_id }
    }

    /// Parse a `traceparent` header (`00-<trace>-<span>-<flags>`).
    ///
    /// Returns `None` for anything malformed or for the all-zero ids the
    /// W3C format reserves as invalid.
    pub fn from_traceparent(header: &str) -> Option<Self> {
        let mut parts = header.trim().split('-');
        let version = parts.next()?;
        let trace_id = parts.next()?;
        let span_id = parts.next()?;
        let flags = parts.next()?;

        let is_hex = |s: &str, len: usize| s.len() == len && s.chars().all(|c| c.is_ascii_hexdigit());
        if !is_hex(version, 2) || !is_hex(trace_id, 32) || !is_hex(span_id, 16) || !is_hex(flags, 2)
        {
            return None;
        }
        if trace_id.chars().all(|c| c == '0') || span_id.chars().all(|c| c == '0') {
            return None;
        }

        Some(Self {
            trace_id: trace_id.to_ascii_lowercase(),
            span_id: span_id.to_ascii_lowercase(),
        })
    }

    /// Use the header when it parses, otherwise generate.
    pub fn from_header_or_generate(header: Option<&str>) -> Self {
        header
            .and_then(Self::from_traceparent)
            .unwrap_or_else(Self::generate)
    }
}
