//! Per-client sliding window.
//!
//! Timestamps are unix milliseconds, kept in arrival order. A timestamp
//! older than the clock's last value is clamped up so the sequence never
//! decreases.

use super::config::{BURST_WINDOW, WINDOW};
use std::collections::VecDeque;

#[derive(Debug, Clone, Default)]
pub struct ClientWindow {
    timestamps: VecDeque<u64>,
}

impl ClientWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop timestamps that have left the 60s window.
    pub fn prune(&mut self, now_ms: u64) {
        let window_ms = WINDOW.as_millis() as u64;
        while let Some(&oldest) = self.timestamps.front() {
            if oldest.saturating_add(window_ms) <= now_ms {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }
    }

    /// Requests in the 60s window. Call after [`prune`](Self::prune).
    pub fn count(&self) -> u32 {
        self.timestamps.len() as u32
    }

    /// Requests in the trailing 10s.
    pub fn burst_count(&self, now_ms: u64) -> u32 {
        let burst_ms = BURST_WINDOW.as_millis() as u64;
        self.timestamps
            .iter()
            .rev()
            .take_while(|&&ts| ts.saturating_add(burst_ms) > now_ms)
            .count() as u32
    }

    /// Append a request, clamping to keep the sequence non-decreasing.
    pub fn record(&mut self, now_ms: u64) {
        let ts = match self.timestamps.back() {
            Some(&last) if last > now_ms => last,
            _ => now_ms,
        };
        self.timestamps.push_back(ts);
    }

    /// Unix seconds at which the window next frees a slot.
    pub fn reset_at(&self, now_ms: u64) -> u64 {
        let window_ms = WINDOW.as_millis() as u64;
        let base = self.timestamps.front().copied().unwrap_or(now_ms);
        base.saturating_add(window_ms).div_ceil(1000)
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn timestamps(&self) -> Vec<u64> {
        self.timestamps.iter().copied().collect()
    }
}
