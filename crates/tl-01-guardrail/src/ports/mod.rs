//! # Ports Layer
//!
//! - **Driven Ports (Outbound)**: `TimeSource` for testable clocks and
//!   `DecisionSink`, the hand-off point to the evidence pipeline.

pub mod outbound;

pub use outbound::*;
