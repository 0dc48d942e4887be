//! # Ports Layer
//!
//! - **Driven Ports (Outbound)**: `EvidenceStore`, durable bundle storage.
//!   Signing and transparency-log ports come from tl-02 and tl-03.

pub mod outbound;

pub use outbound::*;
