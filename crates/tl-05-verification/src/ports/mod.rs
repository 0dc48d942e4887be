//! # Ports Layer
//!
//! - **Driven Ports (Outbound)**: `ArtifactResolver` fetches artifact bytes
//!   for chain verification. Signing and log ports come from tl-02 / tl-03.

pub mod outbound;

pub use outbound::*;
