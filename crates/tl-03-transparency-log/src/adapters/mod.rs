//! # Adapters Layer

pub mod memory;
pub mod rekor;

pub use memory::InMemoryTransparencyLog;
pub use rekor::{RekorConfig, RekorTransparencyLog};
