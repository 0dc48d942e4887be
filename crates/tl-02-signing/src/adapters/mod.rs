//! # Adapters Layer

pub mod mock;
pub mod production;

pub use mock::MockSigningBackend;
pub use production::ProductionSigningBackend;
