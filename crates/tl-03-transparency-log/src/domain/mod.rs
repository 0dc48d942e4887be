//! # Domain Layer
//!
//! Merkle bookkeeping, leaf encoding, retry policy and errors. No I/O.

pub mod errors;
pub mod leaf;
pub mod retry;
pub mod tree;

pub use errors::*;
pub use leaf::*;
pub use retry::*;
pub use tree::*;
