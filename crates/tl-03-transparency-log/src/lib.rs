//! # Transparency Log (tl-03)
//!
//! Append-only log of signed artifact hashes, with Merkle inclusion proofs
//! that let anyone check an entry sits at its recorded position.
//!
//! ## Variants
//!
//! - [`InMemoryTransparencyLog`]: process-lifetime log for tests and the
//!   mock deployment. Builds its own RFC 6962 tree.
//! - [`RekorTransparencyLog`]: HTTP client for a Rekor server. Proofs come
//!   from the server.
//!
//! ## Failure Semantics
//!
//! | Operation | On failure |
//! |-----------|------------|
//! | `submit` | `Err(LogError)`, the sign-and-log operation fails |
//! | `get` | `None` |
//! | `search_by_hash` | empty list |
//! | `inclusion_proof` | `None` |
//!
//! Only connection and timeout errors are retried (three attempts,
//! exponential backoff). HTTP status errors are returned as they are.

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod adapters;
pub mod domain;
pub mod ports;

pub use adapters::{InMemoryTransparencyLog, RekorConfig, RekorTransparencyLog};
pub use domain::{entry_leaf_hash, leaf_data, LogError, MerkleLog, RetryPolicy};
pub use ports::TransparencyLog;
