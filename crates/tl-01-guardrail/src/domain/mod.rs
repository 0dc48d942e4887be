//! # Domain Layer
//!
//! Window arithmetic, whitelist matching and configuration. No I/O.

pub mod config;
pub mod errors;
pub mod whitelist;
pub mod window;

pub use config::*;
pub use errors::*;
pub use whitelist::*;
pub use window::*;
