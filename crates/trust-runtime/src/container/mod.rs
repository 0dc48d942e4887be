//! # Container
//!
//! Configuration and the service container built from it.

pub mod config;
pub mod services;

pub use config::{ConfigError, TrustConfig};
pub use services::{StartupError, TrustContainer};
