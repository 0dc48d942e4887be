//! # Trust Runtime
//!
//! Wires the trust subsystems into one HTTP service.
//!
//! ## Modular Structure
//!
//! - `container/` - configuration and the service container
//! - `http/` - router, handlers and the rate-limit layer placement
//! - `logging` - global subscriber setup
//!
//! ## Startup Sequence
//!
//! 1. Load configuration from `TL_*` environment variables
//! 2. Install the tracing subscriber
//! 3. Select the signing backend and transparency log, build services
//! 4. Start the guardrail cleanup task
//! 5. Serve HTTP until Ctrl+C
//! 6. Drain in-flight evidence, bounded by `TL_DRAIN_TIMEOUT_SECS`

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod container;
pub mod http;
pub mod logging;

pub use container::{ConfigError, StartupError, TrustConfig, TrustContainer};
pub use http::{build_router, AppState};
pub use logging::init_logging;
