//! # Signing Backends (tl-02)
//!
//! Produces and checks signatures over artifact digests.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): signing input, signature bundle, errors
//! - **Ports Layer** (`ports/`): the [`SigningBackend`] trait
//! - **Adapters Layer** (`adapters/`): [`MockSigningBackend`] and
//!   [`ProductionSigningBackend`]
//!
//! One backend is chosen at startup and injected everywhere a signature is
//! made or checked. Mock signatures never verify under the production
//! backend and vice versa.
//!
//! ## Production Modes
//!
//! | Mode | Key | "Certificate" returned |
//! |------|-----|------------------------|
//! | keyless | fresh P-256 key per signature | PEM public key of that key |
//! | key-based | configured RSA / P-256 / secp256k1 key | configured PEM certificate, else PEM public key |
//!
//! Keyless mode has no certificate authority behind it: the returned public
//! key binds the signature to nothing but itself. Treat it as a placeholder
//! for CA-issued short-lived certificates, not as an identity guarantee.

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod adapters;
pub mod domain;
pub mod ports;

pub use adapters::{MockSigningBackend, ProductionSigningBackend};
pub use domain::{BackendKind, SignatureBundle, SigningError, SigningInput};
pub use ports::SigningBackend;
