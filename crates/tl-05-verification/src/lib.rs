//! # Verification (tl-05)
//!
//! Two services over the same signing backend and transparency log:
//!
//! - [`ArtifactSigningService`]: sign an artifact hash and record it in the
//!   log; countersign an inner signature for the verified tier.
//! - [`VerificationService`]: check a signature and its log record, or a
//!   two-signer chain under a tier policy.
//!
//! ## Chain Model
//!
//! ```text
//! artifact ──sign(inner signer)──→ inner signature
//!                                       │ sha256(text)
//!                                       ▼
//!                   sign(trust service)──→ outer signature
//! ```
//!
//! `basic` trusts the inner signature alone. `verified` also needs a valid
//! outer signature over exactly this inner signature.
//!
//! Verification never returns an error to the caller: anything that goes
//! wrong is a negative result with a `reason`.

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;
pub mod signing;

pub use adapters::FilesystemArtifactResolver;
pub use domain::{
    apply_tier, countersignature_digest, ChainChecks, ChainSignature, ChainSignatures,
    SignRequest, TierDecision, VerificationError, VerifyChainRequest, VerifyRequest,
};
pub use ports::ArtifactResolver;
pub use service::VerificationService;
pub use signing::{ArtifactSigningService, COUNTERSIGNATURE_TYPE};
