//! # Domain Layer
//!
//! Request shapes, tier policy and errors. No I/O.

pub mod errors;
pub mod policy;
pub mod requests;

pub use errors::*;
pub use policy::*;
pub use requests::*;
