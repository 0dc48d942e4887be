//! # Domain Layer
//!
//! Value objects and errors shared by every signing backend.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
