//! # Adapters Layer

pub mod filesystem;

pub use filesystem::FilesystemArtifactResolver;
