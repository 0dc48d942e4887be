use crate::domain::VerificationError;
use async_trait::async_trait;

/// Fetches artifact bytes from one of several candidate locations.
#[async_trait]
pub trait ArtifactResolver: Send + Sync {
    /// Bytes from the first readable location, in the order given.
    async fn resolve(&self, locations: &[String]) -> Result<Vec<u8>, VerificationError>;
}
