//! Resolves artifact locations as paths under one root directory.
//!
//! Locations are relative paths, optionally written as `file://<path>`.
//! Absolute paths and `..` components are refused so a caller cannot read
//! outside the root.

use crate::domain::VerificationError;
use crate::ports::ArtifactResolver;
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct FilesystemArtifactResolver {
    root: PathBuf,
}

impl FilesystemArtifactResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path under the root for `location`, or `None` if it would escape it.
    fn confine(&self, location: &str) -> Option<PathBuf> {
        let relative = Path::new(location.strip_prefix("file://").unwrap_or(location));
        let mut path = self.root.clone();
        for component in relative.components() {
            match component {
                Component::Normal(part) => path.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
            }
        }
        (path != self.root).then_some(path)
    }
}

#[async_trait]
impl ArtifactResolver for FilesystemArtifactResolver {
    async fn resolve(&self, locations: &[String]) -> Result<Vec<u8>, VerificationError> {
        if locations.is_empty() {
            return Err(VerificationError::InvalidRequest(
                "artifact_locations is empty".into(),
            ));
        }

        for location in locations {
            let Some(path) = self.confine(location) else {
                warn!(location = %location, "[tl-05] Artifact location outside root refused");
                continue;
            };
            match tokio::fs::read(&path).await {
                Ok(bytes) => {
                    debug!(location = %location, bytes = bytes.len(), "[tl-05] Artifact resolved");
                    return Ok(bytes);
                }
                Err(e) => {
                    debug!(location = %location, error = %e, "[tl-05] Artifact location unreadable");
                }
            }
        }
        Err(VerificationError::ArtifactUnavailable(locations.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locations(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_first_readable_location_wins() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("replica")).unwrap();
        std::fs::write(dir.path().join("replica/scan.sarif"), b"replica").unwrap();
        std::fs::write(dir.path().join("scan.sarif"), b"primary").unwrap();
        let resolver = FilesystemArtifactResolver::new(dir.path());

        let bytes = resolver
            .resolve(&locations(&["missing.sarif", "file://replica/scan.sarif", "scan.sarif"]))
            .await
            .unwrap();
        assert_eq!(bytes, b"replica");
    }

    #[tokio::test]
    async fn test_traversal_refused() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("artifacts");
        std::fs::create_dir(&root).unwrap();
        std::fs::write(dir.path().join("secret"), b"x").unwrap();
        let resolver = FilesystemArtifactResolver::new(&root);

        let secret = dir.path().join("secret");
        let err = resolver
            .resolve(&locations(&["../secret", secret.to_str().unwrap()]))
            .await
            .unwrap_err();
        assert!(matches!(err, VerificationError::ArtifactUnavailable(2)));
    }

    #[tokio::test]
    async fn test_empty_locations_is_invalid() {
        let resolver = FilesystemArtifactResolver::new("/nonexistent");
        assert!(matches!(
            resolver.resolve(&[]).await,
            Err(VerificationError::InvalidRequest(_))
        ));
    }
}
