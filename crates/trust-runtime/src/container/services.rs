//! # Service Container
//!
//! Builds every subsystem once at startup and holds the shared handles.
//!
//! ## Initialization Order
//!
//! ```text
//! Level 0: signing backend, transparency log, evidence store (no deps)
//! Level 1: guardrail, evidence generator + dispatcher
//! Level 2: artifact signing, verification
//! ```
//!
//! The signing backend and log are chosen here and nowhere else: mock
//! pairs with the in-memory log, production with Rekor.

use crate::container::config::{ConfigError, TrustConfig};
use std::sync::Arc;
use thiserror::Error;
use tl_01_guardrail::{GuardrailStats, RateLimitGuardrail};
use tl_02_signing::{
    BackendKind, MockSigningBackend, ProductionSigningBackend, SigningBackend, SigningError,
};
use tl_03_transparency_log::{
    InMemoryTransparencyLog, LogError, RekorConfig, RekorTransparencyLog, TransparencyLog,
};
use tl_04_evidence::{EvidenceConfig, EvidenceDispatcher, EvidenceGenerator, FileEvidenceStore};
use tl_05_verification::{ArtifactSigningService, FilesystemArtifactResolver, VerificationService};
use tokio::runtime::Handle;
use tracing::info;

/// Anything that stops the service from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Signing backend error: {0}")]
    Signing(#[from] SigningError),

    #[error("Transparency log error: {0}")]
    Log(#[from] LogError),
}

pub struct TrustContainer {
    pub config: TrustConfig,
    pub guardrail: Arc<RateLimitGuardrail>,
    pub signer: Arc<dyn SigningBackend>,
    pub log: Arc<dyn TransparencyLog>,
    pub evidence_store: Arc<FileEvidenceStore>,
    pub dispatcher: Arc<EvidenceDispatcher>,
    pub signing: Arc<ArtifactSigningService>,
    pub verification: Arc<VerificationService>,
}

impl TrustContainer {
    /// Validate `config` and build every subsystem. Evidence tasks are
    /// spawned on `runtime`.
    pub fn build(config: TrustConfig, runtime: Handle) -> Result<Self, StartupError> {
        config.validate()?;

        // Level 0
        let (signer, log) = select_backends(&config)?;
        let evidence_store = Arc::new(FileEvidenceStore::new(&config.storage.evidence_dir));

        // Level 1
        let guardrail = Arc::new(
            RateLimitGuardrail::new(config.guardrail.to_guardrail_config()?)
                .map_err(ConfigError::from)?,
        );
        let generator = EvidenceGenerator::new(
            Arc::clone(&signer),
            evidence_store.clone(),
            EvidenceConfig {
                signing_timeout: config.signing.timeout,
                ..EvidenceConfig::default()
            },
        )
        .with_transparency_log(Arc::clone(&log));
        let dispatcher = Arc::new(EvidenceDispatcher::new(Arc::new(generator), runtime));

        // Level 2
        let signing = Arc::new(
            ArtifactSigningService::new(Arc::clone(&signer), Arc::clone(&log))
                .with_signing_timeout(config.signing.timeout),
        );
        let verification = Arc::new(VerificationService::new(
            Arc::clone(&signer),
            Arc::clone(&log),
            Arc::new(FilesystemArtifactResolver::new(&config.storage.artifact_root)),
        ));

        info!(
            backend = signer.kind().as_str(),
            log = log.kind(),
            evidence_dir = %config.storage.evidence_dir.display(),
            "[runtime] Services initialized"
        );

        Ok(Self {
            config,
            guardrail,
            signer,
            log,
            evidence_store,
            dispatcher,
            signing,
            verification,
        })
    }

    pub fn guardrail_stats(&self) -> GuardrailStats {
        self.guardrail.stats()
    }
}

fn select_backends(
    config: &TrustConfig,
) -> Result<(Arc<dyn SigningBackend>, Arc<dyn TransparencyLog>), StartupError> {
    match config.signing.backend {
        BackendKind::Mock => Ok((
            Arc::new(MockSigningBackend::new()),
            Arc::new(InMemoryTransparencyLog::new()),
        )),
        BackendKind::Production => {
            let signing = &config.signing;
            let signer = match &signing.key_path {
                Some(path) => ProductionSigningBackend::from_key_file(
                    path,
                    signing.key_password.as_deref(),
                    signing.cert_path.as_deref(),
                )?,
                None if signing.keyless => ProductionSigningBackend::keyless(),
                None => return Err(ConfigError::MissingSigningKey.into()),
            };
            let log = RekorTransparencyLog::new(RekorConfig {
                base_url: config.transparency.rekor_url.clone(),
                ..RekorConfig::default()
            })?;
            Ok((Arc::new(signer), Arc::new(log)))
        }
    }
}
