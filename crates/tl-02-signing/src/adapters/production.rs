//! Production signer: real asymmetric signatures over artifact digests.

use crate::domain::{BackendKind, SignatureBundle, SigningError, SigningInput};
use crate::ports::SigningBackend;
use async_trait::async_trait;
use shared_crypto::{
    decode_signature, key_fingerprint, parse_public_key, signer_identity, PrivateKeyMaterial,
    MOCK_CERTIFICATE_PREFIX,
};
use std::path::Path;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

enum SigningMode {
    /// Fresh P-256 key per signature.
    Keyless,
    KeyBased {
        key: PrivateKeyMaterial,
        certificate: String,
        signer: String,
    },
}

pub struct ProductionSigningBackend {
    mode: SigningMode,
}

impl ProductionSigningBackend {
    /// Ephemeral-key signing. The returned "certificate" is only the
    /// ephemeral public key; no authority vouches for it.
    pub fn keyless() -> Self {
        warn!("[tl-02] Keyless signing uses self-generated ephemeral keys without a certificate authority");
        Self {
            mode: SigningMode::Keyless,
        }
    }

    /// Key-based signing from PEM text.
    ///
    /// `certificate_pem`, when given, must carry the public half of the key;
    /// otherwise the key's PEM public key is handed out as the certificate.
    pub fn from_key_pem(
        key_pem: &str,
        password: Option<&str>,
        certificate_pem: Option<&str>,
    ) -> Result<Self, SigningError> {
        let key = PrivateKeyMaterial::from_pem(key_pem, password)?;
        let public_key = key.public_key();

        let certificate = match certificate_pem {
            Some(pem) => {
                let parsed = parse_public_key(pem)?;
                if parsed.key != public_key {
                    return Err(SigningError::CertificateMismatch);
                }
                pem.trim().to_string()
            }
            None => public_key.to_pem()?,
        };
        let signer = signer_identity(&certificate)?;

        info!(
            algorithm = key.algorithm().as_str(),
            signer = %signer,
            "[tl-02] Key-based signing configured"
        );

        Ok(Self {
            mode: SigningMode::KeyBased {
                key,
                certificate,
                signer,
            },
        })
    }

    /// Key-based signing from files. A missing key file is fatal.
    pub fn from_key_file(
        key_path: &Path,
        password: Option<&str>,
        certificate_path: Option<&Path>,
    ) -> Result<Self, SigningError> {
        let key_pem = std::fs::read_to_string(key_path)
            .map(Zeroizing::new)
            .map_err(|e| SigningError::MissingKey(format!("{}: {}", key_path.display(), e)))?;
        let certificate_pem = match certificate_path {
            Some(path) => Some(std::fs::read_to_string(path).map_err(|e| {
                SigningError::MissingKey(format!("certificate {}: {}", path.display(), e))
            })?),
            None => None,
        };
        Self::from_key_pem(key_pem.as_str(), password, certificate_pem.as_deref())
    }

    pub fn is_keyless(&self) -> bool {
        matches!(self.mode, SigningMode::Keyless)
    }
}

#[async_trait]
impl SigningBackend for ProductionSigningBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Production
    }

    async fn sign(
        &self,
        input: &SigningInput,
        subject: &str,
    ) -> Result<SignatureBundle, SigningError> {
        let artifact_hash = input.digest();

        let bundle = match &self.mode {
            SigningMode::Keyless => {
                let key = PrivateKeyMaterial::generate_ephemeral();
                let signature = key.sign_digest(&artifact_hash)?;
                let public_key = key.public_key();
                SignatureBundle {
                    signature: hex::encode(signature),
                    certificate: public_key.to_pem()?,
                    artifact_hash,
                    signer: key_fingerprint(&public_key)?,
                }
            }
            SigningMode::KeyBased {
                key,
                certificate,
                signer,
            } => SignatureBundle {
                signature: hex::encode(key.sign_digest(&artifact_hash)?),
                certificate: certificate.clone(),
                artifact_hash,
                signer: signer.clone(),
            },
        };

        debug!(
            artifact_hash = %artifact_hash,
            subject,
            signer = %bundle.signer,
            "[tl-02] Artifact signed"
        );
        Ok(bundle)
    }

    async fn verify(
        &self,
        input: &SigningInput,
        signature: &str,
        certificate: &str,
    ) -> Result<bool, SigningError> {
        if certificate.trim().starts_with(MOCK_CERTIFICATE_PREFIX) {
            return Err(SigningError::ForeignCertificate {
                backend: "production",
            });
        }

        let parsed = parse_public_key(certificate)?;
        let signature = match decode_signature(signature) {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!(error = %e, "[tl-02] Undecodable signature");
                return Ok(false);
            }
        };

        Ok(parsed.key.verify_digest(&input.digest(), &signature))
    }
}
