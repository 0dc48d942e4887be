//! # Keys & Signature Dispatch
//!
//! Loads public keys (PEM `PUBLIC KEY`, PEM `CERTIFICATE`, or hex SPKI DER)
//! and private keys (PKCS#8, encrypted PKCS#8, PKCS#1 RSA, SEC1 EC), then
//! dispatches sign/verify to the matching algorithm.
//!
//! ## Supported Algorithms
//!
//! - RSA PKCS#1 v1.5 with SHA-256
//! - ECDSA P-256 with SHA-256 (also used for ephemeral keyless keys)
//! - ECDSA secp256k1 with SHA-256
//!
//! Anything else is rejected with [`CryptoError::UnsupportedKeyType`];
//! an unknown key never verifies by accident.

use crate::hashing::ArtifactHash;
use crate::CryptoError;
use pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePublicKey, LineEnding, ObjectIdentifier};
use rsa::{Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use spki::der::{Document, SecretDocument};
use spki::SubjectPublicKeyInfoRef;
use x509_cert::der::{DecodePem, Encode};
use x509_cert::Certificate;

/// rsaEncryption
pub const RSA_ENCRYPTION: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");
/// id-ecPublicKey
pub const EC_PUBLIC_KEY: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.2.1");
/// prime256v1 / P-256
pub const CURVE_P256: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.3.1.7");
/// secp256k1
pub const CURVE_SECP256K1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.132.0.10");

/// Signature algorithm bound to a key type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAlgorithm {
    /// RSASSA-PKCS1-v1_5 with SHA-256.
    RsaPkcs1v15Sha256,
    /// ECDSA over NIST P-256 with SHA-256.
    EcdsaP256Sha256,
    /// ECDSA over secp256k1 with SHA-256.
    EcdsaSecp256k1Sha256,
}

impl KeyAlgorithm {
    /// Short name used in logs and health output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RsaPkcs1v15Sha256 => "rsa-pkcs1v15-sha256",
            Self::EcdsaP256Sha256 => "ecdsa-p256-sha256",
            Self::EcdsaSecp256k1Sha256 => "ecdsa-secp256k1-sha256",
        }
    }
}

// =============================================================================
// PUBLIC KEYS
// =============================================================================

/// A verification key of one of the supported types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicKeyMaterial {
    /// RSA public key.
    Rsa(RsaPublicKey),
    /// P-256 verifying key.
    P256(p256::ecdsa::VerifyingKey),
    /// secp256k1 verifying key.
    Secp256k1(k256::ecdsa::VerifyingKey),
}

impl PublicKeyMaterial {
    /// Decode a DER SubjectPublicKeyInfo, dispatching on its algorithm OID.
    pub fn from_spki_der(der: &[u8]) -> Result<Self, CryptoError> {
        let spki = SubjectPublicKeyInfoRef::try_from(der)
            .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))?;
        let oid = spki.algorithm.oid;

        if oid == RSA_ENCRYPTION {
            return RsaPublicKey::from_public_key_der(der)
                .map(Self::Rsa)
                .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()));
        }

        if oid == EC_PUBLIC_KEY {
            let curve = spki
                .algorithm
                .parameters_oid()
                .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))?;
            if curve == CURVE_P256 {
                return p256::ecdsa::VerifyingKey::from_public_key_der(der)
                    .map(Self::P256)
                    .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()));
            }
            if curve == CURVE_SECP256K1 {
                return k256::ecdsa::VerifyingKey::from_public_key_der(der)
                    .map(Self::Secp256k1)
                    .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()));
            }
            return Err(CryptoError::UnsupportedKeyType(format!("EC curve {}", curve)));
        }

        Err(CryptoError::UnsupportedKeyType(format!("algorithm {}", oid)))
    }

    /// Algorithm this key verifies with.
    pub fn algorithm(&self) -> KeyAlgorithm {
        match self {
            Self::Rsa(_) => KeyAlgorithm::RsaPkcs1v15Sha256,
            Self::P256(_) => KeyAlgorithm::EcdsaP256Sha256,
            Self::Secp256k1(_) => KeyAlgorithm::EcdsaSecp256k1Sha256,
        }
    }

    /// DER SubjectPublicKeyInfo.
    pub fn to_spki_der(&self) -> Result<Vec<u8>, CryptoError> {
        let document = match self {
            Self::Rsa(key) => key.to_public_key_der(),
            Self::P256(key) => key.to_public_key_der(),
            Self::Secp256k1(key) => key.to_public_key_der(),
        }
        .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))?;
        Ok(document.as_bytes().to_vec())
    }

    /// PEM `PUBLIC KEY` text.
    pub fn to_pem(&self) -> Result<String, CryptoError> {
        match self {
            Self::Rsa(key) => key.to_public_key_pem(LineEnding::LF),
            Self::P256(key) => key.to_public_key_pem(LineEnding::LF),
            Self::Secp256k1(key) => key.to_public_key_pem(LineEnding::LF),
        }
        .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))
    }

    /// Verify `signature` over `digest`.
    ///
    /// Returns `false` for any mismatch or undecodable signature; never panics.
    pub fn verify_digest(&self, digest: &ArtifactHash, signature: &[u8]) -> bool {
        match self {
            Self::Rsa(key) => verify_rsa(key, digest, signature),
            Self::P256(key) => verify_p256(key, digest, signature),
            Self::Secp256k1(key) => verify_secp256k1(key, digest, signature),
        }
    }
}

fn verify_rsa(key: &RsaPublicKey, digest: &ArtifactHash, signature: &[u8]) -> bool {
    key.verify(Pkcs1v15Sign::new::<Sha256>(), digest.as_bytes(), signature)
        .is_ok()
}

fn verify_p256(key: &p256::ecdsa::VerifyingKey, digest: &ArtifactHash, signature: &[u8]) -> bool {
    use p256::ecdsa::signature::hazmat::PrehashVerifier;
    use p256::ecdsa::Signature;

    let sig = Signature::from_der(signature).or_else(|_| Signature::from_slice(signature));
    match sig {
        Ok(sig) => key.verify_prehash(digest.as_bytes(), &sig).is_ok(),
        Err(_) => false,
    }
}

fn verify_secp256k1(
    key: &k256::ecdsa::VerifyingKey,
    digest: &ArtifactHash,
    signature: &[u8],
) -> bool {
    use k256::ecdsa::signature::hazmat::PrehashVerifier;
    use k256::ecdsa::Signature;

    let sig = Signature::from_der(signature).or_else(|_| Signature::from_slice(signature));
    match sig {
        Ok(sig) => key.verify_prehash(digest.as_bytes(), &sig).is_ok(),
        Err(_) => false,
    }
}

/// A parsed public key plus the certificate subject when it came from one.
#[derive(Debug, Clone)]
pub struct ParsedPublicKey {
    /// The verification key.
    pub key: PublicKeyMaterial,
    /// RFC 4514 subject of the certificate, if the input was a certificate.
    pub certificate_subject: Option<String>,
}

/// Parse a certificate (PEM), a public key (PEM) or hex-encoded SPKI DER.
pub fn parse_public_key(text: &str) -> Result<ParsedPublicKey, CryptoError> {
    let trimmed = text.trim();

    if trimmed.contains("-----BEGIN CERTIFICATE-----") {
        let cert = Certificate::from_pem(trimmed.as_bytes())
            .map_err(|e| CryptoError::InvalidPublicKey(format!("certificate: {}", e)))?;
        let spki_der = cert
            .tbs_certificate
            .subject_public_key_info
            .to_der()
            .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))?;
        return Ok(ParsedPublicKey {
            key: PublicKeyMaterial::from_spki_der(&spki_der)?,
            certificate_subject: Some(cert.tbs_certificate.subject.to_string()),
        });
    }

    if trimmed.contains("-----BEGIN") {
        let (label, document) = Document::from_pem(trimmed)
            .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))?;
        if label != "PUBLIC KEY" {
            return Err(CryptoError::UnsupportedKeyType(format!("PEM label {}", label)));
        }
        return Ok(ParsedPublicKey {
            key: PublicKeyMaterial::from_spki_der(document.as_bytes())?,
            certificate_subject: None,
        });
    }

    let der = hex::decode(trimmed).map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))?;
    Ok(ParsedPublicKey {
        key: PublicKeyMaterial::from_spki_der(&der)?,
        certificate_subject: None,
    })
}

// =============================================================================
// PRIVATE KEYS
// =============================================================================

/// A signing key of one of the supported types.
pub enum PrivateKeyMaterial {
    /// RSA private key.
    Rsa(Box<RsaPrivateKey>),
    /// P-256 signing key.
    P256(p256::ecdsa::SigningKey),
    /// secp256k1 signing key.
    Secp256k1(k256::ecdsa::SigningKey),
}

impl std::fmt::Debug for PrivateKeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material.
        write!(f, "PrivateKeyMaterial({})", self.algorithm().as_str())
    }
}

impl PrivateKeyMaterial {
    /// Fresh random P-256 key, for keyless (ephemeral) signing.
    pub fn generate_ephemeral() -> Self {
        Self::P256(p256::ecdsa::SigningKey::random(&mut rand::thread_rng()))
    }

    /// Load a PEM private key, decrypting it with `password` if needed.
    pub fn from_pem(pem: &str, password: Option<&str>) -> Result<Self, CryptoError> {
        let (label, document) = SecretDocument::from_pem(pem)
            .map_err(|e| CryptoError::InvalidPrivateKey(e.to_string()))?;

        match label {
            "PRIVATE KEY" => Self::from_pkcs8_der(document.as_bytes()),
            "ENCRYPTED PRIVATE KEY" => {
                let password = password.ok_or(CryptoError::PasswordRequired)?;
                let encrypted = pkcs8::EncryptedPrivateKeyInfo::try_from(document.as_bytes())
                    .map_err(|e| CryptoError::InvalidPrivateKey(e.to_string()))?;
                let decrypted = encrypted
                    .decrypt(password)
                    .map_err(|e| CryptoError::InvalidPrivateKey(format!("decryption: {}", e)))?;
                Self::from_pkcs8_der(decrypted.as_bytes())
            }
            "RSA PRIVATE KEY" => {
                use rsa::pkcs1::DecodeRsaPrivateKey;
                RsaPrivateKey::from_pkcs1_der(document.as_bytes())
                    .map(|key| Self::Rsa(Box::new(key)))
                    .map_err(|e| CryptoError::InvalidPrivateKey(e.to_string()))
            }
            "EC PRIVATE KEY" => {
                if let Ok(key) = p256::SecretKey::from_sec1_der(document.as_bytes()) {
                    return Ok(Self::P256(key.into()));
                }
                k256::SecretKey::from_sec1_der(document.as_bytes())
                    .map(|key| Self::Secp256k1(key.into()))
                    .map_err(|_| CryptoError::UnsupportedKeyType("EC key on unsupported curve".into()))
            }
            other => Err(CryptoError::UnsupportedKeyType(format!("PEM label {}", other))),
        }
    }

    /// Decode an unencrypted PKCS#8 DER document.
    pub fn from_pkcs8_der(der: &[u8]) -> Result<Self, CryptoError> {
        let info = pkcs8::PrivateKeyInfo::try_from(der)
            .map_err(|e| CryptoError::InvalidPrivateKey(e.to_string()))?;
        let oid = info.algorithm.oid;

        if oid == RSA_ENCRYPTION {
            return RsaPrivateKey::from_pkcs8_der(der)
                .map(|key| Self::Rsa(Box::new(key)))
                .map_err(|e| CryptoError::InvalidPrivateKey(e.to_string()));
        }

        if oid == EC_PUBLIC_KEY {
            let curve = info
                .algorithm
                .parameters_oid()
                .map_err(|e| CryptoError::InvalidPrivateKey(e.to_string()))?;
            if curve == CURVE_P256 {
                return p256::ecdsa::SigningKey::from_pkcs8_der(der)
                    .map(Self::P256)
                    .map_err(|e| CryptoError::InvalidPrivateKey(e.to_string()));
            }
            if curve == CURVE_SECP256K1 {
                return k256::ecdsa::SigningKey::from_pkcs8_der(der)
                    .map(Self::Secp256k1)
                    .map_err(|e| CryptoError::InvalidPrivateKey(e.to_string()));
            }
            return Err(CryptoError::UnsupportedKeyType(format!("EC curve {}", curve)));
        }

        Err(CryptoError::UnsupportedKeyType(format!("algorithm {}", oid)))
    }

    /// Algorithm this key signs with.
    pub fn algorithm(&self) -> KeyAlgorithm {
        match self {
            Self::Rsa(_) => KeyAlgorithm::RsaPkcs1v15Sha256,
            Self::P256(_) => KeyAlgorithm::EcdsaP256Sha256,
            Self::Secp256k1(_) => KeyAlgorithm::EcdsaSecp256k1Sha256,
        }
    }

    /// Matching public key.
    pub fn public_key(&self) -> PublicKeyMaterial {
        match self {
            Self::Rsa(key) => PublicKeyMaterial::Rsa(key.to_public_key()),
            Self::P256(key) => PublicKeyMaterial::P256(key.verifying_key().clone()),
            Self::Secp256k1(key) => PublicKeyMaterial::Secp256k1(key.verifying_key().clone()),
        }
    }

    /// Sign `digest` as a prehash: the digest is the message hash, not
    /// hashed again. ECDSA signatures are DER-encoded.
    pub fn sign_digest(&self, digest: &ArtifactHash) -> Result<Vec<u8>, CryptoError> {
        match self {
            Self::Rsa(key) => key
                .sign(Pkcs1v15Sign::new::<Sha256>(), digest.as_bytes())
                .map_err(|e| CryptoError::SigningFailed(e.to_string())),
            Self::P256(key) => {
                use p256::ecdsa::signature::hazmat::PrehashSigner;
                let sig: p256::ecdsa::Signature = key
                    .sign_prehash(digest.as_bytes())
                    .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;
                Ok(sig.to_der().as_bytes().to_vec())
            }
            Self::Secp256k1(key) => {
                use k256::ecdsa::signature::hazmat::PrehashSigner;
                let sig: k256::ecdsa::Signature = key
                    .sign_prehash(digest.as_bytes())
                    .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;
                Ok(sig.to_der().as_bytes().to_vec())
            }
        }
    }
}
