//! # Runtime Configuration
//!
//! Defaults, overridden from `TL_*` environment variables, then validated.
//! Unparseable values are rejected rather than silently ignored.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tl_01_guardrail::{GuardrailConfig, GuardrailError, Whitelist};
use tl_02_signing::BackendKind;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var}={value:?} is invalid: {reason}")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },

    /// Production signing with keyless disabled needs a key.
    #[error("Production signing backend needs TL_SIGNING_KEY_PATH when TL_KEYLESS_SIGNING=false")]
    MissingSigningKey,

    #[error("Signing timeout must be at least one second")]
    ZeroSigningTimeout,

    #[error(transparent)]
    Guardrail(#[from] GuardrailError),
}

/// Complete runtime configuration.
#[derive(Debug, Clone, Default)]
pub struct TrustConfig {
    pub server: ServerConfig,
    pub guardrail: GuardrailSettings,
    pub signing: SigningConfig,
    pub transparency: TransparencyConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub http_addr: SocketAddr,
    /// `service` field stamped into decisions.
    pub service_name: String,
    /// How long shutdown waits for in-flight evidence.
    pub drain_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            service_name: "trust-ledger".to_string(),
            drain_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GuardrailSettings {
    pub requests_per_minute: u32,
    pub burst_limit: u32,
    pub shadow_mode: bool,
    /// Comma-separated IPs and CIDR ranges.
    pub whitelist: String,
}

impl Default for GuardrailSettings {
    fn default() -> Self {
        let defaults = GuardrailConfig::default();
        Self {
            requests_per_minute: defaults.requests_per_minute,
            burst_limit: defaults.burst_limit,
            shadow_mode: defaults.shadow_mode,
            whitelist: String::new(),
        }
    }
}

impl GuardrailSettings {
    pub fn to_guardrail_config(&self) -> Result<GuardrailConfig, ConfigError> {
        let config = GuardrailConfig {
            requests_per_minute: self.requests_per_minute,
            burst_limit: self.burst_limit,
            shadow_mode: self.shadow_mode,
            whitelist: Whitelist::parse(&self.whitelist)?,
        };
        config.validate()?;
        Ok(config)
    }
}

#[derive(Clone)]
pub struct SigningConfig {
    pub backend: BackendKind,
    pub key_path: Option<PathBuf>,
    pub key_password: Option<String>,
    pub cert_path: Option<PathBuf>,
    pub keyless: bool,
    pub timeout: Duration,
}

// Hand-written so the key password never reaches a log line.
impl std::fmt::Debug for SigningConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningConfig")
            .field("backend", &self.backend)
            .field("key_path", &self.key_path)
            .field("key_password", &self.key_password.as_ref().map(|_| "<redacted>"))
            .field("cert_path", &self.cert_path)
            .field("keyless", &self.keyless)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Mock,
            key_path: None,
            key_password: None,
            cert_path: None,
            keyless: true,
            timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TransparencyConfig {
    pub rekor_url: String,
}

impl Default for TransparencyConfig {
    fn default() -> Self {
        Self {
            rekor_url: "https://rekor.sigstore.dev".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub evidence_dir: PathBuf,
    pub artifact_root: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            evidence_dir: PathBuf::from("./data/evidence"),
            artifact_root: PathBuf::from("./data/artifacts"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// `EnvFilter` directive.
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl TrustConfig {
    /// Defaults overridden from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Defaults overridden through `lookup` (variable name → value).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let env = Env(&lookup);

        if let Some(v) = env.parse("TL_RATE_LIMIT_PER_MINUTE")? {
            config.guardrail.requests_per_minute = v;
        }
        if let Some(v) = env.parse("TL_RATE_LIMIT_BURST")? {
            config.guardrail.burst_limit = v;
        }
        if let Some(v) = env.flag("TL_RATE_LIMIT_SHADOW_MODE")? {
            config.guardrail.shadow_mode = v;
        }
        if let Some(v) = env.get("TL_RATE_LIMIT_WHITELIST") {
            config.guardrail.whitelist = v;
        }

        if let Some(v) = env.parse("TL_SIGNING_BACKEND")? {
            config.signing.backend = v;
        }
        config.signing.key_path = env.get("TL_SIGNING_KEY_PATH").map(PathBuf::from);
        config.signing.key_password = env.get("TL_SIGNING_KEY_PASSWORD");
        config.signing.cert_path = env.get("TL_SIGNING_CERT_PATH").map(PathBuf::from);
        if let Some(v) = env.flag("TL_KEYLESS_SIGNING")? {
            config.signing.keyless = v;
        }
        if let Some(secs) = env.parse::<u64>("TL_SIGNING_TIMEOUT_SECS")? {
            config.signing.timeout = Duration::from_secs(secs);
        }

        if let Some(v) = env.get("TL_REKOR_URL") {
            config.transparency.rekor_url = v;
        }

        if let Some(v) = env.get("TL_EVIDENCE_DIR") {
            config.storage.evidence_dir = PathBuf::from(v);
        }
        if let Some(v) = env.get("TL_ARTIFACT_ROOT") {
            config.storage.artifact_root = PathBuf::from(v);
        }

        if let Some(v) = env.parse("TL_HTTP_ADDR")? {
            config.server.http_addr = v;
        }
        if let Some(v) = env.get("TL_SERVICE_NAME") {
            config.server.service_name = v;
        }
        if let Some(secs) = env.parse::<u64>("TL_DRAIN_TIMEOUT_SECS")? {
            config.server.drain_timeout = Duration::from_secs(secs);
        }

        if let Some(v) = env.get("TL_LOG_LEVEL") {
            config.logging.level = v;
        }
        if let Some(v) = env.get("TL_LOG_FORMAT") {
            config.logging.json = v.eq_ignore_ascii_case("json");
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.guardrail.to_guardrail_config()?;
        if self.signing.timeout.is_zero() {
            return Err(ConfigError::ZeroSigningTimeout);
        }
        if self.signing.backend == BackendKind::Production
            && !self.signing.keyless
            && self.signing.key_path.is_none()
        {
            return Err(ConfigError::MissingSigningKey);
        }
        Ok(())
    }
}

/// Lookup helpers over an environment-like source. Blank values count as
/// unset.
struct Env<'a, F>(&'a F);

impl<F> Env<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, var: &str) -> Option<String> {
        (self.0)(var)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse<T>(&self, var: &'static str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.get(var)
            .map(|value| {
                value.parse::<T>().map_err(|e| ConfigError::InvalidValue {
                    var,
                    reason: e.to_string(),
                    value,
                })
            })
            .transpose()
    }

    fn flag(&self, var: &'static str) -> Result<Option<bool>, ConfigError> {
        self.get(var)
            .map(|value| match value.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(true),
                "0" | "false" | "no" | "off" => Ok(false),
                _ => Err(ConfigError::InvalidValue {
                    var,
                    value,
                    reason: "expected true or false".to_string(),
                }),
            })
            .transpose()
    }
}
