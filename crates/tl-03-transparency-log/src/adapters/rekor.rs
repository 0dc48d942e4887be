//! Rekor HTTP client.
//!
//! Submits `hashedrekord` v0.0.1 entries and reads entries, proofs and
//! hash-index results back. Every request carries a timeout; transient
//! failures are retried by the [`RetryPolicy`].

use crate::domain::{LogError, RetryPolicy};
use crate::ports::{normalize_hash, TransparencyLog};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{Client, Response};
use serde::Deserialize;
use shared_crypto::{decode_signature, signer_identity};
use shared_types::{InclusionProof, LogReceipt, LogSubmission, TransparencyLogEntry};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct RekorConfig {
    pub base_url: String,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for RekorConfig {
    fn default() -> Self {
        Self {
            base_url: "https://rekor.sigstore.dev".to_string(),
            request_timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(3),
            retry: RetryPolicy::default(),
        }
    }
}

pub struct RekorTransparencyLog {
    client: Client,
    base_url: String,
    retry: RetryPolicy,
}

// --- Rekor wire types ---------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RekorLogEntry {
    body: String,
    integrated_time: i64,
    log_index: u64,
    #[serde(default)]
    verification: Option<RekorVerification>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RekorVerification {
    #[serde(default)]
    inclusion_proof: Option<RekorInclusionProof>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RekorInclusionProof {
    hashes: Vec<String>,
    log_index: u64,
    root_hash: String,
    tree_size: u64,
}

impl From<RekorInclusionProof> for InclusionProof {
    fn from(p: RekorInclusionProof) -> Self {
        InclusionProof {
            tree_size: p.tree_size,
            leaf_index: p.log_index,
            hashes: p.hashes,
            root_hash: p.root_hash,
        }
    }
}

#[derive(Debug, Deserialize)]
struct HashedRekordBody {
    spec: HashedRekordSpec,
}

#[derive(Debug, Deserialize)]
struct HashedRekordSpec {
    signature: HashedRekordSignature,
    data: HashedRekordData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HashedRekordSignature {
    content: String,
    public_key: HashedRekordKey,
}

#[derive(Debug, Deserialize)]
struct HashedRekordKey {
    content: String,
}

#[derive(Debug, Deserialize)]
struct HashedRekordData {
    hash: HashedRekordHash,
}

#[derive(Debug, Deserialize)]
struct HashedRekordHash {
    value: String,
}

// -----------------------------------------------------------------------------

impl RekorTransparencyLog {
    pub fn new(config: RekorConfig) -> Result<Self, LogError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| LogError::Connection(e.to_string()))?;

        info!(base_url = %config.base_url, "[tl-03] Rekor transparency log client configured");

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            retry: config.retry,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Build the `hashedrekord` request body.
    fn proposed_entry(submission: &LogSubmission) -> Result<serde_json::Value, LogError> {
        let public_key = submission
            .certificate
            .as_deref()
            .ok_or_else(|| LogError::InvalidSubmission("public key or certificate required".into()))?;
        let signature = decode_signature(&submission.signature)
            .map_err(|e| LogError::InvalidSubmission(e.to_string()))?;

        Ok(serde_json::json!({
            "apiVersion": "0.0.1",
            "kind": "hashedrekord",
            "spec": {
                "signature": {
                    "content": STANDARD.encode(signature),
                    "publicKey": { "content": STANDARD.encode(public_key.as_bytes()) },
                },
                "data": {
                    "hash": {
                        "algorithm": "sha256",
                        "value": normalize_hash(&submission.artifact_hash),
                    }
                }
            }
        }))
    }

    async fn check_status(response: Response) -> Result<Response, LogError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(LogError::Http {
            status: status.as_u16(),
            body,
        })
    }

    /// Fetch the raw `{uuid: entry}` map for one entry.
    async fn fetch_entry(&self, entry_id: &str) -> Result<HashMap<String, RekorLogEntry>, LogError> {
        let url = self.url(&format!("/api/v1/log/entries/{}", entry_id));
        self.retry
            .run("get", || async {
                let response = self.client.get(&url).send().await?;
                let response = Self::check_status(response).await?;
                Ok(response.json::<HashMap<String, RekorLogEntry>>().await?)
            })
            .await
    }

    /// Turn a Rekor entry into the shared record, decoding the body.
    fn to_entry(entry_id: &str, raw: RekorLogEntry) -> Result<TransparencyLogEntry, LogError> {
        let body_json = STANDARD
            .decode(raw.body.as_bytes())
            .map_err(|e| LogError::InvalidResponse(format!("entry body: {}", e)))?;
        let body: HashedRekordBody = serde_json::from_slice(&body_json)
            .map_err(|e| LogError::InvalidResponse(format!("entry body: {}", e)))?;

        let signature = STANDARD
            .decode(body.spec.signature.content.as_bytes())
            .map_err(|e| LogError::InvalidResponse(format!("signature: {}", e)))?;
        let public_key = STANDARD
            .decode(body.spec.signature.public_key.content.as_bytes())
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .ok_or_else(|| LogError::InvalidResponse("public key is not PEM text".into()))?;

        let signer = signer_identity(&public_key).unwrap_or_else(|e| {
            debug!(error = %e, "[tl-03] Could not derive signer from Rekor public key");
            shared_types::UNKNOWN_SIGNER.to_string()
        });

        Ok(TransparencyLogEntry {
            entry_id: entry_id.to_string(),
            index: raw.log_index,
            artifact_hash: normalize_hash(&body.spec.data.hash.value),
            signer,
            signature: hex::encode(signature),
            certificate: Some(public_key),
            timestamp: raw.integrated_time,
            inclusion_proof: raw
                .verification
                .and_then(|v| v.inclusion_proof)
                .map(InclusionProof::from),
        })
    }

    async fn get_entry(&self, entry_id: &str) -> Result<TransparencyLogEntry, LogError> {
        let entries = self.fetch_entry(entry_id).await?;
        let (uuid, raw) = entries
            .into_iter()
            .next()
            .ok_or_else(|| LogError::InvalidResponse("empty entry response".into()))?;
        Self::to_entry(&uuid, raw)
    }
}

#[async_trait]
impl TransparencyLog for RekorTransparencyLog {
    fn kind(&self) -> &'static str {
        "rekor"
    }

    async fn submit(&self, submission: LogSubmission) -> Result<LogReceipt, LogError> {
        let body = Self::proposed_entry(&submission)?;
        let url = self.url("/api/v1/log/entries");

        let entries = self
            .retry
            .run("submit", || async {
                let response = self.client.post(&url).json(&body).send().await?;
                let response = Self::check_status(response).await?;
                Ok(response.json::<HashMap<String, RekorLogEntry>>().await?)
            })
            .await
            .map_err(|e| {
                warn!(error = %e, "[tl-03] Rekor submission failed");
                e
            })?;

        let (entry_id, raw) = entries
            .into_iter()
            .next()
            .ok_or_else(|| LogError::InvalidResponse("empty submission response".into()))?;

        info!(
            entry_id = %entry_id,
            log_index = raw.log_index,
            "[tl-03] Entry submitted to Rekor"
        );

        Ok(LogReceipt {
            entry_id,
            index: raw.log_index,
            integrated_time: raw.integrated_time,
        })
    }

    async fn get(&self, entry_id: &str) -> Option<TransparencyLogEntry> {
        match self.get_entry(entry_id).await {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!(entry_id, error = %e, "[tl-03] Rekor entry lookup failed");
                None
            }
        }
    }

    async fn search_by_hash(&self, artifact_hash: &str) -> Vec<TransparencyLogEntry> {
        let url = self.url("/api/v1/index/retrieve");
        let query = serde_json::json!({ "hash": format!("sha256:{}", normalize_hash(artifact_hash)) });

        let uuids = self
            .retry
            .run("search", || async {
                let response = self.client.post(&url).json(&query).send().await?;
                let response = Self::check_status(response).await?;
                Ok(response.json::<Vec<String>>().await?)
            })
            .await;

        let uuids = match uuids {
            Ok(uuids) => uuids,
            Err(e) => {
                debug!(error = %e, "[tl-03] Rekor hash search failed");
                return Vec::new();
            }
        };

        let mut entries = Vec::with_capacity(uuids.len());
        for uuid in uuids {
            if let Some(entry) = self.get(&uuid).await {
                entries.push(entry);
            }
        }
        entries.sort_by_key(|e| e.index);
        entries
    }

    async fn inclusion_proof(
        &self,
        entry_id: &str,
        tree_size: Option<u64>,
    ) -> Option<InclusionProof> {
        let proof = self.get(entry_id).await?.inclusion_proof?;
        match tree_size {
            // Rekor only serves proofs against its current tree.
            Some(size) if size != proof.tree_size => {
                debug!(
                    entry_id,
                    requested = size,
                    available = proof.tree_size,
                    "[tl-03] Historical tree size not available from Rekor"
                );
                None
            }
            _ => Some(proof),
        }
    }
}
