//! Request handlers. Verification handlers always answer 200 with a result
//! body; only signing can fail with an error status.

use super::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared_types::{ArtifactSignResponse, VerifyChainResult, VerifyResponse};
use tl_01_guardrail::GuardrailStats;
use tl_05_verification::{SignRequest, VerificationError, VerifyChainRequest, VerifyRequest};
use tracing::warn;

/// JSON error body.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

pub struct ApiError(VerificationError);

impl From<VerificationError> for ApiError {
    fn from(err: VerificationError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match &self.0 {
            VerificationError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            VerificationError::Signing(e) if e.is_unavailable() => {
                (StatusCode::SERVICE_UNAVAILABLE, "signing_unavailable")
            }
            VerificationError::Log(_) => (StatusCode::BAD_GATEWAY, "transparency_log_error"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "signing_failed"),
        };
        warn!(status = status.as_u16(), error = %self.0, "[runtime] Sign request failed");
        (
            status,
            Json(ErrorBody {
                error,
                message: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

pub async fn sign(
    State(state): State<AppState>,
    Json(request): Json<SignRequest>,
) -> Result<Json<ArtifactSignResponse>, ApiError> {
    Ok(Json(state.container.signing.sign(request).await?))
}

pub async fn verify(
    State(state): State<AppState>,
    Json(request): Json<VerifyRequest>,
) -> Json<VerifyResponse> {
    Json(state.container.verification.verify_response(&request).await)
}

pub async fn verify_chain(
    State(state): State<AppState>,
    Json(request): Json<VerifyChainRequest>,
) -> Json<VerifyChainResult> {
    Json(state.container.verification.verify_chain(&request).await)
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub signing_backend: &'static str,
    pub transparency_log: &'static str,
    pub evidence_in_flight: usize,
    pub guardrail: GuardrailStats,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let container = &state.container;
    Json(HealthResponse {
        status: "ok",
        signing_backend: container.signer.kind().as_str(),
        transparency_log: container.log.kind(),
        evidence_in_flight: container.dispatcher.in_flight(),
        guardrail: container.guardrail_stats(),
    })
}
