//! # HTTP Surface
//!
//! | Route | Guarded | Body → Response |
//! |-------|---------|-----------------|
//! | `POST /v1/sign` | yes | `SignRequest` → `ArtifactSignResponse` |
//! | `POST /v1/verify` | yes | `VerifyRequest` → `VerifyResponse` |
//! | `POST /v1/verify-chain` | yes | `VerifyChainRequest` → `VerifyChainResult` |
//! | `GET /health` | no | backend kinds, in-flight evidence, guardrail stats |
//!
//! Guarded routes pass through the rate-limit layer, which feeds every
//! decision to the evidence dispatcher.

pub mod handlers;

use crate::container::TrustContainer;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tl_01_guardrail::{DecisionSink, GuardrailLayer};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub container: Arc<TrustContainer>,
}

pub fn build_router(container: Arc<TrustContainer>) -> Router {
    let sink: Arc<dyn DecisionSink> = container.dispatcher.clone();
    let guardrail = GuardrailLayer::new(
        Arc::clone(&container.guardrail),
        sink,
        container.config.server.service_name.clone(),
    );
    let state = AppState { container };

    Router::new()
        .route("/v1/sign", post(handlers::sign))
        .route("/v1/verify", post(handlers::verify))
        .route("/v1/verify-chain", post(handlers::verify_chain))
        .layer(guardrail)
        // Added after the layer, so not rate limited.
        .route("/health", get(handlers::health))
        .with_state(state)
}
