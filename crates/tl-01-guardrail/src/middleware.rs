//! Guardrail HTTP middleware.
//!
//! Every request through the layer is admitted or denied by the
//! [`RateLimitGuardrail`], produces exactly one `IntegrityDecision` for the
//! [`DecisionSink`], and gets `X-RateLimit-*` headers on the response.
//! Denials short-circuit with a 429 before the inner service is called.

use crate::domain::{AdmissionOutcome, AdmissionResult, RETRY_AFTER_SECS};
use crate::ports::DecisionSink;
use crate::service::{RateLimitGuardrail, GUARDRAIL_NAME};
use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{HeaderMap, HeaderValue, Request, StatusCode},
    response::Response,
};
use shared_types::{DecisionOutcome, IntegrityDecision, TraceContext};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tower::{Layer, Service};

/// Bucket for requests whose origin cannot be determined.
pub const UNKNOWN_CLIENT: &str = "unknown";

const HEADER_LIMIT: &str = "x-ratelimit-limit";
const HEADER_REMAINING: &str = "x-ratelimit-remaining";
const HEADER_RESET: &str = "x-ratelimit-reset";

/// Guardrail layer
#[derive(Clone)]
pub struct GuardrailLayer {
    guardrail: Arc<RateLimitGuardrail>,
    sink: Arc<dyn DecisionSink>,
    service_name: Arc<str>,
}

impl GuardrailLayer {
    pub fn new(
        guardrail: Arc<RateLimitGuardrail>,
        sink: Arc<dyn DecisionSink>,
        service_name: impl Into<String>,
    ) -> Self {
        Self {
            guardrail,
            sink,
            service_name: Arc::from(service_name.into()),
        }
    }

    pub fn guardrail(&self) -> Arc<RateLimitGuardrail> {
        Arc::clone(&self.guardrail)
    }
}

impl<S> Layer<S> for GuardrailLayer {
    type Service = GuardrailService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        GuardrailService {
            inner,
            guardrail: Arc::clone(&self.guardrail),
            sink: Arc::clone(&self.sink),
            service_name: Arc::clone(&self.service_name),
        }
    }
}

/// Guardrail service
#[derive(Clone)]
pub struct GuardrailService<S> {
    inner: S,
    guardrail: Arc<RateLimitGuardrail>,
    sink: Arc<dyn DecisionSink>,
    service_name: Arc<str>,
}

impl<S> Service<Request<Body>> for GuardrailService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let guardrail = Arc::clone(&self.guardrail);
        let sink = Arc::clone(&self.sink);
        let service_name = Arc::clone(&self.service_name);
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let client = extract_client_id(&req);
            let trace = TraceContext::from_header_or_generate(
                req.headers()
                    .get("traceparent")
                    .and_then(|h| h.to_str().ok()),
            );

            let result = guardrail.admit_now(&client);

            let decision = build_decision(&service_name, &client, &req, &result, &trace);
            sink.submit(decision);

            if !result.allowed {
                return Ok(rate_limit_response(&result, &trace));
            }

            let mut response = inner.call(req).await?;
            insert_rate_limit_headers(response.headers_mut(), &result);
            Ok(response)
        })
    }
}

fn build_decision(
    service_name: &str,
    client: &str,
    req: &Request<Body>,
    result: &AdmissionResult,
    trace: &TraceContext,
) -> IntegrityDecision {
    let outcome = match result.outcome {
        AdmissionOutcome::Denied(_) => DecisionOutcome::Denied,
        AdmissionOutcome::ShadowViolation(_) => DecisionOutcome::Degraded,
        _ => DecisionOutcome::Allowed,
    };

    IntegrityDecision::new(
        service_name,
        GUARDRAIL_NAME,
        outcome,
        result.outcome.reason(),
        trace,
    )
    .with_metadata("client_id", client)
    .with_metadata("method", req.method().as_str())
    .with_metadata("path", req.uri().path())
    .with_metadata("limit", result.limit)
    .with_metadata("remaining", result.remaining)
}

/// Client identifier: first `X-Forwarded-For` hop, then `X-Real-IP`, then
/// the socket address, else [`UNKNOWN_CLIENT`].
pub fn extract_client_id<B>(req: &Request<B>) -> String {
    if let Some(forwarded) = req.headers().get("x-forwarded-for") {
        if let Ok(forwarded_str) = forwarded.to_str() {
            if let Some(first_ip) = forwarded_str.split(',').next() {
                if let Ok(ip) = first_ip.trim().parse::<IpAddr>() {
                    return ip.to_string();
                }
            }
        }
    }

    if let Some(real_ip) = req.headers().get("x-real-ip") {
        if let Ok(real_ip_str) = real_ip.to_str() {
            if let Ok(ip) = real_ip_str.trim().parse::<IpAddr>() {
                return ip.to_string();
            }
        }
    }

    if let Some(connect_info) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
        return connect_info.0.ip().to_string();
    }

    UNKNOWN_CLIENT.to_string()
}

fn insert_rate_limit_headers(headers: &mut HeaderMap, result: &AdmissionResult) {
    headers.insert(HEADER_LIMIT, HeaderValue::from(result.limit));
    headers.insert(HEADER_REMAINING, HeaderValue::from(result.remaining));
    headers.insert(HEADER_RESET, HeaderValue::from(result.reset_at));
}

/// 429 with retry hint and the trace id of the emitted decision.
fn rate_limit_response(result: &AdmissionResult, trace: &TraceContext) -> Response {
    let body = serde_json::json!({
        "error": "rate_limit_exceeded",
        "message": format!(
            "Rate limit of {} requests per minute exceeded ({})",
            result.limit,
            result.outcome.reason()
        ),
        "trace_id": trace.trace_id,
        "retry_after": RETRY_AFTER_SECS,
    });

    let mut response = Response::new(Body::from(serde_json::to_vec(&body).unwrap_or_default()));
    *response.status_mut() = StatusCode::TOO_MANY_REQUESTS;
    let headers = response.headers_mut();
    headers.insert(
        axum::http::header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    headers.insert(
        axum::http::header::RETRY_AFTER,
        HeaderValue::from(RETRY_AFTER_SECS),
    );
    insert_rate_limit_headers(headers, result);
    response
}
