//! # Runtime Flow
//!
//! The assembled service: configuration from environment-style variables,
//! the container, and the HTTP router, driven end to end.

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use serde_json::{json, Value};
    use tokio::runtime::Handle;
    use tower::ServiceExt;

    use shared_types::{DecisionOutcome, VerificationStatus};
    use tl_04_evidence::EvidenceStore;
    use trust_runtime::{build_router, TrustConfig, TrustContainer};

    const SBOM: &str = r#"{"bomFormat":"CycloneDX","specVersion":"1.5","components":[]}"#;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn container(dir: &tempfile::TempDir, vars: &[(&str, &str)]) -> Arc<TrustContainer> {
        let mut vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        vars.insert(
            "TL_EVIDENCE_DIR".into(),
            dir.path().join("evidence").display().to_string(),
        );
        vars.insert(
            "TL_ARTIFACT_ROOT".into(),
            dir.path().join("artifacts").display().to_string(),
        );
        let config = TrustConfig::from_lookup(|k| vars.get(k).cloned()).unwrap();
        Arc::new(TrustContainer::build(config, Handle::current()).unwrap())
    }

    async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .header("x-forwarded-for", "192.0.2.44")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 1 << 20)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    // =============================================================================
    // END-TO-END
    // =============================================================================

    #[tokio::test]
    async fn test_sign_countersign_verify_chain_over_http() {
        let dir = tempfile::tempdir().unwrap();
        let container = container(&dir, &[("TL_SERVICE_NAME", "ledger-e2e")]);
        let app = build_router(Arc::clone(&container));

        std::fs::create_dir_all(dir.path().join("artifacts")).unwrap();
        std::fs::write(dir.path().join("artifacts/sbom.json"), SBOM).unwrap();

        let (status, inner) = post(
            &app,
            "/v1/sign",
            json!({"artifact": SBOM, "artifact_type": "sbom", "subject": "builder"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let inner_signature = inner["signature"].as_str().unwrap().to_string();

        let outer = container
            .signing
            .countersign(&inner_signature, "release-gate")
            .await
            .unwrap();

        let (status, result) = post(
            &app,
            "/v1/verify-chain",
            json!({
                "artifact_locations": ["sbom.json"],
                "signatures": {
                    "inner": {"signature": inner_signature},
                    "outer": {"signature": outer.signature, "certificate": outer.certificate},
                },
                "sigstore_entry_id": inner["entry_id"],
                "tier": "verified",
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(result["chain_verified"], true, "{result}");
        assert_eq!(result["non_repudiation"], true);
        assert_eq!(result["signer_inner"], "builder");
        assert_eq!(result["signer_outer"], "release-gate");
        assert_eq!(result["transparency_index"], inner["transparency_entry"]["index"]);

        // Both guarded calls left evidence behind, stamped with the service name.
        assert_eq!(container.dispatcher.drain(Duration::from_secs(10)).await, 0);
        let ids = container.evidence_store.list_ids().unwrap();
        assert_eq!(ids.len(), 2);
        for id in &ids {
            let evidence = container.evidence_store.load(id).unwrap().unwrap();
            assert_eq!(evidence.verification_status, VerificationStatus::Signed);
            assert_eq!(evidence.decision.decision, DecisionOutcome::Allowed);
            assert_eq!(evidence.decision.service, "ledger-e2e");
        }
    }

    #[tokio::test]
    async fn test_verify_reports_tampering_over_http() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(container(&dir, &[]));

        let (_, signed) = post(
            &app,
            "/v1/sign",
            json!({"artifact": SBOM, "artifact_type": "sbom", "subject": "builder"}),
        )
        .await;

        let (status, verified) = post(
            &app,
            "/v1/verify",
            json!({
                "artifact": SBOM.replace("1.5", "1.6"),
                "signature": signed["signature"],
                "certificate": signed["certificate"],
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(verified["valid"], false);
        assert!(verified["reason"].is_string());
    }

    #[tokio::test]
    async fn test_shadow_mode_from_environment() {
        let dir = tempfile::tempdir().unwrap();
        let container = container(
            &dir,
            &[
                ("TL_RATE_LIMIT_PER_MINUTE", "1"),
                ("TL_RATE_LIMIT_BURST", "1"),
                ("TL_RATE_LIMIT_SHADOW_MODE", "true"),
            ],
        );
        let app = build_router(Arc::clone(&container));
        let body = json!({"artifact": "x", "signature": "mock-sig-00"});

        for _ in 0..3 {
            let (status, _) = post(&app, "/v1/verify", body.clone()).await;
            assert_eq!(status, StatusCode::OK);
        }
        assert_eq!(container.guardrail_stats().shadow_violations, 2);
        assert_eq!(container.guardrail_stats().denials, 0);

        container.dispatcher.drain(Duration::from_secs(10)).await;
        let degraded = container
            .evidence_store
            .list_ids()
            .unwrap()
            .iter()
            .filter_map(|id| container.evidence_store.load(id).unwrap())
            .filter(|e| e.decision.decision == DecisionOutcome::Degraded)
            .count();
        assert_eq!(degraded, 2);
    }

    #[tokio::test]
    async fn test_whitelisted_client_is_never_limited() {
        let dir = tempfile::tempdir().unwrap();
        let container = container(
            &dir,
            &[
                ("TL_RATE_LIMIT_PER_MINUTE", "1"),
                ("TL_RATE_LIMIT_BURST", "1"),
                ("TL_RATE_LIMIT_WHITELIST", "192.0.2.0/24"),
            ],
        );
        let app = build_router(Arc::clone(&container));
        let body = json!({"artifact": "x", "signature": "mock-sig-00"});

        for _ in 0..4 {
            let (status, _) = post(&app, "/v1/verify", body.clone()).await;
            assert_eq!(status, StatusCode::OK);
        }
        assert_eq!(container.guardrail_stats().denials, 0);
    }
}
