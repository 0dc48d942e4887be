//! # Evidence Flow
//!
//! Guardrail decisions flowing into persisted, signed evidence:
//!
//! ```text
//! request ─→ GuardrailLayer ─→ EvidenceDispatcher ─→ EvidenceGenerator
//!                                                    ├─ canonical hash
//!                                                    ├─ sign (backend)
//!                                                    ├─ record (log)
//!                                                    └─ dec_<id>.json
//! ```
//!
//! Each bundle on disk must be independently checkable: its content hash
//! recomputes from the stored decision, its signature verifies over that
//! hash, and its log entry carries a valid inclusion proof.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::post;
    use axum::Router;
    use tokio::runtime::Handle;
    use tower::ServiceExt;

    use shared_crypto::ArtifactHash;
    use shared_types::{
        content_hash, DecisionOutcome, SignedEvidence, VerificationStatus, FAILED_CONTENT_HASH,
    };
    use tl_01_guardrail::{DecisionSink, GuardrailConfig, GuardrailLayer, RateLimitGuardrail};
    use tl_02_signing::{
        BackendKind, MockSigningBackend, ProductionSigningBackend, SignatureBundle,
        SigningBackend, SigningError, SigningInput,
    };
    use tl_03_transparency_log::{entry_leaf_hash, InMemoryTransparencyLog, TransparencyLog};
    use tl_04_evidence::{
        EvidenceConfig, EvidenceDispatcher, EvidenceGenerator, EvidenceStore, FileEvidenceStore,
    };

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    struct Pipeline {
        _dir: tempfile::TempDir,
        signer: Arc<dyn SigningBackend>,
        log: Arc<InMemoryTransparencyLog>,
        store: Arc<FileEvidenceStore>,
        dispatcher: Arc<EvidenceDispatcher>,
        app: Router,
    }

    fn pipeline(signer: Arc<dyn SigningBackend>, config: GuardrailConfig) -> Pipeline {
        let dir = tempfile::tempdir().unwrap();
        let log = Arc::new(InMemoryTransparencyLog::new());
        let store = Arc::new(FileEvidenceStore::new(dir.path().join("evidence")));

        let generator = EvidenceGenerator::new(
            Arc::clone(&signer),
            store.clone(),
            EvidenceConfig {
                signing_timeout: Duration::from_millis(200),
                ..EvidenceConfig::default()
            },
        )
        .with_transparency_log(log.clone());
        let dispatcher = Arc::new(EvidenceDispatcher::new(
            Arc::new(generator),
            Handle::current(),
        ));

        let sink: Arc<dyn DecisionSink> = dispatcher.clone();
        let guardrail = Arc::new(RateLimitGuardrail::new(config).unwrap());
        let app = Router::new()
            .route("/v1/verify", post(|| async { "ok" }))
            .layer(GuardrailLayer::new(guardrail, sink, "verifier"));

        Pipeline {
            _dir: dir,
            signer,
            log,
            store,
            dispatcher,
            app,
        }
    }

    fn limited(limit: u32, burst: u32) -> GuardrailConfig {
        GuardrailConfig {
            requests_per_minute: limit,
            burst_limit: burst,
            ..GuardrailConfig::default()
        }
    }

    fn request(ip: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/v1/verify")
            .header("x-forwarded-for", ip)
            .body(Body::empty())
            .unwrap()
    }

    async fn send(p: &Pipeline, ip: &str, times: usize) -> Vec<StatusCode> {
        let mut statuses = Vec::with_capacity(times);
        for _ in 0..times {
            let response = p.app.clone().oneshot(request(ip)).await.unwrap();
            statuses.push(response.status());
        }
        statuses
    }

    async fn settled_evidence(p: &Pipeline) -> Vec<SignedEvidence> {
        assert_eq!(p.dispatcher.drain(Duration::from_secs(10)).await, 0);
        p.store
            .list_ids()
            .unwrap()
            .iter()
            .map(|id| p.store.load(id).unwrap().unwrap())
            .collect()
    }

    /// Every independent check a holder of the bundle can make.
    async fn assert_independently_verifiable(signer: &dyn SigningBackend, evidence: &SignedEvidence) {
        assert_eq!(evidence.verification_status, VerificationStatus::Signed);
        assert_eq!(evidence.content_hash, content_hash(&evidence.decision).unwrap());

        let digest = ArtifactHash::from_hex(&evidence.content_hash).unwrap();
        let valid = signer
            .verify(
                &SigningInput::Digest(digest),
                evidence.signature.as_deref().unwrap(),
                evidence.signer_certificate.as_deref().unwrap(),
            )
            .await
            .unwrap();
        assert!(valid, "signature of {} does not verify", evidence.evidence_id);

        let entry = evidence.transparency_log_entry.as_ref().unwrap();
        assert_eq!(entry.artifact_hash, evidence.content_hash);
        let proof = entry.inclusion_proof.as_ref().unwrap();
        assert!(proof.verify(&entry_leaf_hash(entry).unwrap()));
    }

    fn count(evidence: &[SignedEvidence], outcome: DecisionOutcome) -> usize {
        evidence
            .iter()
            .filter(|e| e.decision.decision == outcome)
            .count()
    }

    // =============================================================================
    // INTEGRATION TESTS: GUARDRAIL → EVIDENCE
    // =============================================================================

    #[tokio::test]
    async fn test_every_guarded_request_leaves_signed_evidence() {
        let p = pipeline(Arc::new(MockSigningBackend::new()), limited(3, 3));

        let statuses = send(&p, "198.51.100.7", 4).await;
        assert_eq!(
            statuses,
            vec![
                StatusCode::OK,
                StatusCode::OK,
                StatusCode::OK,
                StatusCode::TOO_MANY_REQUESTS
            ]
        );

        let evidence = settled_evidence(&p).await;
        assert_eq!(evidence.len(), 4);
        assert_eq!(count(&evidence, DecisionOutcome::Allowed), 3);
        assert_eq!(count(&evidence, DecisionOutcome::Denied), 1);
        for bundle in &evidence {
            assert_independently_verifiable(p.signer.as_ref(), bundle).await;
            assert_eq!(bundle.decision.guardrail, "rate_limit");
            assert_eq!(bundle.decision.service, "verifier");
            assert_eq!(bundle.decision.metadata["client_id"], "198.51.100.7");
        }
        assert_eq!(p.log.len(), 4);
    }

    #[tokio::test]
    async fn test_production_keyless_evidence_verifies() {
        let p = pipeline(Arc::new(ProductionSigningBackend::keyless()), limited(10, 5));
        send(&p, "198.51.100.8", 2).await;

        let evidence = settled_evidence(&p).await;
        assert_eq!(evidence.len(), 2);
        for bundle in &evidence {
            assert_independently_verifiable(p.signer.as_ref(), bundle).await;
        }
    }

    #[tokio::test]
    async fn test_shadow_mode_admits_but_records_degraded() {
        let config = GuardrailConfig {
            shadow_mode: true,
            ..limited(1, 1)
        };
        let p = pipeline(Arc::new(MockSigningBackend::new()), config);

        let statuses = send(&p, "198.51.100.9", 3).await;
        assert!(statuses.iter().all(|s| *s == StatusCode::OK));

        let evidence = settled_evidence(&p).await;
        assert_eq!(count(&evidence, DecisionOutcome::Allowed), 1);
        assert_eq!(count(&evidence, DecisionOutcome::Degraded), 2);
        assert!(evidence
            .iter()
            .filter(|e| e.decision.decision == DecisionOutcome::Degraded)
            .all(|e| e.decision.reason.starts_with("shadow_mode:")));
    }

    #[tokio::test]
    async fn test_clients_are_limited_independently() {
        let p = pipeline(Arc::new(MockSigningBackend::new()), limited(1, 1));

        assert_eq!(send(&p, "203.0.113.1", 1).await, vec![StatusCode::OK]);
        assert_eq!(send(&p, "203.0.113.2", 1).await, vec![StatusCode::OK]);
        assert_eq!(
            send(&p, "203.0.113.1", 1).await,
            vec![StatusCode::TOO_MANY_REQUESTS]
        );

        let evidence = settled_evidence(&p).await;
        assert_eq!(evidence.len(), 3);
        assert_eq!(count(&evidence, DecisionOutcome::Denied), 1);
    }

    #[tokio::test]
    async fn test_tampered_decision_no_longer_matches_hash() {
        let p = pipeline(Arc::new(MockSigningBackend::new()), limited(5, 5));
        send(&p, "198.51.100.10", 1).await;

        let mut evidence = settled_evidence(&p).await.remove(0);
        evidence.decision.decision = DecisionOutcome::Allowed;
        evidence.decision.reason = "whitelisted".to_string();
        assert_ne!(evidence.content_hash, content_hash(&evidence.decision).unwrap());
    }

    // =============================================================================
    // INTEGRATION TESTS: DEGRADED SIGNING
    // =============================================================================

    /// Backend whose signing path is broken in a chosen way.
    struct FaultyBackend(SigningError);

    #[async_trait]
    impl SigningBackend for FaultyBackend {
        fn kind(&self) -> BackendKind {
            BackendKind::Production
        }

        async fn sign(
            &self,
            _input: &SigningInput,
            _subject: &str,
        ) -> Result<SignatureBundle, SigningError> {
            Err(self.0.clone())
        }

        async fn verify(
            &self,
            _input: &SigningInput,
            _signature: &str,
            _certificate: &str,
        ) -> Result<bool, SigningError> {
            Ok(false)
        }
    }

    #[tokio::test]
    async fn test_unreachable_signer_never_blocks_requests() {
        let backend = FaultyBackend(SigningError::Unavailable("connection refused".into()));
        let p = pipeline(Arc::new(backend), limited(5, 5));

        assert_eq!(send(&p, "198.51.100.11", 2).await, vec![StatusCode::OK; 2]);

        let evidence = settled_evidence(&p).await;
        assert_eq!(evidence.len(), 2);
        for bundle in &evidence {
            assert_eq!(bundle.verification_status, VerificationStatus::Offline);
            assert_eq!(bundle.content_hash, content_hash(&bundle.decision).unwrap());
            assert!(bundle.signature.is_none());
            assert!(bundle.transparency_log_entry.is_none());
        }
        assert!(p.log.is_empty());
    }

    #[tokio::test]
    async fn test_broken_signer_persists_failed_fallback() {
        let backend = FaultyBackend(SigningError::UnsupportedKeyType("ed448".into()));
        let p = pipeline(Arc::new(backend), limited(5, 5));
        send(&p, "198.51.100.12", 1).await;

        let evidence = settled_evidence(&p).await;
        assert_eq!(evidence.len(), 1);
        assert_eq!(evidence[0].verification_status, VerificationStatus::Failed);
        assert_eq!(evidence[0].content_hash, FAILED_CONTENT_HASH);
    }
}
