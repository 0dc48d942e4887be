//! # Artifact Flow
//!
//! Supply-chain artifacts through signing, the transparency log and
//! verification:
//!
//! 1. **Sign → Log → Verify**: one signer, both backends
//! 2. **Chain tiers**: inner signer plus an outer countersignature
//! 3. **Merkle proofs**: entries proven against current and historical roots

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use shared_crypto::ArtifactHash;
    use shared_types::{Tier, UNKNOWN_SIGNER};
    use tl_02_signing::{MockSigningBackend, ProductionSigningBackend, SigningBackend, SigningInput};
    use tl_03_transparency_log::{entry_leaf_hash, InMemoryTransparencyLog, TransparencyLog};
    use tl_05_verification::{
        ArtifactSigningService, ChainSignature, ChainSignatures, FilesystemArtifactResolver,
        SignRequest, VerificationService, VerifyChainRequest, VerifyRequest,
    };

    const SARIF: &str = r#"{"version":"2.1.0","runs":[{"tool":{"driver":{"name":"scanner"}}}]}"#;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    struct Services {
        dir: tempfile::TempDir,
        log: Arc<InMemoryTransparencyLog>,
        signing: ArtifactSigningService,
        verification: VerificationService,
    }

    fn services(signer: Arc<dyn SigningBackend>) -> Services {
        let dir = tempfile::tempdir().unwrap();
        let log = Arc::new(InMemoryTransparencyLog::new());
        let shared_log: Arc<dyn TransparencyLog> = log.clone();
        Services {
            signing: ArtifactSigningService::new(signer.clone(), shared_log.clone()),
            verification: VerificationService::new(
                signer,
                shared_log,
                Arc::new(FilesystemArtifactResolver::new(dir.path())),
            ),
            log,
            dir,
        }
    }

    fn sign_request(artifact: &str, artifact_type: &str, subject: &str) -> SignRequest {
        SignRequest {
            artifact: artifact.to_string(),
            artifact_type: artifact_type.to_string(),
            subject: subject.to_string(),
            predicates: Default::default(),
        }
    }

    fn chain_signature(signature: &str, certificate: Option<String>) -> ChainSignature {
        ChainSignature {
            signature: signature.to_string(),
            certificate,
            covers: None,
        }
    }

    fn chain_request(
        inner: ChainSignature,
        outer: Option<ChainSignature>,
        tier: Tier,
    ) -> VerifyChainRequest {
        VerifyChainRequest {
            artifact_locations: vec!["reports/scan.sarif".to_string()],
            signatures: ChainSignatures { inner, outer },
            sigstore_entry_id: None,
            tier,
        }
    }

    fn write_artifact(s: &Services) {
        let reports = s.dir.path().join("reports");
        std::fs::create_dir_all(&reports).unwrap();
        std::fs::write(reports.join("scan.sarif"), SARIF).unwrap();
    }

    // =============================================================================
    // SIGN → LOG → VERIFY
    // =============================================================================

    #[tokio::test]
    async fn test_mock_sign_log_verify() {
        let s = services(Arc::new(MockSigningBackend::new()));
        let signed = s
            .signing
            .sign(sign_request(SARIF, "sarif", "scanner@ci"))
            .await
            .unwrap();
        assert_eq!(s.log.len(), 1);
        assert_eq!(signed.transparency_entry.signer, "scanner@ci");

        // Certificate looked up from the log entry.
        let response = s
            .verification
            .verify_response(&VerifyRequest {
                artifact: SARIF.to_string(),
                signature: signed.signature.clone(),
                certificate: None,
                identity: Some("scanner@ci".to_string()),
            })
            .await;
        assert!(response.valid, "{:?}", response.reason);
        assert_eq!(response.transparency_index, Some(signed.transparency_entry.index));
    }

    #[tokio::test]
    async fn test_production_sign_log_verify() {
        let s = services(Arc::new(ProductionSigningBackend::keyless()));
        let signed = s
            .signing
            .sign(sign_request(SARIF, "sarif", "scanner@ci"))
            .await
            .unwrap();
        let certificate = signed.certificate.clone().unwrap();
        assert!(certificate.contains("BEGIN PUBLIC KEY"));

        let request = VerifyRequest {
            artifact: SARIF.to_string(),
            signature: signed.signature.clone(),
            certificate: Some(certificate),
            identity: None,
        };
        let result = s.verification.verify(&request).await;
        assert!(result.chain_verified, "{:?}", result.reason);
        assert!(result.non_repudiation);
        assert_eq!(
            result.signer_inner.as_deref(),
            Some(signed.transparency_entry.signer.as_str())
        );

        // Same signature, different bytes.
        let altered = VerifyRequest {
            artifact: SARIF.replace("2.1.0", "2.1.1"),
            ..request
        };
        let result = s.verification.verify(&altered).await;
        assert!(!result.inner_signature_valid);
        assert!(!result.non_repudiation);
    }

    #[tokio::test]
    async fn test_digest_signing_matches_content_verification() {
        let s = services(Arc::new(ProductionSigningBackend::keyless()));
        let digest = ArtifactHash::of(SARIF.as_bytes()).prefixed();
        let signed = s
            .signing
            .sign(sign_request(&digest, "sarif", "scanner@ci"))
            .await
            .unwrap();

        let result = s
            .verification
            .verify(&VerifyRequest {
                artifact: SARIF.to_string(),
                signature: signed.signature,
                certificate: signed.certificate,
                identity: None,
            })
            .await;
        assert!(result.chain_verified, "{:?}", result.reason);
    }

    #[tokio::test]
    async fn test_signature_from_other_backend_is_negative() {
        let s = services(Arc::new(ProductionSigningBackend::keyless()));
        let hash = ArtifactHash::of(SARIF.as_bytes());

        let result = s
            .verification
            .verify(&VerifyRequest {
                artifact: SARIF.to_string(),
                signature: MockSigningBackend::signature_for(&hash, "ci"),
                certificate: Some(MockSigningBackend::certificate_for("ci")),
                identity: None,
            })
            .await;
        assert!(!result.chain_verified);
        assert_eq!(result.signer_inner.as_deref(), Some(UNKNOWN_SIGNER));
    }

    #[tokio::test]
    async fn test_unlogged_key_cannot_claim_logged_identity() {
        let s = services(Arc::new(ProductionSigningBackend::keyless()));
        let logged = s
            .signing
            .sign(sign_request(SARIF, "sarif", "scanner@ci"))
            .await
            .unwrap();

        let foreign = ProductionSigningBackend::keyless()
            .sign(&SigningInput::from_wire(SARIF), "scanner@ci")
            .await
            .unwrap();

        let result = s
            .verification
            .verify(&VerifyRequest {
                artifact: SARIF.to_string(),
                signature: foreign.signature,
                certificate: Some(foreign.certificate),
                identity: Some(logged.transparency_entry.signer.clone()),
            })
            .await;
        assert!(result.inner_signature_valid);
        assert!(!result.chain_verified);
        assert!(!result.non_repudiation);
        assert_eq!(result.transparency_index, None);
        assert_eq!(result.signer_inner.as_deref(), Some(foreign.signer.as_str()));
    }

    // =============================================================================
    // CHAIN TIERS
    // =============================================================================

    #[tokio::test]
    async fn test_verified_tier_full_chain() {
        let s = services(Arc::new(ProductionSigningBackend::keyless()));
        write_artifact(&s);

        let inner = s
            .signing
            .sign(sign_request(SARIF, "sarif", "scanner@ci"))
            .await
            .unwrap();
        let outer = s
            .signing
            .countersign(&inner.signature, "trust-ledger")
            .await
            .unwrap();
        assert_eq!(s.log.len(), 2);

        let mut request = chain_request(
            chain_signature(&inner.signature, inner.certificate.clone()),
            Some(chain_signature(&outer.signature, outer.certificate.clone())),
            Tier::Verified,
        );
        request.sigstore_entry_id = Some(inner.entry_id.clone());

        let result = s.verification.verify_chain(&request).await;
        assert!(result.chain_verified, "{:?}", result.reason);
        assert!(result.inner_signature_valid);
        assert!(result.outer_signature_valid);
        assert!(result.chain_unbroken);
        assert!(result.non_repudiation);
        assert_eq!(result.tier, Tier::Verified);
        assert_eq!(result.transparency_index, Some(inner.transparency_entry.index));
        assert_eq!(
            result.signer_outer.as_deref(),
            Some(outer.transparency_entry.signer.as_str())
        );
    }

    #[tokio::test]
    async fn test_unlogged_inner_certificate_breaks_verified_tier() {
        let s = services(Arc::new(ProductionSigningBackend::keyless()));
        write_artifact(&s);
        let logged = s
            .signing
            .sign(sign_request(SARIF, "sarif", "scanner@ci"))
            .await
            .unwrap();

        let foreign = ProductionSigningBackend::keyless()
            .sign(&SigningInput::from_wire(SARIF), "scanner@ci")
            .await
            .unwrap();
        let outer = s
            .signing
            .countersign(&foreign.signature, "trust-ledger")
            .await
            .unwrap();

        // Pointing at the logged entry does not lend it to another key.
        let mut request = chain_request(
            chain_signature(&foreign.signature, Some(foreign.certificate.clone())),
            Some(chain_signature(&outer.signature, outer.certificate.clone())),
            Tier::Verified,
        );
        request.sigstore_entry_id = Some(logged.entry_id.clone());

        let result = s.verification.verify_chain(&request).await;
        assert!(result.inner_signature_valid);
        assert!(result.chain_unbroken);
        assert!(!result.chain_verified);
        assert!(!result.non_repudiation);
        assert_eq!(result.transparency_index, None);
        assert_eq!(result.sigstore_timestamp, None);
    }

    #[tokio::test]
    async fn test_basic_tier_accepts_inner_only() {
        let s = services(Arc::new(MockSigningBackend::new()));
        write_artifact(&s);
        let inner = s
            .signing
            .sign(sign_request(SARIF, "sarif", "scanner@ci"))
            .await
            .unwrap();

        let basic = s
            .verification
            .verify_chain(&chain_request(
                chain_signature(&inner.signature, None),
                None,
                Tier::Basic,
            ))
            .await;
        assert!(basic.chain_verified, "{:?}", basic.reason);
        assert!(!basic.outer_signature_valid);
        assert_eq!(basic.signer_inner.as_deref(), Some("scanner@ci"));

        let verified = s
            .verification
            .verify_chain(&chain_request(
                chain_signature(&inner.signature, None),
                None,
                Tier::Verified,
            ))
            .await;
        assert!(!verified.chain_verified);
        assert!(verified.inner_signature_valid);
        assert!(verified.reason.is_some());
    }

    #[tokio::test]
    async fn test_countersignature_over_wrong_inner_breaks_chain() {
        let s = services(Arc::new(MockSigningBackend::new()));
        write_artifact(&s);
        let inner = s
            .signing
            .sign(sign_request(SARIF, "sarif", "scanner@ci"))
            .await
            .unwrap();
        let unrelated = s
            .signing
            .sign(sign_request("other report", "sarif", "scanner@ci"))
            .await
            .unwrap();
        let outer = s
            .signing
            .countersign(&unrelated.signature, "trust-ledger")
            .await
            .unwrap();

        let result = s
            .verification
            .verify_chain(&chain_request(
                chain_signature(&inner.signature, None),
                Some(chain_signature(&outer.signature, outer.certificate.clone())),
                Tier::Verified,
            ))
            .await;
        assert!(result.inner_signature_valid);
        assert!(!result.chain_unbroken);
        assert!(!result.non_repudiation);
        assert!(!result.chain_verified);
    }

    // =============================================================================
    // MERKLE PROOFS
    // =============================================================================

    #[tokio::test]
    async fn test_every_entry_proves_against_current_root() {
        let s = services(Arc::new(MockSigningBackend::new()));
        let mut entry_ids = Vec::new();
        for i in 0..7 {
            let signed = s
                .signing
                .sign(sign_request(&format!("sbom-{i}"), "sbom", "builder"))
                .await
                .unwrap();
            entry_ids.push(signed.entry_id);
        }
        let root = s.log.root_hash().unwrap();

        for (i, entry_id) in entry_ids.iter().enumerate() {
            let entry = s.log.get(entry_id).await.unwrap();
            assert_eq!(entry.index, i as u64);
            let proof = s.log.inclusion_proof(entry_id, None).await.unwrap();
            assert_eq!(proof.tree_size, 7);
            assert_eq!(proof.root_hash, root);
            assert!(proof.verify(&entry_leaf_hash(&entry).unwrap()));
        }
    }

    #[tokio::test]
    async fn test_historical_proof_and_tampered_entry() {
        let s = services(Arc::new(MockSigningBackend::new()));
        let mut entry_ids = Vec::new();
        for i in 0..5 {
            let signed = s
                .signing
                .sign(sign_request(&format!("sarif-{i}"), "sarif", "scanner"))
                .await
                .unwrap();
            entry_ids.push(signed.entry_id);
        }

        let entry = s.log.get(&entry_ids[1]).await.unwrap();
        let historical = s.log.inclusion_proof(&entry_ids[1], Some(3)).await.unwrap();
        assert_eq!(historical.tree_size, 3);
        assert_ne!(Some(historical.root_hash.clone()), s.log.root_hash());
        assert!(historical.verify(&entry_leaf_hash(&entry).unwrap()));

        // Entry 4 did not exist at size 3.
        assert!(s.log.inclusion_proof(&entry_ids[4], Some(3)).await.is_none());

        let mut forged = entry.clone();
        forged.signer = "someone-else".to_string();
        let proof = entry.inclusion_proof.clone().unwrap();
        assert!(!proof.verify(&entry_leaf_hash(&forged).unwrap()));
    }

    #[tokio::test]
    async fn test_search_returns_every_signing_of_an_artifact() {
        let s = services(Arc::new(MockSigningBackend::new()));
        for subject in ["first", "second"] {
            s.signing
                .sign(sign_request(SARIF, "sarif", subject))
                .await
                .unwrap();
        }
        let hash = ArtifactHash::of(SARIF.as_bytes());

        let entries = s.log.search_by_hash(&hash.prefixed()).await;
        let signers: Vec<&str> = entries.iter().map(|e| e.signer.as_str()).collect();
        assert_eq!(signers, vec!["first", "second"]);
    }
}
