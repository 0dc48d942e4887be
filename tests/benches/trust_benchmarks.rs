//! # Trust-Ledger Benchmarks
//!
//! Hot paths on every guarded request and every verification:
//!
//! | Subsystem | Operation | Target |
//! |-----------|-----------|--------|
//! | tl-01 Guardrail | admission check | < 10µs |
//! | tl-04 Evidence | canonical decision hash | < 50µs |
//! | tl-02 Signing | keyless sign + verify | < 5ms |
//! | tl-03 Transparency Log | inclusion proof verify | < 100µs |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::time::Duration;

use shared_types::merkle::{inclusion_path, leaf_hash, merkle_root, verify_inclusion, Hash32};
use shared_types::{content_hash, DecisionOutcome, IntegrityDecision, TraceContext};
use tl_01_guardrail::{GuardrailConfig, RateLimitGuardrail};
use tl_02_signing::{ProductionSigningBackend, SigningBackend, SigningInput};

const T0: u64 = 1_700_000_000_000;

// ============================================================================
// TL-01: Guardrail admission
// ============================================================================

fn bench_guardrail_admission(c: &mut Criterion) {
    let mut group = c.benchmark_group("tl-01-guardrail");

    let guardrail = RateLimitGuardrail::new(GuardrailConfig {
        requests_per_minute: 1_000_000,
        burst_limit: 1_000_000,
        ..GuardrailConfig::default()
    })
    .unwrap();
    let mut now = T0;
    group.bench_function("admit_single_client", |b| {
        b.iter(|| {
            now += 1;
            black_box(guardrail.admit("10.0.0.1", now))
        })
    });

    for clients in [100usize, 10_000] {
        let ids: Vec<String> = (0..clients)
            .map(|i| format!("10.{}.{}.{}", (i >> 16) & 0xff, (i >> 8) & 0xff, i & 0xff))
            .collect();
        let mut i = 0usize;
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::new("admit_many_clients", clients), &ids, |b, ids| {
            b.iter(|| {
                i = (i + 1) % ids.len();
                black_box(guardrail.admit(&ids[i], T0 + i as u64))
            })
        });
    }

    group.finish();
}

// ============================================================================
// TL-04: Evidence content hash
// ============================================================================

fn bench_decision_hash(c: &mut Criterion) {
    let mut group = c.benchmark_group("tl-04-evidence");

    let decision = IntegrityDecision::new(
        "verifier",
        "rate_limit",
        DecisionOutcome::Denied,
        "rate_limit_exceeded",
        &TraceContext::generate(),
    )
    .with_metadata("client_id", "203.0.113.7")
    .with_metadata("path", "/v1/verify")
    .with_metadata("limit", 100)
    .with_metadata("remaining", 0);

    group.bench_function("canonical_content_hash", |b| {
        b.iter(|| black_box(content_hash(&decision).unwrap()))
    });

    group.finish();
}

// ============================================================================
// TL-02: Keyless signing
// ============================================================================

fn bench_keyless_signing(c: &mut Criterion) {
    let mut group = c.benchmark_group("tl-02-signing");
    group.measurement_time(Duration::from_secs(10));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    let backend = ProductionSigningBackend::keyless();
    let input = SigningInput::Content(b"{\"runs\":[]}".to_vec());

    group.bench_function("keyless_sign", |b| {
        b.iter(|| black_box(runtime.block_on(backend.sign(&input, "bench")).unwrap()))
    });

    let bundle = runtime.block_on(backend.sign(&input, "bench")).unwrap();
    group.bench_function("keyless_verify", |b| {
        b.iter(|| {
            black_box(
                runtime
                    .block_on(backend.verify(&input, &bundle.signature, &bundle.certificate))
                    .unwrap(),
            )
        })
    });

    group.finish();
}

// ============================================================================
// TL-03: Merkle inclusion proofs
// ============================================================================

fn bench_inclusion_proofs(c: &mut Criterion) {
    let mut group = c.benchmark_group("tl-03-transparency-log");

    for size in [16usize, 1_024, 65_536] {
        let leaves: Vec<Hash32> = (0..size)
            .map(|i| leaf_hash(&(i as u64).to_be_bytes()))
            .collect();
        let root = merkle_root(&leaves);
        let index = size / 3;
        let path = inclusion_path(&leaves, index).unwrap();

        group.bench_with_input(BenchmarkId::new("verify_inclusion", size), &path, |b, path| {
            b.iter(|| {
                black_box(verify_inclusion(
                    &leaves[index],
                    index as u64,
                    size as u64,
                    path,
                    &root,
                ))
            })
        });

        if size <= 1_024 {
            group.bench_with_input(BenchmarkId::new("inclusion_path", size), &leaves, |b, leaves| {
                b.iter(|| black_box(inclusion_path(leaves, index)))
            });
        }
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_guardrail_admission,
    bench_decision_hash,
    bench_keyless_signing,
    bench_inclusion_proofs,
);

criterion_main!(benches);
