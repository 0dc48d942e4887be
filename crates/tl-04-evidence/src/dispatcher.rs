//! # Evidence Dispatcher
//!
//! Runs `process_decision` off the request path. Every spawned task is held
//! in a `JoinSet` until it finishes; finished tasks are reaped on the next
//! dispatch. Tasks are never aborted, including when the dispatcher is
//! dropped or a drain times out.

use crate::service::EvidenceGenerator;
use parking_lot::Mutex;
use shared_types::IntegrityDecision;
use std::sync::Arc;
use std::time::Duration;
use tl_01_guardrail::DecisionSink;
use tokio::runtime::Handle;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

pub struct EvidenceDispatcher {
    generator: Arc<EvidenceGenerator>,
    tasks: Mutex<JoinSet<()>>,
    runtime: Handle,
}

impl EvidenceDispatcher {
    /// Tasks are spawned on `runtime`, so `dispatch` may be called from any
    /// thread.
    pub fn new(generator: Arc<EvidenceGenerator>, runtime: Handle) -> Self {
        Self {
            generator,
            tasks: Mutex::new(JoinSet::new()),
            runtime,
        }
    }

    pub fn generator(&self) -> &Arc<EvidenceGenerator> {
        &self.generator
    }

    /// Start evidence generation for `decision` and return immediately.
    pub fn dispatch(&self, decision: IntegrityDecision) {
        let generator = Arc::clone(&self.generator);
        let decision_id = decision.decision_id.clone();

        let mut tasks = self.tasks.lock();
        reap(&mut tasks);
        tasks.spawn_on(
            async move {
                let evidence = generator.process_decision(decision).await;
                debug!(
                    evidence_id = %evidence.evidence_id,
                    status = evidence.verification_status.as_str(),
                    "[tl-04] Evidence task finished"
                );
            },
            &self.runtime,
        );
        debug!(decision_id = %decision_id, in_flight = tasks.len(), "[tl-04] Evidence task dispatched");
    }

    /// Evidence tasks still running.
    pub fn in_flight(&self) -> usize {
        let mut tasks = self.tasks.lock();
        reap(&mut tasks);
        tasks.len()
    }

    /// Wait up to `timeout` for in-flight tasks. Returns how many were still
    /// running; those keep running detached until the process exits.
    pub async fn drain(&self, timeout: Duration) -> usize {
        let mut pending = std::mem::take(&mut *self.tasks.lock());
        let total = pending.len();
        if total == 0 {
            return 0;
        }
        info!(in_flight = total, "[tl-04] Draining evidence tasks");

        let finished = tokio::time::timeout(timeout, async {
            while let Some(result) = pending.join_next().await {
                log_panic(result);
            }
        })
        .await;

        let remaining = pending.len();
        if finished.is_err() {
            warn!(
                remaining,
                timeout_ms = timeout.as_millis() as u64,
                "[tl-04] Evidence drain timed out, remaining tasks may be lost at exit"
            );
            pending.detach_all();
        }
        remaining
    }
}

impl DecisionSink for EvidenceDispatcher {
    fn submit(&self, decision: IntegrityDecision) {
        self.dispatch(decision);
    }
}

impl Drop for EvidenceDispatcher {
    fn drop(&mut self) {
        // Dropping a JoinSet aborts its tasks.
        self.tasks.get_mut().detach_all();
    }
}

fn reap(tasks: &mut JoinSet<()>) {
    while let Some(result) = tasks.try_join_next() {
        log_panic(result);
    }
}

fn log_panic(result: Result<(), tokio::task::JoinError>) {
    if let Err(e) = result {
        error!(error = %e, "[tl-04] Evidence task panicked");
    }
}
