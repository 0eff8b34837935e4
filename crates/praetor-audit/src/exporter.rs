//! Fire-and-forget export of authorization decisions to an external sink.
//!
//! The caller side only ever calls `try_send` on a bounded channel. A
//! background task drains the channel into the `AuditSink`. When the channel
//! is full the newest entry is dropped and counted; the caller never waits
//! on sink availability.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use praetor_contracts::{authorization::AuthorizationDecision, error::GovernanceResult};

/// Persistent, tamper-evident storage for authorization decisions.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn write(&self, decision: &AuthorizationDecision) -> GovernanceResult<()>;

    /// Flush buffered entries. Called once when the exporter shuts down.
    async fn flush(&self) -> GovernanceResult<()> {
        Ok(())
    }
}

#[derive(Debug, Default)]
struct ExportCounters {
    exported: AtomicU64,
    dropped: AtomicU64,
    failed: AtomicU64,
}

/// Point-in-time view of exporter counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExportStats {
    /// Entries the sink accepted.
    pub exported: u64,
    /// Entries discarded because the queue was full or closed.
    pub dropped: u64,
    /// Entries the sink rejected.
    pub failed: u64,
}

/// Handle for enqueueing decisions towards a background sink task.
#[derive(Clone)]
pub struct AuditExporter {
    tx: mpsc::Sender<AuthorizationDecision>,
    counters: Arc<ExportCounters>,
}

impl AuditExporter {
    /// Spawn the drain task on the current tokio runtime.
    ///
    /// The task ends, after flushing the sink, once every `AuditExporter`
    /// clone has been dropped. `capacity` is clamped to at least 1.
    pub fn spawn(sink: Arc<dyn AuditSink>, capacity: usize) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<AuthorizationDecision>(capacity.max(1));
        let counters = Arc::new(ExportCounters::default());
        let task_counters = Arc::clone(&counters);

        let handle = tokio::spawn(async move {
            while let Some(decision) = rx.recv().await {
                match sink.write(&decision).await {
                    Ok(()) => {
                        task_counters.exported.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(e) => {
                        task_counters.failed.fetch_add(1, Ordering::Relaxed);
                        warn!(decision_id = %decision.id, error = %e, "audit sink rejected decision");
                    }
                }
            }

            if let Err(e) = sink.flush().await {
                warn!(error = %e, "audit sink flush failed");
            }
            info!(
                exported = task_counters.exported.load(Ordering::Relaxed),
                dropped = task_counters.dropped.load(Ordering::Relaxed),
                "audit exporter stopped"
            );
        });

        (Self { tx, counters }, handle)
    }

    /// Enqueue a decision without waiting. Never fails from the caller's view.
    pub fn forward(&self, decision: &AuthorizationDecision) {
        match self.tx.try_send(decision.clone()) {
            Ok(()) => {}
            Err(TrySendError::Full(dropped)) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                debug!(decision_id = %dropped.id, "audit export queue full; decision dropped");
            }
            Err(TrySendError::Closed(dropped)) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                debug!(decision_id = %dropped.id, "audit exporter closed; decision dropped");
            }
        }
    }

    pub fn stats(&self) -> ExportStats {
        ExportStats {
            exported: self.counters.exported.load(Ordering::Relaxed),
            dropped: self.counters.dropped.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
        }
    }
}
