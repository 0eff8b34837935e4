//! Bounded in-memory log of authorization decisions.
//!
//! `DecisionLog` is the `DecisionRecorder` the enforcer writes to. Appends
//! take a short mutex over a ring buffer and never wait on anything else:
//! when the buffer is full the oldest entry is evicted and counted.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tracing::debug;

use praetor_contracts::{authorization::AuthorizationDecision, error::GovernanceResult};
use praetor_core::traits::DecisionRecorder;

use crate::exporter::{AuditExporter, AuditSink, ExportStats};

pub struct DecisionLog {
    entries: Mutex<VecDeque<AuthorizationDecision>>,
    capacity: usize,
    evicted: AtomicU64,
    exporter: Option<AuditExporter>,
}

impl DecisionLog {
    /// Create a log holding at most `capacity` decisions (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            evicted: AtomicU64::new(0),
            exporter: None,
        }
    }

    /// Also forward every recorded decision to a background exporter.
    pub fn with_exporter(mut self, exporter: AuditExporter) -> Self {
        self.exporter = Some(exporter);
        self
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Number of entries evicted to make room since creation.
    pub fn evicted(&self) -> u64 {
        self.evicted.load(Ordering::Relaxed)
    }

    /// Exporter counters, if an exporter is attached.
    pub fn export_stats(&self) -> Option<ExportStats> {
        self.exporter.as_ref().map(AuditExporter::stats)
    }

    /// Copy of the retained decisions, oldest first.
    pub fn snapshot(&self) -> Vec<AuthorizationDecision> {
        self.entries.lock().iter().cloned().collect()
    }

    /// Remove and return the retained decisions, oldest first.
    pub fn drain(&self) -> Vec<AuthorizationDecision> {
        self.entries.lock().drain(..).collect()
    }

    /// On-demand export: write the current snapshot to `sink`.
    ///
    /// Returns the number of decisions written. Stops at the first sink error.
    pub async fn export_to(&self, sink: &dyn AuditSink) -> GovernanceResult<usize> {
        let snapshot = self.snapshot();
        for decision in &snapshot {
            sink.write(decision).await?;
        }
        sink.flush().await?;
        Ok(snapshot.len())
    }
}

impl DecisionRecorder for DecisionLog {
    fn record(&self, decision: &AuthorizationDecision) {
        {
            let mut entries = self.entries.lock();
            if entries.len() >= self.capacity {
                entries.pop_front();
                self.evicted.fetch_add(1, Ordering::Relaxed);
                debug!(capacity = self.capacity, "audit ring full; oldest decision evicted");
            }
            entries.push_back(decision.clone());
        }

        if let Some(exporter) = &self.exporter {
            exporter.forward(decision);
        }
    }
}
