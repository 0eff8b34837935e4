//! `HashChainSink`: the tamper-evident export target for decisions.
//!
//! The exporter hands it decisions in the order the enforcer made them, and
//! each one becomes the next event of a single named stream. The chain lives
//! in memory; `export_log` seals a copy for persistence elsewhere.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use tracing::{debug, info};

use praetor_contracts::{authorization::AuthorizationDecision, error::GovernanceResult};

use crate::{
    chain::{first_broken_link, hash_event, verify_chain},
    event::{AuditEvent, AuditLog},
    exporter::AuditSink,
};

/// Events of one stream. The next sequence number is `events.len()`.
#[derive(Default)]
pub(crate) struct ChainState {
    pub(crate) events: Vec<AuditEvent>,
}

impl ChainState {
    fn head(&self) -> &str {
        self.events
            .last()
            .map_or(AuditEvent::GENESIS_HASH, |e| e.this_hash.as_str())
    }
}

/// Append-only decision stream. Clones share the same chain.
#[derive(Clone)]
pub struct HashChainSink {
    stream_id: String,
    pub(crate) state: Arc<Mutex<ChainState>>,
}

impl HashChainSink {
    pub fn new(stream_id: impl Into<String>) -> Self {
        Self {
            stream_id: stream_id.into(),
            state: Arc::default(),
        }
    }

    pub fn stream_id(&self) -> &str {
        &self.stream_id
    }

    /// Link `decision` onto the head of the stream.
    ///
    /// The lock is held across hashing so concurrent appends cannot claim
    /// the same sequence number.
    pub fn append(&self, decision: &AuthorizationDecision) -> GovernanceResult<()> {
        let mut state = self.state.lock();
        let sequence = state.events.len() as u64;
        let prev_hash = state.head().to_string();
        let this_hash = hash_event(&self.stream_id, sequence, decision, &prev_hash)?;

        state.events.push(AuditEvent {
            sequence,
            stream_id: self.stream_id.clone(),
            decision: decision.clone(),
            prev_hash,
            this_hash,
        });

        debug!(
            stream_id = %self.stream_id,
            sequence,
            decision_id = %decision.id,
            "decision linked into stream"
        );
        Ok(())
    }

    pub fn export_log(&self) -> AuditLog {
        let state = self.state.lock();
        AuditLog {
            stream_id: self.stream_id.clone(),
            terminal_hash: state.events.last().map(|e| e.this_hash.clone()).unwrap_or_default(),
            events: state.events.clone(),
            sealed_at: Utc::now(),
        }
    }

    /// Sequence of the first tampered event, if any.
    pub fn first_broken_link(&self) -> Option<u64> {
        first_broken_link(&self.state.lock().events)
    }

    pub fn verify_integrity(&self) -> bool {
        verify_chain(&self.state.lock().events)
    }

    pub fn len(&self) -> usize {
        self.state.lock().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl AuditSink for HashChainSink {
    async fn write(&self, decision: &AuthorizationDecision) -> GovernanceResult<()> {
        self.append(decision)
    }

    async fn flush(&self) -> GovernanceResult<()> {
        let state = self.state.lock();
        info!(
            stream_id = %self.stream_id,
            events = state.events.len(),
            head = %state.head(),
            "decision stream flushed"
        );
        Ok(())
    }
}
