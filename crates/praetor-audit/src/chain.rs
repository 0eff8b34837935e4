//! SHA-256 linking for a stream of authorization decisions.
//!
//! An event's digest covers, in this byte order: the stream id, the
//! little-endian `u64` sequence, the predecessor digest as hex text, and the
//! compact JSON of the decision. Two engines writing to different streams
//! therefore never produce interchangeable events.

use sha2::{Digest, Sha256};

use praetor_contracts::{
    authorization::AuthorizationDecision,
    error::{GovernanceError, GovernanceResult},
};

use crate::event::AuditEvent;

/// Digest one decision at position `sequence` of `stream_id`, linked to
/// `prev_hash`.
///
/// Fails with `AuditSinkFailed` if the decision does not serialize.
pub fn hash_event(
    stream_id: &str,
    sequence: u64,
    decision: &AuthorizationDecision,
    prev_hash: &str,
) -> GovernanceResult<String> {
    let body = serde_json::to_vec(decision).map_err(|e| GovernanceError::AuditSinkFailed {
        reason: format!("decision {} is not serializable: {e}", decision.id),
    })?;

    let digest = Sha256::new()
        .chain_update(stream_id.as_bytes())
        .chain_update(sequence.to_le_bytes())
        .chain_update(prev_hash.as_bytes())
        .chain_update(&body)
        .finalize();
    Ok(hex::encode(digest))
}

/// Sequence number of the first event whose link or digest does not hold,
/// or `None` when the whole stream checks out.
pub fn first_broken_link(events: &[AuditEvent]) -> Option<u64> {
    let mut prev: &str = AuditEvent::GENESIS_HASH;
    for event in events {
        let recomputed =
            hash_event(&event.stream_id, event.sequence, &event.decision, prev).ok();
        if event.prev_hash != prev || recomputed.as_deref() != Some(event.this_hash.as_str()) {
            return Some(event.sequence);
        }
        prev = event.this_hash.as_str();
    }
    None
}

/// True when every event links to its predecessor and its digest still
/// matches. An empty stream verifies.
pub fn verify_chain(events: &[AuditEvent]) -> bool {
    first_broken_link(events).is_none()
}
