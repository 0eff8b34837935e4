//! Records written to a decision stream, and the sealed export of one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use praetor_contracts::authorization::AuthorizationDecision;

/// One authorization decision as it sits in a stream.
///
/// `this_hash` covers the decision and the event's position, and the next
/// event repeats it as `prev_hash`. Flipping `allowed` on a stored denial
/// breaks both links.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Zero-based position within `stream_id`.
    pub sequence: u64,

    /// Name of the decision stream, typically one per engine.
    pub stream_id: String,

    pub decision: AuthorizationDecision,

    /// Digest of the event at `sequence - 1`; `GENESIS_HASH` at sequence 0.
    pub prev_hash: String,

    /// Hex SHA-256 produced by `hash_event`.
    pub this_hash: String,
}

impl AuditEvent {
    /// Predecessor digest of sequence 0.
    pub const GENESIS_HASH: &'static str =
        "0000000000000000000000000000000000000000000000000000000000000000";
}

/// Point-in-time copy of a decision stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLog {
    pub stream_id: String,
    pub events: Vec<AuditEvent>,
    pub sealed_at: DateTime<Utc>,

    /// Digest of the newest event, which pins every earlier decision.
    /// Empty when nothing was recorded.
    pub terminal_hash: String,
}
