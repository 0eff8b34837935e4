//! Canonical, order-independent serialization of policy inputs.
//!
//! Two inputs that differ only in object key order must produce the same
//! bytes and therefore the same cache key. Keys are re-inserted in sorted
//! order at every depth, which holds whether or not serde_json's
//! `preserve_order` feature is enabled elsewhere in the dependency graph.

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use praetor_contracts::error::{GovernanceError, GovernanceResult};

/// Return a copy of `value` with every object's keys in sorted order.
/// Array order is significant and kept.
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = Map::with_capacity(map.len());
            for key in keys {
                sorted.insert(key.clone(), canonicalize(&map[key]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

/// Compact JSON bytes of the canonical form of `value`.
pub fn canonical_bytes(value: &Value) -> GovernanceResult<Vec<u8>> {
    serde_json::to_vec(&canonicalize(value)).map_err(|e| GovernanceError::PolicyEvaluation {
        reason: format!("failed to canonicalize policy input: {e}"),
    })
}

/// SHA-256 (hex) over the policy path and the canonical input.
///
/// The path is length-prefixed so `("a", "bc")` and `("ab", "c")`-style
/// boundary shifts cannot collide.
pub fn content_hash(policy_path: &str, input: &Value) -> GovernanceResult<String> {
    let bytes = canonical_bytes(input)?;

    let mut hasher = Sha256::new();
    hasher.update((policy_path.len() as u64).to_le_bytes());
    hasher.update(policy_path.as_bytes());
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}
