//! Policy evaluator outcome type.
//!
//! The external policy evaluator answers with a `PolicyOutcome` when it could
//! reach a decision. Failing to reach one (unreachable, error, timeout) is a
//! `GovernanceError::PolicyEvaluation`, never an `allow: false` outcome.

use serde::{Deserialize, Serialize};

/// A definitive answer from the policy evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyOutcome {
    pub allow: bool,
    /// Reasons for a denial, in the order the evaluator reported them.
    #[serde(default)]
    pub errors: Vec<String>,
}

impl PolicyOutcome {
    pub fn allow() -> Self {
        Self {
            allow: true,
            errors: Vec::new(),
        }
    }

    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            allow: false,
            errors: vec![reason.into()],
        }
    }
}
