//! Core trait definitions for the PRAETOR validation pipeline.
//!
//! These three traits define the trust boundary of the engine:
//!
//! - `ValidationStrategy`: one check applied to every bus message
//! - `PolicyEvaluator`: external, possibly remote, policy decision point
//! - `DecisionRecorder`: non-blocking sink for authorization decisions
//!
//! Implementations of `ValidationStrategy` must be fail-closed: a strategy
//! that cannot complete its check returns a DENY result, never a pass.

use async_trait::async_trait;

use praetor_contracts::{
    authorization::AuthorizationDecision, error::GovernanceResult, message::AgentMessage,
    policy::PolicyOutcome, validation::ValidationResult,
};

/// A single validation check over a bus message.
///
/// Strategies are shared across concurrent validation calls, so they take
/// `&self` and keep any mutable state behind their own synchronization.
#[async_trait]
pub trait ValidationStrategy: Send + Sync {
    /// Short, stable name used in logs and result metadata.
    fn name(&self) -> &str;

    /// Inspect `message` and report findings.
    ///
    /// There is no error channel: anything that prevents the check from
    /// completing must be rendered as an error inside the returned result.
    async fn validate(&self, message: &AgentMessage) -> ValidationResult;
}

/// The external policy decision point.
///
/// `Ok(outcome)` means the evaluator reached a decision, allowing or not.
/// `Err(GovernanceError::PolicyEvaluation { .. })` means it could not, which
/// callers must treat as a failure rather than as `allow: false`.
#[async_trait]
pub trait PolicyEvaluator: Send + Sync {
    async fn evaluate(
        &self,
        policy_path: &str,
        input: &serde_json::Value,
    ) -> GovernanceResult<PolicyOutcome>;
}

/// Receiver for every decision the authorization enforcer makes.
///
/// `record` sits on the caller's critical path: implementations must return
/// immediately and must never block, panic, or report failure. Overflow is
/// handled by dropping entries and counting the drop.
pub trait DecisionRecorder: Send + Sync {
    fn record(&self, decision: &AuthorizationDecision);
}
