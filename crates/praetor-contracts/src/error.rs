//! Error taxonomy for the PRAETOR governance engine.
//!
//! Every validation-time failure is expressed as a `GovernanceError`. The
//! strategies render these into `ValidationResult::errors`; the registry and
//! configuration loader return them directly to their callers.

use thiserror::Error;

use crate::role::{Action, Role};

/// The unified error type for the PRAETOR crates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GovernanceError {
    /// The message declared a constitutional hash other than the expected one.
    ///
    /// Always fatal to the message and never retried.
    #[error("constitutional hash mismatch: expected '{expected}', got '{actual}'")]
    ConstitutionalHashMismatch { expected: String, actual: String },

    /// The policy evaluator was unreachable, errored, or timed out.
    #[error("policy evaluation error: {reason}")]
    PolicyEvaluation { reason: String },

    /// The source or target agent has no registered role.
    #[error("role not assigned: agent '{agent_id}' has no registered role")]
    RoleNotAssigned { agent_id: String },

    /// The resolved role does not permit the requested action.
    #[error("role violation: role {role} may not perform action {action} (agent '{agent_id}')")]
    RoleViolation {
        agent_id: String,
        role: Role,
        action: Action,
    },

    /// A validate/audit action targeted the acting agent or its own output.
    #[error("self-validation violation: agent '{agent_id}' may not {action} its own output")]
    SelfValidationViolation { agent_id: String, action: Action },

    /// A validate/audit action targeted a role outside the validator's allowed set.
    #[error(
        "cross-role violation: {source_role} agent '{agent_id}' may not {action} outputs of {target_role} agent '{target_agent}'"
    )]
    CrossRoleViolation {
        agent_id: String,
        source_role: Role,
        action: Action,
        target_agent: String,
        target_role: Role,
    },

    /// The agent already holds a role; reassignment requires unregistering first.
    #[error("agent '{agent_id}' is already registered with role {existing}")]
    AlreadyRegistered { agent_id: String, existing: Role },

    /// A message lifecycle transition that the state machine does not allow.
    #[error("invalid status transition from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    /// A required configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// A validation strategy faulted internally (panic or unexpected state).
    #[error("strategy '{strategy}' faulted: {reason}")]
    StrategyFault { strategy: String, reason: String },

    /// The external audit sink rejected or could not persist an entry.
    #[error("audit sink failed: {reason}")]
    AuditSinkFailed { reason: String },
}

impl GovernanceError {
    /// Stable, machine-readable code for this error kind.
    ///
    /// Codes appear in audit entries and result metadata; they never change
    /// once published.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConstitutionalHashMismatch { .. } => "CONSTITUTIONAL_HASH_MISMATCH",
            Self::PolicyEvaluation { .. } => "POLICY_EVALUATION_ERROR",
            Self::RoleNotAssigned { .. } => "ROLE_NOT_ASSIGNED",
            Self::RoleViolation { .. } => "ROLE_VIOLATION",
            Self::SelfValidationViolation { .. } => "SELF_VALIDATION_VIOLATION",
            Self::CrossRoleViolation { .. } => "CROSS_ROLE_VIOLATION",
            Self::AlreadyRegistered { .. } => "ALREADY_REGISTERED",
            Self::InvalidStatusTransition { .. } => "INVALID_STATUS_TRANSITION",
            Self::ConfigError { .. } => "CONFIG_ERROR",
            Self::StrategyFault { .. } => "STRATEGY_FAULT",
            Self::AuditSinkFailed { .. } => "AUDIT_SINK_FAILED",
        }
    }
}

/// Convenience alias used throughout the PRAETOR crates.
pub type GovernanceResult<T> = Result<T, GovernanceError>;
