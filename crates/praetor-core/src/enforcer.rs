//! The authorization enforcer: separation of powers at decision time.
//!
//! `validate_action` evaluates the rules below in order; the first denial
//! wins and every call ends in exactly one allow or deny:
//!
//!   1. Resolve the source role (strict: deny unknown; lenient: default role)
//!   2. Action must be in the role's permission set
//!   3. Validate/Audit may never target the actor itself or its own output
//!   4. Validate/Audit targets must resolve to a role the actor may judge
//!   5. Allow
//!
//! Rule 3 compares identities before any output-record lookup, so a missing
//! or stale output record can never open a self-validation path. Every
//! decision, allowed or denied, is handed to the `DecisionRecorder`.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use praetor_contracts::{
    authorization::{AuthorizationDecision, ReasonCode},
    error::GovernanceError,
    message::{AgentId, OutputId},
    role::{Action, Role},
};

use crate::{permission, registry::RoleRegistry, traits::DecisionRecorder};

/// Intermediate outcome of rule evaluation, before it becomes an audit entry.
struct Evaluation {
    source_role: Option<Role>,
    default_role_applied: bool,
    verdict: Result<(), GovernanceError>,
}

/// Stateless decision engine over a shared `RoleRegistry`.
///
/// Cheap to clone; clones share the registry and the recorder.
#[derive(Clone)]
pub struct AuthorizationEnforcer {
    registry: Arc<RoleRegistry>,
    recorder: Arc<dyn DecisionRecorder>,
    strict_mode: bool,
    default_role: Role,
}

impl AuthorizationEnforcer {
    /// Create an enforcer in strict mode with `Observer` as the default role.
    pub fn new(registry: Arc<RoleRegistry>, recorder: Arc<dyn DecisionRecorder>) -> Self {
        Self {
            registry,
            recorder,
            strict_mode: true,
            default_role: Role::Observer,
        }
    }

    pub fn with_strict_mode(mut self, strict_mode: bool) -> Self {
        self.strict_mode = strict_mode;
        self
    }

    pub fn with_default_role(mut self, default_role: Role) -> Self {
        self.default_role = default_role;
        self
    }

    pub fn registry(&self) -> &Arc<RoleRegistry> {
        &self.registry
    }

    pub fn strict_mode(&self) -> bool {
        self.strict_mode
    }

    pub fn default_role(&self) -> Role {
        self.default_role
    }

    /// `validate_action` using this enforcer's configured strict mode and
    /// default role.
    pub fn authorize(
        &self,
        source: &AgentId,
        action: Action,
        target_agent: Option<&AgentId>,
        target_output: Option<&OutputId>,
    ) -> AuthorizationDecision {
        self.validate_action(
            source,
            action,
            target_agent,
            target_output,
            self.strict_mode,
            self.default_role,
        )
    }

    /// Decide whether `source` may perform `action`, optionally against a
    /// target agent and/or a target output.
    ///
    /// The default role substitutes for an unregistered source only for this
    /// call; the registry is never mutated here.
    pub fn validate_action(
        &self,
        source: &AgentId,
        action: Action,
        target_agent: Option<&AgentId>,
        target_output: Option<&OutputId>,
        strict_mode: bool,
        default_role: Role,
    ) -> AuthorizationDecision {
        let evaluation = self.evaluate(
            source,
            action,
            target_agent,
            target_output,
            strict_mode,
            default_role,
        );

        let (allowed, reason, detail, error) = match evaluation.verdict {
            Ok(()) => (true, ReasonCode::Allowed, String::new(), None),
            Err(err) => (false, reason_for(&err), err.to_string(), Some(err)),
        };

        let decision = AuthorizationDecision {
            id: uuid::Uuid::new_v4(),
            timestamp: Utc::now(),
            source_agent: source.clone(),
            action,
            target_agent: target_agent.cloned(),
            target_output: target_output.cloned(),
            source_role: evaluation.source_role,
            default_role_applied: evaluation.default_role_applied,
            allowed,
            reason,
            detail,
            error,
        };

        if decision.allowed {
            debug!(
                agent_id = %source,
                action = %action,
                role = ?decision.source_role,
                "action authorized"
            );
        } else {
            warn!(
                agent_id = %source,
                action = %action,
                reason = %decision.reason,
                detail = %decision.detail,
                "action denied"
            );
        }

        self.recorder.record(&decision);
        decision
    }

    fn evaluate(
        &self,
        source: &AgentId,
        action: Action,
        target_agent: Option<&AgentId>,
        target_output: Option<&OutputId>,
        strict_mode: bool,
        default_role: Role,
    ) -> Evaluation {
        // ── Rule 1: resolve the source role ──────────────────────────────────
        let (source_role, default_role_applied) = match self.registry.role_of(source) {
            Some(role) => (role, false),
            None if strict_mode => {
                return Evaluation {
                    source_role: None,
                    default_role_applied: false,
                    verdict: Err(GovernanceError::RoleNotAssigned {
                        agent_id: source.to_string(),
                    }),
                };
            }
            None => (default_role, true),
        };

        let deny = |err: GovernanceError| Evaluation {
            source_role: Some(source_role),
            default_role_applied,
            verdict: Err(err),
        };

        // ── Rule 2: action must be in the role's permission set ──────────────
        if !permission::is_permitted(source_role, action) {
            return deny(GovernanceError::RoleViolation {
                agent_id: source.to_string(),
                role: source_role,
                action,
            });
        }

        if action.is_judgement() {
            // ── Rule 3: no self-validation ───────────────────────────────────
            //
            // Identity first, then provenance. Neither depends on the other.
            if target_agent == Some(source) {
                return deny(GovernanceError::SelfValidationViolation {
                    agent_id: source.to_string(),
                    action,
                });
            }

            let producer = target_output.and_then(|output| self.registry.produced_by(output));
            if producer.as_ref() == Some(source) {
                return deny(GovernanceError::SelfValidationViolation {
                    agent_id: source.to_string(),
                    action,
                });
            }

            // ── Rule 4: cross-role validation matrix ─────────────────────────
            //
            // Targets are resolved strictly: the default role never applies.
            let targets = target_agent
                .into_iter()
                .cloned()
                .chain(producer.filter(|p| Some(p) != target_agent));

            for target in targets {
                let Some(target_role) = self.registry.role_of(&target) else {
                    return deny(GovernanceError::RoleNotAssigned {
                        agent_id: target.to_string(),
                    });
                };
                if !permission::may_judge(source_role, target_role) {
                    return deny(GovernanceError::CrossRoleViolation {
                        agent_id: source.to_string(),
                        source_role,
                        action,
                        target_agent: target.to_string(),
                        target_role,
                    });
                }
            }
        }

        // ── Rule 5: allow ────────────────────────────────────────────────────
        Evaluation {
            source_role: Some(source_role),
            default_role_applied,
            verdict: Ok(()),
        }
    }
}

fn reason_for(err: &GovernanceError) -> ReasonCode {
    match err {
        GovernanceError::RoleNotAssigned { .. } => ReasonCode::RoleNotAssigned,
        GovernanceError::RoleViolation { .. } => ReasonCode::RoleViolation,
        GovernanceError::SelfValidationViolation { .. } => ReasonCode::SelfValidationViolation,
        GovernanceError::CrossRoleViolation { .. } => ReasonCode::CrossRoleViolation,
        // The enforcer only produces the four variants above.
        _ => ReasonCode::RoleViolation,
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
