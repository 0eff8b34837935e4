//! Role-separation check for bus messages.
//!
//! Each message is mapped onto an `Action` and handed to the
//! `AuthorizationEnforcer` with the sender as the acting agent. For
//! Validate/Audit the recipient is the judged agent and the optional
//! `target_output` metadata hint names the judged output.
//!
//! An allowed Propose/ExtractRules/Synthesize only claims its output under
//! the `produced_output` result key. The registry is written by the pipeline
//! once the merged verdict is known, so a message rejected by a later check
//! never becomes the recorded producer of anything.

use std::str::FromStr;

use async_trait::async_trait;
use serde_json::json;

use praetor_contracts::{
    error::GovernanceError,
    message::{AgentMessage, MessageKind, OutputId},
    role::Action,
    validation::ValidationResult,
};
use praetor_core::{traits::ValidationStrategy, AuthorizationEnforcer};

/// The action a message kind stands for when no `action` hint is present.
pub fn action_for_kind(kind: MessageKind) -> Action {
    match kind {
        MessageKind::Command | MessageKind::TaskRequest | MessageKind::GovernanceRequest => {
            Action::Propose
        }
        MessageKind::ConstitutionalValidation | MessageKind::GovernanceResponse => {
            Action::Validate
        }
        MessageKind::AuditRequest => Action::Audit,
        MessageKind::TaskResponse => Action::Synthesize,
        MessageKind::Query
        | MessageKind::Heartbeat
        | MessageKind::Response
        | MessageKind::Event
        | MessageKind::Notification => Action::Query,
    }
}

/// Result metadata key carrying the output id an allowed message produces.
pub const PRODUCED_OUTPUT_KEY: &str = "produced_output";

/// Resolve the governed action: metadata `action` hint first, kind second.
/// An unparseable hint is an error rather than a silent fallback.
pub fn infer_action(message: &AgentMessage) -> Result<Action, String> {
    match message.metadata.get("action") {
        None => Ok(action_for_kind(message.kind)),
        Some(hint) => hint
            .as_str()
            .ok_or_else(|| format!("action hint must be a string, got {hint}"))
            .and_then(Action::from_str),
    }
}

pub struct AuthorizationStrategy {
    enforcer: AuthorizationEnforcer,
}

impl AuthorizationStrategy {
    pub fn new(enforcer: AuthorizationEnforcer) -> Self {
        Self { enforcer }
    }

    pub fn enforcer(&self) -> &AuthorizationEnforcer {
        &self.enforcer
    }
}

#[async_trait]
impl ValidationStrategy for AuthorizationStrategy {
    fn name(&self) -> &str {
        "authorization"
    }

    async fn validate(&self, message: &AgentMessage) -> ValidationResult {
        let action = match infer_action(message) {
            Ok(action) => action,
            Err(reason) => {
                return ValidationResult::from_error(&GovernanceError::StrategyFault {
                    strategy: self.name().to_string(),
                    reason,
                });
            }
        };

        let (target_agent, target_output) = if action.is_judgement() {
            (
                message.recipient.as_ref(),
                message.metadata_str("target_output").map(OutputId::new),
            )
        } else {
            (None, None)
        };

        let decision = self.enforcer.authorize(
            &message.sender,
            action,
            target_agent,
            target_output.as_ref(),
        );

        let mut result = match decision.denial() {
            None => ValidationResult::valid(),
            Some(err) => ValidationResult::from_error(err),
        };
        result.insert_metadata("action", json!(action.as_str()));
        result.insert_metadata("authorization_reason", json!(decision.reason.as_str()));
        result.insert_metadata("authorization_decision_id", json!(decision.id.to_string()));

        if decision.allowed && action.produces_output() {
            let output_id = message
                .metadata_str("output_id")
                .map(str::to_string)
                .unwrap_or_else(|| message.id.to_string());
            result.insert_metadata(PRODUCED_OUTPUT_KEY, json!(output_id));
        }

        result
    }
}
