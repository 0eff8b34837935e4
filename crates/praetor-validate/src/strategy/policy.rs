//! Policy-backed validation.
//!
//! The strategy projects a message onto a fixed set of fields, keys the
//! evaluator call by the SHA-256 of their canonical form, and caches
//! definitive outcomes for the configured TTL. Evaluator calls are bounded
//! by a semaphore, and the configured timeout covers both waiting for a
//! permit and the evaluation itself.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use praetor_contracts::{
    error::GovernanceError, message::AgentMessage, policy::PolicyOutcome,
    validation::ValidationResult,
};
use praetor_core::{
    traits::{PolicyEvaluator, ValidationStrategy},
    PolicySettings,
};
use praetor_policy::{canonical::content_hash, DecisionCache};

/// The evaluator input for `message`.
///
/// Identifiers, timestamps and lifecycle status are left out so that two
/// messages with the same governed content share a cache entry.
pub fn policy_input(message: &AgentMessage) -> Value {
    json!({
        "sender": message.sender.as_str(),
        "recipient": message.recipient.as_ref().map(|r| r.as_str()),
        "message_kind": message.kind.as_str(),
        "priority": message.priority,
        "tenant_id": message.tenant_id,
        "content": message.content,
        "metadata": message.metadata,
        "constitutional_hash": message.constitutional_hash,
    })
}

pub struct PolicyValidationStrategy {
    evaluator: Arc<dyn PolicyEvaluator>,
    settings: PolicySettings,
    cache: DecisionCache,
    permits: Semaphore,
}

impl PolicyValidationStrategy {
    pub fn new(evaluator: Arc<dyn PolicyEvaluator>, settings: PolicySettings) -> Self {
        let cache = DecisionCache::new(settings.cache_ttl(), settings.max_cache_entries);
        let permits = Semaphore::new(settings.max_concurrency.max(1));
        Self {
            evaluator,
            settings,
            cache,
            permits,
        }
    }

    pub fn settings(&self) -> &PolicySettings {
        &self.settings
    }

    pub fn cache(&self) -> &DecisionCache {
        &self.cache
    }

    async fn evaluate_bounded(&self, input: &Value) -> Result<PolicyOutcome, GovernanceError> {
        let call = async {
            let _permit = self
                .permits
                .acquire()
                .await
                .map_err(|_| GovernanceError::PolicyEvaluation {
                    reason: "policy evaluator permits closed".to_string(),
                })?;
            self.evaluator
                .evaluate(&self.settings.policy_path, input)
                .await
        };

        match tokio::time::timeout(self.settings.timeout(), call).await {
            Ok(Ok(outcome)) => Ok(outcome),
            Ok(Err(err @ GovernanceError::PolicyEvaluation { .. })) => Err(err),
            Ok(Err(other)) => Err(GovernanceError::PolicyEvaluation {
                reason: other.to_string(),
            }),
            Err(_) => Err(GovernanceError::PolicyEvaluation {
                reason: format!(
                    "evaluator did not answer within {}ms",
                    self.settings.timeout_ms
                ),
            }),
        }
    }

    fn from_outcome(&self, outcome: PolicyOutcome) -> ValidationResult {
        let mut result = ValidationResult::valid();
        if outcome.allow {
            for note in outcome.errors {
                result.add_warning(note);
            }
            return result;
        }

        if outcome.errors.is_empty() {
            result.add_error(format!(
                "policy '{}' denied the message",
                self.settings.policy_path
            ));
        }
        for reason in outcome.errors {
            result.add_error(format!("policy denied: {reason}"));
        }
        result
    }

    fn from_failure(&self, err: GovernanceError) -> ValidationResult {
        if self.settings.fail_closed {
            warn!(
                policy_path = %self.settings.policy_path,
                error = %err,
                "policy evaluation failed; denying"
            );
            return ValidationResult::from_error(&err);
        }

        warn!(
            policy_path = %self.settings.policy_path,
            error = %err,
            "policy evaluation failed; allowing because fail_closed is disabled"
        );
        let mut result = ValidationResult::valid().with_metadata("policy_fail_open", json!(true));
        result.add_warning(format!("[{}] {} (fail-open)", err.code(), err));
        result
    }
}

#[async_trait]
impl ValidationStrategy for PolicyValidationStrategy {
    fn name(&self) -> &str {
        "policy"
    }

    async fn validate(&self, message: &AgentMessage) -> ValidationResult {
        let input = policy_input(message);
        let key = match content_hash(&self.settings.policy_path, &input) {
            Ok(key) => key,
            Err(err) => return self.from_failure(err),
        };

        if let Some(outcome) = self.cache.get(&key) {
            debug!(message_id = %message.id, "policy decision served from cache");
            return self
                .from_outcome(outcome)
                .with_metadata("policy_cache_hit", json!(true));
        }

        match self.evaluate_bounded(&input).await {
            Ok(outcome) => {
                debug!(
                    message_id = %message.id,
                    allow = outcome.allow,
                    "policy evaluated"
                );
                self.cache.insert(key, outcome.clone());
                self.from_outcome(outcome)
                    .with_metadata("policy_cache_hit", json!(false))
            }
            Err(err) => self.from_failure(err),
        }
    }
}
