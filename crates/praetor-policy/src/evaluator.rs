//! TOML-driven policy evaluator.
//!
//! `TomlPolicyEvaluator` loads a `PolicyConfig` from a TOML string or file
//! and implements `PolicyEvaluator` from praetor-core. It runs in-process,
//! so it never reports itself unavailable; remote evaluators plug into the
//! same trait.
//!
//! Evaluation algorithm:
//!
//! 1. Iterate rules in declaration order.
//! 2. For the first rule whose patterns match the policy path and input:
//!    a. Every `required_content_fields` entry must be present and non-null,
//!       otherwise deny (the rule's own verdict is overridden).
//!    b. Return the rule's verdict.
//! 3. If no rule matched, deny with "denied by default".

use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use praetor_contracts::{
    error::{GovernanceError, GovernanceResult},
    policy::PolicyOutcome,
};
use praetor_core::traits::PolicyEvaluator;

use crate::rule::{PolicyConfig, RuleVerdict};

/// A `PolicyEvaluator` implementation that reads rules from a TOML document.
///
/// ```rust,ignore
/// use praetor_policy::TomlPolicyEvaluator;
///
/// let evaluator = TomlPolicyEvaluator::from_file(Path::new("policies/bus.toml"))?;
/// ```
#[derive(Debug)]
pub struct TomlPolicyEvaluator {
    config: PolicyConfig,
}

impl TomlPolicyEvaluator {
    /// Parse `s` as TOML and build an evaluator.
    ///
    /// Returns `GovernanceError::ConfigError` if the TOML is malformed or
    /// does not match the `PolicyConfig` schema.
    pub fn from_toml_str(s: &str) -> GovernanceResult<Self> {
        let config: PolicyConfig = toml::from_str(s).map_err(|e| GovernanceError::ConfigError {
            reason: format!("failed to parse policy TOML: {}", e),
        })?;
        Ok(Self { config })
    }

    pub fn from_file(path: &Path) -> GovernanceResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| GovernanceError::ConfigError {
            reason: format!("failed to read policy file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn rule_count(&self) -> usize {
        self.config.rules.len()
    }

    /// Synchronous core of `evaluate`; the evaluator does no I/O.
    pub fn decide(&self, policy_path: &str, input: &Value) -> PolicyOutcome {
        for rule in &self.config.rules {
            if !rule.matches(policy_path, input) {
                continue;
            }

            debug!(rule_id = %rule.id, policy_path = %policy_path, "policy rule matched");

            if let Some(field) = rule.missing_content_field(input) {
                warn!(
                    rule_id = %rule.id,
                    field = %field,
                    "matched rule requires a content field the message does not carry"
                );
                return PolicyOutcome::deny(format!(
                    "rule '{}' requires content field '{}' which is missing",
                    rule.id, field
                ));
            }

            return match rule.verdict {
                RuleVerdict::Allow => PolicyOutcome::allow(),
                RuleVerdict::Deny => PolicyOutcome::deny(
                    rule.deny_reason
                        .clone()
                        .unwrap_or_else(|| format!("denied by rule '{}'", rule.id)),
                ),
            };
        }

        warn!(policy_path = %policy_path, "no policy rule matched; denying by default");
        PolicyOutcome::deny(format!(
            "denied by default: no policy rule matched under '{}'",
            policy_path
        ))
    }
}

#[async_trait]
impl PolicyEvaluator for TomlPolicyEvaluator {
    async fn evaluate(&self, policy_path: &str, input: &Value) -> GovernanceResult<PolicyOutcome> {
        Ok(self.decide(policy_path, input))
    }
}
