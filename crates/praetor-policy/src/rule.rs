//! Policy rule types and configuration schema.
//!
//! A `PolicyConfig` is deserialized from TOML and holds an ordered list of
//! `PolicyRule`s. Rules are evaluated in declaration order: the first rule
//! that matches wins. If no rule matches, the evaluator denies by default.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The decision a rule produces when it matches.
///
/// ```toml
/// verdict = "allow"
/// verdict = "deny"
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleVerdict {
    Allow,
    Deny,
}

fn wildcard() -> String {
    "*".to_string()
}

/// A single policy rule loaded from TOML.
///
/// Every pattern field accepts the wildcard `"*"` and defaults to it, so a
/// rule only constrains what it names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyRule {
    /// Stable identifier used in logs and denial reasons.
    pub id: String,

    /// Human-readable explanation of what this rule controls.
    #[serde(default)]
    pub description: String,

    /// Policy path this rule belongs to.
    #[serde(default = "wildcard")]
    pub policy: String,

    /// Matched against the input's `message_kind`.
    #[serde(default = "wildcard")]
    pub message_kind: String,

    /// Matched against the input's `sender`.
    #[serde(default = "wildcard")]
    pub sender: String,

    /// Matched against the input's `tenant_id`. A concrete pattern never
    /// matches an input without a tenant.
    #[serde(default = "wildcard")]
    pub tenant: String,

    /// Top-level `content` fields that MUST be present and non-null for this
    /// rule to produce its `verdict`. A missing field always yields a denial,
    /// even for an `allow` rule.
    #[serde(default)]
    pub required_content_fields: Vec<String>,

    pub verdict: RuleVerdict,

    /// Written into the denial when `verdict = "deny"`.
    pub deny_reason: Option<String>,
}

fn pattern_matches(pattern: &str, actual: Option<&str>) -> bool {
    pattern == "*" || actual == Some(pattern)
}

impl PolicyRule {
    /// Return true if this rule applies to `policy_path` and `input`.
    ///
    /// Matching is exact and case-sensitive outside of `"*"`.
    pub fn matches(&self, policy_path: &str, input: &Value) -> bool {
        let field = |name: &str| input.get(name).and_then(Value::as_str);

        pattern_matches(&self.policy, Some(policy_path))
            && pattern_matches(&self.message_kind, field("message_kind"))
            && pattern_matches(&self.sender, field("sender"))
            && pattern_matches(&self.tenant, field("tenant_id"))
    }

    /// The first required content field missing from `input`, if any.
    pub fn missing_content_field<'r>(&'r self, input: &Value) -> Option<&'r str> {
        let content = input.get("content");
        self.required_content_fields
            .iter()
            .find(|name| {
                content
                    .and_then(|c| c.get(name.as_str()))
                    .map_or(true, Value::is_null)
            })
            .map(String::as_str)
    }
}

/// The top-level structure deserialized from a TOML policy file.
///
/// ```toml
/// [[rules]]
/// id = "allow-governance-requests"
/// description = "Governance requests with a proposal id are allowed"
/// message_kind = "governance_request"
/// required_content_fields = ["proposal_id"]
/// verdict = "allow"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Ordered list of rules. First match wins.
    #[serde(default)]
    pub rules: Vec<PolicyRule>,
}
