//! Validation results produced by the strategy chain.
//!
//! A `ValidationResult` can only become valid through `ValidationResult::valid()`;
//! every other mutation moves it towards DENY. Fields are private so the
//! invariants below cannot be broken from outside this module:
//!
//! - `is_valid == false` whenever `errors` is non-empty
//! - `decision == Deny` whenever `is_valid == false`

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::GovernanceError;

/// The final verdict the bus acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Decision {
    Allow,
    Deny,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Allow => f.write_str("ALLOW"),
            Decision::Deny => f.write_str("DENY"),
        }
    }
}

/// Outcome of running one or more validation strategies against a message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    is_valid: bool,
    /// In detection order; duplicates are kept.
    errors: Vec<String>,
    warnings: Vec<String>,
    decision: Decision,
    metadata: BTreeMap<String, serde_json::Value>,
}

impl ValidationResult {
    /// A passing result with no findings. Also the identity element of `merge`.
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            decision: Decision::Allow,
            metadata: BTreeMap::new(),
        }
    }

    /// A failing result carrying a single error message.
    pub fn invalid(error: impl Into<String>) -> Self {
        let mut result = Self::valid();
        result.add_error(error);
        result
    }

    /// A failing result carrying a rendered `GovernanceError`.
    pub fn from_error(error: &GovernanceError) -> Self {
        let mut result = Self::valid();
        result.add_governance_error(error);
        result
    }

    /// Record an error. The result becomes invalid and its decision DENY.
    pub fn add_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
        self.is_valid = false;
        self.decision = Decision::Deny;
    }

    /// Record a `GovernanceError` as `"[CODE] message"`.
    pub fn add_governance_error(&mut self, error: &GovernanceError) {
        self.add_error(format!("[{}] {}", error.code(), error));
    }

    /// Record a warning. Warnings never change the decision.
    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    pub fn insert_metadata(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.metadata.insert(key.into(), value);
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.insert_metadata(key, value);
        self
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn decision(&self) -> Decision {
        self.decision
    }

    pub fn metadata(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.metadata
    }

    /// True if any recorded error carries the given `GovernanceError::code()`.
    pub fn has_error_code(&self, code: &str) -> bool {
        let tag = format!("[{code}]");
        self.errors.iter().any(|e| e.starts_with(&tag))
    }

    /// Merge `other` into `self`.
    ///
    /// Errors and warnings concatenate (self first), validity is the logical
    /// AND, the decision is DENY if either side is DENY, and metadata is a
    /// right-biased key union. All four rules are associative.
    pub fn merge_from(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        self.is_valid = self.is_valid && other.is_valid;
        if other.decision == Decision::Deny {
            self.decision = Decision::Deny;
        }
        self.metadata.extend(other.metadata);
    }

    /// Consuming form of `merge_from`.
    pub fn merge(mut self, other: ValidationResult) -> Self {
        self.merge_from(other);
        self
    }
}
