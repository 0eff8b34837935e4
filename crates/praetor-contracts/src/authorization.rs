//! Authorization decisions and their reason codes.
//!
//! Every call to the enforcer produces exactly one `AuthorizationDecision`,
//! allowed or not. The same value is returned to the caller and appended to
//! the audit log.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::GovernanceError,
    message::{AgentId, OutputId},
    role::{Action, Role},
};

/// Why the enforcer allowed or denied an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    Allowed,
    RoleNotAssigned,
    RoleViolation,
    SelfValidationViolation,
    CrossRoleViolation,
}

impl ReasonCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonCode::Allowed => "ALLOWED",
            ReasonCode::RoleNotAssigned => "ROLE_NOT_ASSIGNED",
            ReasonCode::RoleViolation => "ROLE_VIOLATION",
            ReasonCode::SelfValidationViolation => "SELF_VALIDATION_VIOLATION",
            ReasonCode::CrossRoleViolation => "CROSS_ROLE_VIOLATION",
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single allow/deny verdict from the authorization enforcer.
///
/// Also the audit-log entry type: it is immutable once built and carries
/// everything needed to reconstruct why the verdict was reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationDecision {
    pub id: uuid::Uuid,
    pub timestamp: DateTime<Utc>,
    pub source_agent: AgentId,
    pub action: Action,
    pub target_agent: Option<AgentId>,
    pub target_output: Option<OutputId>,
    /// The role the decision was evaluated under, if one was resolved.
    pub source_role: Option<Role>,
    /// True when the source was unregistered and the default role stood in.
    pub default_role_applied: bool,
    pub allowed: bool,
    pub reason: ReasonCode,
    /// Human-readable explanation; empty for allowed decisions.
    pub detail: String,
    /// The structured error behind a denial. Not serialized; `reason` and
    /// `detail` carry the same information in the audit trail.
    #[serde(skip)]
    pub error: Option<GovernanceError>,
}

impl AuthorizationDecision {
    /// The error describing this denial, or `None` when allowed.
    pub fn denial(&self) -> Option<&GovernanceError> {
        if self.allowed {
            None
        } else {
            self.error.as_ref()
        }
    }
}
