//! Agent identity and bus message types.
//!
//! These types describe the data the governance bus hands to the validation
//! pipeline. The pipeline never routes or stores messages; it only reads them.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{GovernanceError, GovernanceResult};

/// The constitutional hash every message must declare verbatim.
pub const CONSTITUTIONAL_HASH: &str = "cdd01ef066bc6cf2";

/// Stable identifier for an agent on the bus.
///
/// Used as the key in the role registry, in audit entries, and as the
/// sender/recipient of messages. Example: `AgentId("judicial-01")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AgentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Identifier of an output (proposal, synthesis, extracted rule set) that an
/// agent produced and that another agent may later validate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OutputId(pub String);

impl OutputId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for OutputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OutputId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Unique identifier for a single message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub uuid::Uuid);

impl MessageId {
    /// Create a new, unique message ID.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Discriminant describing what a message is for.
///
/// The authorization strategy infers the governed `Action` from this tag
/// unless the message metadata carries an explicit `action` hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Command,
    Query,
    Response,
    Event,
    Notification,
    Heartbeat,
    GovernanceRequest,
    GovernanceResponse,
    ConstitutionalValidation,
    TaskRequest,
    TaskResponse,
    AuditRequest,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Command => "command",
            MessageKind::Query => "query",
            MessageKind::Response => "response",
            MessageKind::Event => "event",
            MessageKind::Notification => "notification",
            MessageKind::Heartbeat => "heartbeat",
            MessageKind::GovernanceRequest => "governance_request",
            MessageKind::GovernanceResponse => "governance_response",
            MessageKind::ConstitutionalValidation => "constitutional_validation",
            MessageKind::TaskRequest => "task_request",
            MessageKind::TaskResponse => "task_response",
            MessageKind::AuditRequest => "audit_request",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
    Critical,
}

/// Lifecycle of a message on the bus.
///
/// ```text
/// pending → processing → validated → delivered | failed | expired
///                      → rejected  → failed | expired
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    Pending,
    Processing,
    Validated,
    Rejected,
    Delivered,
    Failed,
    Expired,
}

impl MessageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageStatus::Pending => "pending",
            MessageStatus::Processing => "processing",
            MessageStatus::Validated => "validated",
            MessageStatus::Rejected => "rejected",
            MessageStatus::Delivered => "delivered",
            MessageStatus::Failed => "failed",
            MessageStatus::Expired => "expired",
        }
    }

    /// Return true if the lifecycle allows moving from `self` to `next`.
    pub fn can_transition_to(&self, next: MessageStatus) -> bool {
        use MessageStatus::*;
        matches!(
            (self, next),
            (Pending, Processing)
                | (Pending, Expired)
                | (Processing, Validated)
                | (Processing, Rejected)
                | (Processing, Expired)
                | (Validated, Delivered)
                | (Validated, Failed)
                | (Validated, Expired)
                | (Rejected, Failed)
                | (Rejected, Expired)
        )
    }

    /// True once no further transition is possible.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            MessageStatus::Delivered | MessageStatus::Failed | MessageStatus::Expired
        )
    }
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single message travelling between agents.
///
/// The pipeline reads messages by reference and never retains them. Once a
/// message leaves `processing` its content is considered frozen; only the
/// lifecycle status moves forward, and only through `transition_to`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentMessage {
    pub id: MessageId,
    pub sender: AgentId,
    /// `None` for broadcast messages.
    pub recipient: Option<AgentId>,
    pub kind: MessageKind,
    /// Opaque body. The pipeline only inspects it through the policy evaluator.
    pub content: serde_json::Value,
    /// Hash the sender declares; compared verbatim against the expected constant.
    pub constitutional_hash: String,
    pub priority: Priority,
    status: MessageStatus,
    pub tenant_id: Option<String>,
    /// Free-form hints (`action`, `target_output`, `output_id`, ...).
    pub metadata: BTreeMap<String, serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AgentMessage {
    /// Create a pending message carrying the process-wide constitutional hash.
    pub fn new(sender: impl Into<AgentId>, kind: MessageKind, content: serde_json::Value) -> Self {
        let now = Utc::now();
        Self {
            id: MessageId::new(),
            sender: sender.into(),
            recipient: None,
            kind,
            content,
            constitutional_hash: CONSTITUTIONAL_HASH.to_string(),
            priority: Priority::default(),
            status: MessageStatus::Pending,
            tenant_id: None,
            metadata: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_recipient(mut self, recipient: impl Into<AgentId>) -> Self {
        self.recipient = Some(recipient.into());
        self
    }

    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.constitutional_hash = hash.into();
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_tenant(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn status(&self) -> MessageStatus {
        self.status
    }

    /// Read a string-valued metadata hint.
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(|v| v.as_str())
    }

    /// Advance the lifecycle status, rejecting transitions the state machine
    /// does not allow.
    pub fn transition_to(&mut self, next: MessageStatus) -> GovernanceResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(GovernanceError::InvalidStatusTransition {
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }
}

impl From<String> for AgentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}
