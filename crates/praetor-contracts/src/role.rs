//! Separation-of-powers roles and the actions they govern.
//!
//! Both enumerations are closed: the engine never learns new roles or actions
//! at runtime. Parsing is case-insensitive and accepts the snake_case names
//! used in configuration files and message metadata.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The branch of governance an agent belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Executive,
    Legislative,
    Judicial,
    Observer,
}

impl Role {
    /// Every role, in declaration order.
    pub const ALL: [Role; 4] = [
        Role::Executive,
        Role::Legislative,
        Role::Judicial,
        Role::Observer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Executive => "executive",
            Role::Legislative => "legislative",
            Role::Judicial => "judicial",
            Role::Observer => "observer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "executive" => Ok(Role::Executive),
            "legislative" => Ok(Role::Legislative),
            "judicial" => Ok(Role::Judicial),
            "observer" => Ok(Role::Observer),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// An action an agent may attempt on the governance bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Propose,
    ExtractRules,
    Validate,
    Audit,
    Synthesize,
    Query,
}

impl Action {
    /// Every action, in declaration order.
    pub const ALL: [Action; 6] = [
        Action::Propose,
        Action::ExtractRules,
        Action::Validate,
        Action::Audit,
        Action::Synthesize,
        Action::Query,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Propose => "propose",
            Action::ExtractRules => "extract_rules",
            Action::Validate => "validate",
            Action::Audit => "audit",
            Action::Synthesize => "synthesize",
            Action::Query => "query",
        }
    }

    /// True for the actions that judge another agent's output.
    pub fn is_judgement(&self) -> bool {
        matches!(self, Action::Validate | Action::Audit)
    }

    /// True for the actions whose result is an output attributable to the actor.
    pub fn produces_output(&self) -> bool {
        matches!(
            self,
            Action::Propose | Action::Synthesize | Action::ExtractRules
        )
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "propose" => Ok(Action::Propose),
            "extract_rules" => Ok(Action::ExtractRules),
            "validate" => Ok(Action::Validate),
            "audit" => Ok(Action::Audit),
            "synthesize" => Ok(Action::Synthesize),
            "query" => Ok(Action::Query),
            other => Err(format!("unknown action '{other}'")),
        }
    }
}
