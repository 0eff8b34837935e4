//! The role registry: who holds which role, and who produced which output.
//!
//! Backed by sharded concurrent maps so that lookups for one agent never wait
//! on registration of another. Every mutation touches a single map entry
//! atomically; an abandoned caller cannot leave a half-written assignment.

use std::collections::HashSet;

use dashmap::{mapref::entry::Entry, DashMap};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use praetor_contracts::{
    error::{GovernanceError, GovernanceResult},
    message::{AgentId, OutputId},
    role::Role,
};

/// What happens to an agent's output records when it is unregistered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputRetention {
    /// Keep producer records indefinitely so self-validation stays detectable.
    #[default]
    Retain,
    /// Drop the agent's producer records together with its role.
    PurgeOnUnregister,
}

/// In-memory registry of role assignments and output provenance.
///
/// Construct one per engine and share it behind an `Arc`; there is no global
/// instance.
#[derive(Debug, Default)]
pub struct RoleRegistry {
    roles: DashMap<AgentId, Role>,
    /// output → the agent that first recorded it.
    producers: DashMap<OutputId, AgentId>,
    /// agent → every output it has recorded.
    outputs: DashMap<AgentId, HashSet<OutputId>>,
    retention: OutputRetention,
}

impl RoleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_retention(retention: OutputRetention) -> Self {
        Self {
            retention,
            ..Self::default()
        }
    }

    pub fn retention(&self) -> OutputRetention {
        self.retention
    }

    /// Assign `role` to `agent_id`.
    ///
    /// Fails with `AlreadyRegistered` if the agent already holds any role,
    /// including the same one. Reassignment goes through `unregister` first.
    pub fn register(&self, agent_id: AgentId, role: Role) -> GovernanceResult<()> {
        match self.roles.entry(agent_id) {
            Entry::Occupied(entry) => {
                let existing = *entry.get();
                warn!(
                    agent_id = %entry.key(),
                    existing = %existing,
                    requested = %role,
                    "registration rejected: agent already holds a role"
                );
                Err(GovernanceError::AlreadyRegistered {
                    agent_id: entry.key().to_string(),
                    existing,
                })
            }
            Entry::Vacant(entry) => {
                info!(agent_id = %entry.key(), role = %role, "agent registered");
                entry.insert(role);
                Ok(())
            }
        }
    }

    /// Remove the agent's role. Returns false if it held none.
    ///
    /// Output records survive unless the registry was built with
    /// `OutputRetention::PurgeOnUnregister`.
    pub fn unregister(&self, agent_id: &AgentId) -> bool {
        let removed = self.roles.remove(agent_id).is_some();
        if removed {
            info!(agent_id = %agent_id, "agent unregistered");
        }

        if self.retention == OutputRetention::PurgeOnUnregister {
            if let Some((_, owned)) = self.outputs.remove(agent_id) {
                for output in &owned {
                    self.producers.remove_if(output, |_, producer| producer == agent_id);
                }
                debug!(
                    agent_id = %agent_id,
                    purged = owned.len(),
                    "purged output records on unregister"
                );
            }
        }

        removed
    }

    pub fn role_of(&self, agent_id: &AgentId) -> Option<Role> {
        self.roles.get(agent_id).map(|entry| *entry.value())
    }

    pub fn is_registered(&self, agent_id: &AgentId) -> bool {
        self.roles.contains_key(agent_id)
    }

    /// Record that `agent_id` produced `output_id`.
    ///
    /// Idempotent: returns true only the first time the pair is recorded. An
    /// output already attributed to a different agent keeps its original
    /// producer.
    pub fn record_output(&self, agent_id: &AgentId, output_id: &OutputId) -> bool {
        let newly_recorded = match self.producers.entry(output_id.clone()) {
            Entry::Occupied(entry) => {
                if entry.get() != agent_id {
                    warn!(
                        output_id = %output_id,
                        producer = %entry.get(),
                        claimant = %agent_id,
                        "output already attributed to another agent; keeping original producer"
                    );
                }
                false
            }
            Entry::Vacant(entry) => {
                entry.insert(agent_id.clone());
                true
            }
        };

        if newly_recorded {
            self.outputs
                .entry(agent_id.clone())
                .or_default()
                .insert(output_id.clone());
            debug!(agent_id = %agent_id, output_id = %output_id, "output recorded");
        }

        newly_recorded
    }

    pub fn produced_by(&self, output_id: &OutputId) -> Option<AgentId> {
        self.producers
            .get(output_id)
            .map(|entry| entry.value().clone())
    }

    /// Every output recorded for `agent_id`, in no particular order.
    pub fn outputs_of(&self, agent_id: &AgentId) -> Vec<OutputId> {
        self.outputs
            .get(agent_id)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Snapshot of all current role assignments.
    pub fn agents(&self) -> Vec<(AgentId, Role)> {
        self.roles
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect()
    }

    /// Number of agents currently holding a role.
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}
