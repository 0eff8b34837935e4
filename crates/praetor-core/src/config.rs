//! Engine configuration and agent roster loading.
//!
//! `EngineConfig` is deserialized from TOML. Every field has a default, so an
//! empty document yields a strict, fail-closed engine with no agents.
//!
//! ```toml
//! strict_mode = true
//! default_role = "observer"
//! audit_capacity = 10000
//!
//! [policy]
//! policy_path = "praetor/constitutional/allow"
//! fail_closed = true
//! timeout_ms = 50
//!
//! [agents]
//! "exec-1" = "executive"
//! "judge-1" = "judicial"
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use praetor_contracts::{
    error::{GovernanceError, GovernanceResult},
    message::{AgentId, CONSTITUTIONAL_HASH},
    role::Role,
};

use crate::registry::{OutputRetention, RoleRegistry};

/// How `apply_roster` treats an agent that is already registered with a
/// different role than the one configured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReloadMode {
    /// Report a conflict and keep the existing role.
    #[default]
    Reject,
    /// Unregister and re-register with the configured role.
    Replace,
}

/// Settings for the policy-backed validation strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicySettings {
    pub policy_path: String,
    /// Deny when the evaluator fails. Setting this to false is an explicit
    /// operator opt-out and is surfaced as a warning on every failure.
    pub fail_closed: bool,
    pub timeout_ms: u64,
    pub cache_ttl_secs: u64,
    pub max_cache_entries: usize,
    /// Upper bound on in-flight evaluator calls.
    pub max_concurrency: usize,
}

impl Default for PolicySettings {
    fn default() -> Self {
        Self {
            policy_path: "praetor/constitutional/allow".to_string(),
            fail_closed: true,
            timeout_ms: 50,
            cache_ttl_secs: 300,
            max_cache_entries: 10_000,
            max_concurrency: 64,
        }
    }
}

impl PolicySettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Deny actions by unregistered agents instead of applying `default_role`.
    pub strict_mode: bool,
    pub default_role: Role,
    pub expected_hash: String,
    /// Capacity of the in-memory audit ring buffer.
    pub audit_capacity: usize,
    /// Capacity of the queue feeding the external audit sink.
    pub export_queue_capacity: usize,
    /// Skip the remaining strategies once the hash check fails.
    pub short_circuit_on_hash: bool,
    /// Record allowed proposals/syntheses as outputs of their sender.
    pub record_outputs: bool,
    pub output_retention: OutputRetention,
    pub reload_mode: ReloadMode,
    /// Absent means the pipeline runs without a policy-backed strategy.
    pub policy: Option<PolicySettings>,
    /// Agent roster: agent id → role.
    pub agents: BTreeMap<String, Role>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            strict_mode: true,
            default_role: Role::Observer,
            expected_hash: CONSTITUTIONAL_HASH.to_string(),
            audit_capacity: 10_000,
            export_queue_capacity: 1_024,
            short_circuit_on_hash: true,
            record_outputs: true,
            output_retention: OutputRetention::Retain,
            reload_mode: ReloadMode::Reject,
            policy: None,
            agents: BTreeMap::new(),
        }
    }
}

/// Summary of one `apply_roster` pass.
#[derive(Debug, Default)]
pub struct RosterReport {
    pub registered: Vec<AgentId>,
    pub unchanged: Vec<AgentId>,
    pub replaced: Vec<AgentId>,
    pub conflicts: Vec<GovernanceError>,
}

impl EngineConfig {
    /// Parse `s` as TOML and validate the result.
    ///
    /// Returns `GovernanceError::ConfigError` if the TOML is malformed, does
    /// not match the schema, or fails validation.
    pub fn from_toml_str(s: &str) -> GovernanceResult<Self> {
        let config: EngineConfig = toml::from_str(s).map_err(|e| GovernanceError::ConfigError {
            reason: format!("failed to parse engine TOML: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read the file at `path` and parse it as engine configuration.
    pub fn from_file(path: &Path) -> GovernanceResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| GovernanceError::ConfigError {
            reason: format!("failed to read config file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> GovernanceResult<()> {
        if self.expected_hash.trim().is_empty() {
            return Err(config_error("expected_hash must not be empty"));
        }
        if self.audit_capacity == 0 {
            return Err(config_error("audit_capacity must be greater than zero"));
        }
        if self.export_queue_capacity == 0 {
            return Err(config_error("export_queue_capacity must be greater than zero"));
        }
        if let Some(policy) = &self.policy {
            if policy.timeout_ms == 0 {
                return Err(config_error("policy.timeout_ms must be greater than zero"));
            }
            if policy.max_concurrency == 0 {
                return Err(config_error("policy.max_concurrency must be greater than zero"));
            }
            if policy.policy_path.trim().is_empty() {
                return Err(config_error("policy.policy_path must not be empty"));
            }
            if !policy.fail_closed {
                warn!(
                    policy_path = %policy.policy_path,
                    "policy strategy configured fail-open; evaluator failures will be allowed with a warning"
                );
            }
        }
        Ok(())
    }

    /// Build an empty registry honoring `output_retention`.
    pub fn build_registry(&self) -> RoleRegistry {
        RoleRegistry::with_retention(self.output_retention)
    }

    /// Register every roster entry with `registry`.
    ///
    /// Agents already holding the configured role are left alone. Agents
    /// holding a different role are reported as conflicts, or re-registered
    /// when `reload_mode = "replace"`.
    pub fn apply_roster(&self, registry: &RoleRegistry) -> RosterReport {
        let mut report = RosterReport::default();

        for (name, role) in &self.agents {
            let agent_id = AgentId::new(name.as_str());

            match registry.role_of(&agent_id) {
                Some(existing) if existing == *role => report.unchanged.push(agent_id),
                Some(existing) => match self.reload_mode {
                    ReloadMode::Reject => {
                        warn!(
                            agent_id = %agent_id,
                            existing = %existing,
                            configured = %role,
                            "roster role change rejected"
                        );
                        report.conflicts.push(GovernanceError::AlreadyRegistered {
                            agent_id: agent_id.to_string(),
                            existing,
                        });
                    }
                    ReloadMode::Replace => {
                        registry.unregister(&agent_id);
                        match registry.register(agent_id.clone(), *role) {
                            Ok(()) => report.replaced.push(agent_id),
                            Err(e) => report.conflicts.push(e),
                        }
                    }
                },
                None => match registry.register(agent_id.clone(), *role) {
                    Ok(()) => report.registered.push(agent_id),
                    Err(e) => report.conflicts.push(e),
                },
            }
        }

        info!(
            registered = report.registered.len(),
            unchanged = report.unchanged.len(),
            replaced = report.replaced.len(),
            conflicts = report.conflicts.len(),
            "agent roster applied"
        );
        report
    }
}

fn config_error(reason: &str) -> GovernanceError {
    GovernanceError::ConfigError {
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_strict_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert!(config.strict_mode);
        assert_eq!(config.default_role, Role::Observer);
        assert_eq!(config.expected_hash, CONSTITUTIONAL_HASH);
        assert!(config.policy.is_none());
        assert!(config.agents.is_empty());
    }

    #[test]
    fn full_document_parses() {
        let toml = r#"
            strict_mode = false
            default_role = "observer"
            short_circuit_on_hash = false
            output_retention = "purge-on-unregister"
            reload_mode = "replace"

            [policy]
            policy_path = "governance/messages"
            fail_closed = true
            timeout_ms = 20

            [agents]
            "exec-1" = "executive"
            "judge-1" = "judicial"
        "#;

        let config = EngineConfig::from_toml_str(toml).unwrap();
        assert!(!config.strict_mode);
        assert_eq!(config.output_retention, OutputRetention::PurgeOnUnregister);
        assert_eq!(config.reload_mode, ReloadMode::Replace);

        let policy = config.policy.as_ref().unwrap();
        assert_eq!(policy.policy_path, "governance/messages");
        assert_eq!(policy.timeout(), Duration::from_millis(20));
        assert_eq!(policy.max_concurrency, 64, "unset fields take defaults");
        assert_eq!(config.agents.get("judge-1"), Some(&Role::Judicial));
    }

    #[test]
    fn malformed_toml_is_config_error() {
        match EngineConfig::from_toml_str("this is not valid toml ][[[") {
            Err(GovernanceError::ConfigError { reason }) => {
                assert!(reason.contains("failed to parse engine TOML"), "got: {reason}");
            }
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn unknown_role_is_config_error() {
        let toml = r#"
            [agents]
            "exec-1" = "emperor"
        "#;
        assert!(matches!(
            EngineConfig::from_toml_str(toml),
            Err(GovernanceError::ConfigError { .. })
        ));
    }

    #[test]
    fn zero_capacity_fails_validation() {
        match EngineConfig::from_toml_str("audit_capacity = 0") {
            Err(GovernanceError::ConfigError { reason }) => {
                assert!(reason.contains("audit_capacity"));
            }
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn roster_registers_and_reports_conflicts() {
        let toml = r#"
            [agents]
            "exec-1" = "executive"
            "judge-1" = "judicial"
        "#;
        let config = EngineConfig::from_toml_str(toml).unwrap();
        let registry = config.build_registry();
        registry.register(AgentId::new("judge-1"), Role::Observer).unwrap();

        let report = config.apply_roster(&registry);
        assert_eq!(report.registered, vec![AgentId::new("exec-1")]);
        assert_eq!(report.conflicts.len(), 1);
        assert_eq!(registry.role_of(&AgentId::new("judge-1")), Some(Role::Observer));

        // A second pass is a no-op for agents that already match.
        let again = config.apply_roster(&registry);
        assert_eq!(again.unchanged, vec![AgentId::new("exec-1")]);
    }

    #[test]
    fn roster_replace_mode_reassigns_roles() {
        let toml = r#"
            reload_mode = "replace"
            [agents]
            "judge-1" = "judicial"
        "#;
        let config = EngineConfig::from_toml_str(toml).unwrap();
        let registry = config.build_registry();
        registry.register(AgentId::new("judge-1"), Role::Observer).unwrap();

        let report = config.apply_roster(&registry);
        assert_eq!(report.replaced, vec![AgentId::new("judge-1")]);
        assert_eq!(registry.role_of(&AgentId::new("judge-1")), Some(Role::Judicial));
    }
}
