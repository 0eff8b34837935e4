//! Wiring for the demo: config, roster, audit log, exporter, and pipeline.

use std::path::Path;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use praetor_audit::{AuditExporter, DecisionLog, HashChainSink};
use praetor_contracts::{
    error::{GovernanceError, GovernanceResult},
    message::AgentMessage,
    validation::{Decision, ValidationResult},
};
use praetor_core::{EngineConfig, RoleRegistry};
use praetor_policy::TomlPolicyEvaluator;
use praetor_validate::ValidationPipeline;

const DEFAULT_CONFIG: &str = include_str!("../config/praetor.toml");
const DEFAULT_POLICY: &str = include_str!("../config/policy.toml");

pub struct Engine {
    pipeline: ValidationPipeline,
    log: Arc<DecisionLog>,
    chain: HashChainSink,
    exporter_task: JoinHandle<()>,
    unexpected: usize,
}

impl Engine {
    /// Load configuration and policy (bundled defaults when no path is given)
    /// and start the audit exporter on the current runtime.
    pub fn load(config_path: Option<&Path>, policy_path: Option<&Path>) -> GovernanceResult<Self> {
        let config = match config_path {
            Some(path) => EngineConfig::from_file(path)?,
            None => EngineConfig::from_toml_str(DEFAULT_CONFIG)?,
        };
        let evaluator = match policy_path {
            Some(path) => TomlPolicyEvaluator::from_file(path)?,
            None => TomlPolicyEvaluator::from_toml_str(DEFAULT_POLICY)?,
        };

        let registry = Arc::new(config.build_registry());
        let report = config.apply_roster(&registry);
        if let Some(conflict) = report.conflicts.into_iter().next() {
            return Err(conflict);
        }

        let chain = HashChainSink::new("praetor-demo");
        let (exporter, exporter_task) =
            AuditExporter::spawn(Arc::new(chain.clone()), config.export_queue_capacity);
        let log = Arc::new(DecisionLog::new(config.audit_capacity).with_exporter(exporter));

        println!(
            "  Roster: {} agent(s) registered, {} policy rule(s) loaded",
            report.registered.len(),
            evaluator.rule_count()
        );
        println!();

        info!(
            agents = report.registered.len(),
            rules = evaluator.rule_count(),
            audit_capacity = config.audit_capacity,
            "demo engine loaded"
        );

        let pipeline = ValidationPipeline::builder(config, registry, log.clone())
            .with_policy_evaluator(Arc::new(evaluator))
            .build()?;

        Ok(Self {
            pipeline,
            log,
            chain,
            exporter_task,
            unexpected: 0,
        })
    }

    pub fn registry(&self) -> &Arc<RoleRegistry> {
        self.pipeline.registry()
    }

    /// Run `message` through the pipeline and print the outcome next to the
    /// expected decision.
    pub async fn submit(
        &mut self,
        label: &str,
        mut message: AgentMessage,
        expected: Decision,
    ) -> GovernanceResult<ValidationResult> {
        let result = self.pipeline.process(&mut message).await?;

        println!("  {label}");
        println!(
            "    {} → {} ({})",
            message.sender,
            message.kind,
            message.status()
        );
        println!("    Decision:  {}", result.decision());
        for error in result.errors() {
            println!("    Error:     {error}");
        }
        for warning in result.warnings() {
            println!("    Warning:   {warning}");
        }

        info!(
            scenario = label,
            message_id = %message.id,
            decision = %result.decision(),
            expected = %expected,
            "scenario step submitted"
        );

        if result.decision() == expected {
            println!("    RESULT: {} (expected)", result.decision());
        } else {
            self.unexpected += 1;
            warn!(
                scenario = label,
                decision = %result.decision(),
                expected = %expected,
                "unexpected outcome"
            );
            println!("    RESULT: {} (UNEXPECTED, wanted {expected})", result.decision());
        }
        println!();
        Ok(result)
    }

    /// Close the exporter, wait for it to drain, and report the audit trail.
    ///
    /// Returns the number of outcomes that did not match expectations.
    pub async fn shutdown(self) -> GovernanceResult<usize> {
        let Engine {
            pipeline,
            log,
            chain,
            exporter_task,
            unexpected,
        } = self;

        let retained = log.len();
        let evicted = log.evicted();
        let dropped = log.export_stats().map(|s| s.dropped).unwrap_or_default();

        // The exporter task ends once its last sender is gone.
        drop(pipeline);
        drop(log);
        exporter_task
            .await
            .map_err(|e| GovernanceError::AuditSinkFailed {
                reason: format!("audit exporter task failed: {e}"),
            })?;

        let sealed = chain.export_log();
        let verified = chain.verify_integrity();
        info!(
            retained,
            evicted,
            exported = sealed.events.len(),
            dropped,
            verified,
            unexpected,
            "demo engine shut down"
        );

        println!("=== Audit trail ===");
        println!();
        println!("  Decisions retained:     {retained} ({evicted} evicted)");
        println!("  Decisions exported:     {} ({dropped} dropped)", sealed.events.len());
        println!(
            "  Audit chain integrity:  {}",
            if verified { "VERIFIED" } else { "FAILED" }
        );
        println!("  Terminal hash:          {}", sealed.terminal_hash);
        println!();
        Ok(unexpected)
    }
}
