//! # praetor-validate
//!
//! Fail-closed validation for every message on the agent bus.
//!
//! This crate provides the [`ValidationStrategy`](praetor_core::traits::ValidationStrategy)
//! implementations and the [`ValidationPipeline`] that composes them:
//!
//! - [`HashValidationStrategy`] checks the declared constitutional hash.
//! - [`AuthorizationStrategy`] applies role separation through the enforcer.
//! - [`PolicyValidationStrategy`] consults an external policy evaluator with
//!   caching, bounded concurrency, and a strict timeout.
//! - [`CompositeStrategy`] runs children in order and merges their results.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use praetor_audit::DecisionLog;
//! use praetor_core::EngineConfig;
//! use praetor_validate::ValidationPipeline;
//!
//! let config = EngineConfig::from_file(Path::new("praetor.toml"))?;
//! let registry = Arc::new(config.build_registry());
//! config.apply_roster(&registry);
//! let log = Arc::new(DecisionLog::new(config.audit_capacity));
//!
//! let pipeline = ValidationPipeline::builder(config, registry, log).build()?;
//! let result = pipeline.validate(&message).await;
//! ```

pub mod pipeline;
pub mod strategy;

pub use pipeline::{PipelineBuilder, ValidationPipeline};
pub use strategy::{
    AuthorizationStrategy, CompositeStrategy, HashValidationStrategy, PolicyValidationStrategy,
};

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use praetor_audit::DecisionLog;
    use praetor_contracts::{
        authorization::ReasonCode,
        error::GovernanceError,
        message::{AgentId, AgentMessage, MessageKind, MessageStatus, OutputId},
        validation::Decision,
    };
    use praetor_core::{EngineConfig, PolicySettings, RoleRegistry};
    use praetor_policy::TomlPolicyEvaluator;

    use crate::ValidationPipeline;

    const ROSTER: &str = r#"
        [agents]
        "exec-1" = "executive"
        "leg-1" = "legislative"
        "judge-1" = "judicial"
        "judge-2" = "judicial"
        "obs-1" = "observer"
    "#;

    // ── Helpers ───────────────────────────────────────────────────────────────

    struct Harness {
        pipeline: ValidationPipeline,
        registry: Arc<RoleRegistry>,
        log: Arc<DecisionLog>,
    }

    fn harness_with(config: EngineConfig) -> Harness {
        let registry = Arc::new(config.build_registry());
        let report = config.apply_roster(&registry);
        assert!(report.conflicts.is_empty());

        let log = Arc::new(DecisionLog::new(config.audit_capacity));
        let pipeline = ValidationPipeline::builder(config, registry.clone(), log.clone())
            .build()
            .unwrap();
        Harness {
            pipeline,
            registry,
            log,
        }
    }

    fn harness() -> Harness {
        harness_with(EngineConfig::from_toml_str(ROSTER).unwrap())
    }

    // ── Scenario 1: executive proposal passes ─────────────────────────────────

    #[tokio::test]
    async fn test_executive_proposal_passes() {
        let h = harness();
        let message = AgentMessage::new(
            "exec-1",
            MessageKind::GovernanceRequest,
            json!({ "proposal": "raise quota" }),
        );

        let result = h.pipeline.validate(&message).await;
        assert!(result.is_valid(), "errors: {:?}", result.errors());
        assert_eq!(result.decision(), Decision::Allow);

        let decisions = h.log.snapshot();
        assert_eq!(decisions.len(), 1);
        assert!(decisions[0].allowed);
        assert_eq!(decisions[0].reason, ReasonCode::Allowed);
    }

    // ── Scenario 2: wrong hash fails ──────────────────────────────────────────

    #[tokio::test]
    async fn test_wrong_hash_fails() {
        let h = harness();
        let message = AgentMessage::new("exec-1", MessageKind::Command, json!({}))
            .with_hash("0000000000000000");

        let result = h.pipeline.validate(&message).await;
        assert!(!result.is_valid());
        assert_eq!(result.decision(), Decision::Deny);
        assert!(result.has_error_code("CONSTITUTIONAL_HASH_MISMATCH"));
    }

    // ── Scenario 3: judge auditing its own output ─────────────────────────────

    #[tokio::test]
    async fn test_judge_auditing_own_output_is_denied() {
        let h = harness();
        let judge = AgentId::new("judge-1");
        h.registry.record_output(&judge, &OutputId::new("ruling-1"));

        let message = AgentMessage::new("judge-1", MessageKind::AuditRequest, json!({}))
            .with_metadata("target_output", json!("ruling-1"));

        let result = h.pipeline.validate(&message).await;
        assert!(!result.is_valid());
        assert!(
            result.has_error_code("SELF_VALIDATION_VIOLATION"),
            "errors: {:?}",
            result.errors()
        );

        let decision = &h.log.snapshot()[0];
        assert_eq!(decision.reason, ReasonCode::SelfValidationViolation);
    }

    #[tokio::test]
    async fn test_judge_validates_executive_proposal_end_to_end() {
        let h = harness();
        let proposal = AgentMessage::new("exec-1", MessageKind::GovernanceRequest, json!({}))
            .with_metadata("output_id", json!("proposal-1"));
        assert!(h.pipeline.validate(&proposal).await.is_valid());

        let review = AgentMessage::new("judge-1", MessageKind::ConstitutionalValidation, json!({}))
            .with_recipient("exec-1")
            .with_metadata("target_output", json!("proposal-1"));
        let result = h.pipeline.validate(&review).await;
        assert!(result.is_valid(), "errors: {:?}", result.errors());

        // Executives hold no Validate permission, so the role check rejects
        // the proposer before provenance is even consulted.
        let self_review = AgentMessage::new("exec-1", MessageKind::ConstitutionalValidation, json!({}))
            .with_metadata("target_output", json!("proposal-1"));
        let result = h.pipeline.validate(&self_review).await;
        assert!(result.has_error_code("ROLE_VIOLATION"), "errors: {:?}", result.errors());
        assert!(!result.has_error_code("SELF_VALIDATION_VIOLATION"));
    }

    // ── Hash dominance ────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_hash_mismatch_short_circuits_by_default() {
        let h = harness();
        // Observer proposing with a bad hash: the role violation is never reached.
        let message = AgentMessage::new("obs-1", MessageKind::Command, json!({}))
            .with_hash("bad");

        let result = h.pipeline.validate(&message).await;
        assert_eq!(result.errors().len(), 1);
        assert!(result.has_error_code("CONSTITUTIONAL_HASH_MISMATCH"));
        assert!(h.log.is_empty(), "enforcer not consulted after a failed gate");
    }

    #[tokio::test]
    async fn test_hash_mismatch_dominates_without_short_circuit() {
        let mut config = EngineConfig::from_toml_str(ROSTER).unwrap();
        config.short_circuit_on_hash = false;
        let h = harness_with(config);

        let ok = AgentMessage::new("exec-1", MessageKind::Command, json!({})).with_hash("bad");
        let result = h.pipeline.validate(&ok).await;
        assert_eq!(result.decision(), Decision::Deny, "other passes cannot rescue it");

        let both = AgentMessage::new("obs-1", MessageKind::Command, json!({})).with_hash("bad");
        let result = h.pipeline.validate(&both).await;
        assert!(result.has_error_code("CONSTITUTIONAL_HASH_MISMATCH"));
        assert!(result.has_error_code("ROLE_VIOLATION"));
        assert!(result.errors()[0].starts_with("[CONSTITUTIONAL_HASH_MISMATCH]"));
    }

    // ── Strict vs lenient ─────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_unregistered_sender_strict_and_lenient() {
        let strict = harness();
        let query = AgentMessage::new("stranger", MessageKind::Query, json!({}));
        let result = strict.pipeline.validate(&query).await;
        assert!(result.has_error_code("ROLE_NOT_ASSIGNED"));

        let mut config = EngineConfig::from_toml_str(ROSTER).unwrap();
        config.strict_mode = false;
        let lenient = harness_with(config);

        assert!(lenient.pipeline.validate(&query).await.is_valid());
        let proposal = AgentMessage::new("stranger", MessageKind::Command, json!({}));
        let result = lenient.pipeline.validate(&proposal).await;
        assert!(result.has_error_code("ROLE_VIOLATION"), "default role is observer");
        assert!(!lenient.registry.is_registered(&AgentId::new("stranger")));
    }

    // ── Policy wiring ─────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_policy_strategy_runs_after_authorization() {
        let mut config = EngineConfig::from_toml_str(ROSTER).unwrap();
        config.policy = Some(PolicySettings::default());
        let registry = Arc::new(config.build_registry());
        config.apply_roster(&registry);

        let evaluator = TomlPolicyEvaluator::from_toml_str(
            r#"
            [[rules]]
            id = "proposals-need-id"
            message_kind = "governance_request"
            required_content_fields = ["proposal_id"]
            verdict = "allow"

            [[rules]]
            id = "everything-else"
            verdict = "allow"
            "#,
        )
        .unwrap();

        let log = Arc::new(DecisionLog::new(16));
        let pipeline = ValidationPipeline::builder(config, registry, log)
            .with_policy_evaluator(Arc::new(evaluator))
            .build()
            .unwrap();
        assert_eq!(
            pipeline.strategy_names(),
            ["constitutional_hash", "authorization", "policy"]
        );

        let missing = AgentMessage::new("exec-1", MessageKind::GovernanceRequest, json!({}));
        let result = pipeline.validate(&missing).await;
        assert!(!result.is_valid());
        assert!(result.errors()[0].contains("proposal_id"));

        let complete = AgentMessage::new(
            "exec-1",
            MessageKind::GovernanceRequest,
            json!({ "proposal_id": "p-1" }),
        );
        assert!(pipeline.validate(&complete).await.is_valid());
    }

    #[test]
    fn test_policy_section_without_evaluator_is_config_error() {
        let config = EngineConfig {
            policy: Some(PolicySettings::default()),
            ..EngineConfig::default()
        };
        let registry = Arc::new(RoleRegistry::new());
        let log = Arc::new(DecisionLog::new(4));

        match ValidationPipeline::builder(config, registry, log).build() {
            Err(GovernanceError::ConfigError { reason }) => {
                assert!(reason.contains("no policy evaluator"), "got: {reason}");
            }
            Ok(_) => panic!("expected ConfigError"),
            Err(other) => panic!("expected ConfigError, got {other:?}"),
        }
    }

    // ── Output provenance ─────────────────────────────────────────────────────

    fn pipeline_with_policy(policy_toml: &str) -> Harness {
        let mut config = EngineConfig::from_toml_str(ROSTER).unwrap();
        config.policy = Some(PolicySettings::default());
        let registry = Arc::new(config.build_registry());
        config.apply_roster(&registry);

        let log = Arc::new(DecisionLog::new(16));
        let pipeline = ValidationPipeline::builder(config, registry.clone(), log.clone())
            .with_policy_evaluator(Arc::new(TomlPolicyEvaluator::from_toml_str(policy_toml).unwrap()))
            .build()
            .unwrap();
        Harness {
            pipeline,
            registry,
            log,
        }
    }

    #[tokio::test]
    async fn test_accepted_proposal_records_its_output() {
        let h = harness();
        let proposal = AgentMessage::new("exec-1", MessageKind::GovernanceRequest, json!({}))
            .with_metadata("output_id", json!("proposal-1"));

        assert!(h.pipeline.validate(&proposal).await.is_valid());
        assert_eq!(
            h.registry.produced_by(&OutputId::new("proposal-1")),
            Some(AgentId::new("exec-1"))
        );
    }

    #[tokio::test]
    async fn test_policy_denied_message_claims_no_output() {
        let h = pipeline_with_policy(
            r#"
            [[rules]]
            id = "deny-all"
            verdict = "deny"
            "#,
        );
        let proposal = AgentMessage::new("exec-1", MessageKind::GovernanceRequest, json!({}))
            .with_metadata("output_id", json!("leg-rules-1"));

        let result = h.pipeline.validate(&proposal).await;
        assert!(!result.is_valid());
        assert!(h.log.snapshot()[0].allowed, "authorization itself passed");
        assert_eq!(h.registry.produced_by(&OutputId::new("leg-rules-1")), None);

        // The genuine producer can still claim the id.
        assert!(h
            .registry
            .record_output(&AgentId::new("leg-1"), &OutputId::new("leg-rules-1")));
    }

    #[tokio::test]
    async fn test_bad_hash_without_short_circuit_claims_no_output() {
        let mut config = EngineConfig::from_toml_str(ROSTER).unwrap();
        config.short_circuit_on_hash = false;
        let h = harness_with(config);

        let proposal = AgentMessage::new("exec-1", MessageKind::GovernanceRequest, json!({}))
            .with_hash("bad")
            .with_metadata("output_id", json!("proposal-2"));

        assert!(!h.pipeline.validate(&proposal).await.is_valid());
        assert_eq!(h.registry.produced_by(&OutputId::new("proposal-2")), None);
    }

    #[tokio::test]
    async fn test_output_recording_can_be_disabled() {
        let mut config = EngineConfig::from_toml_str(ROSTER).unwrap();
        config.record_outputs = false;
        let h = harness_with(config);

        let proposal = AgentMessage::new("exec-1", MessageKind::GovernanceRequest, json!({}));
        assert!(h.pipeline.validate(&proposal).await.is_valid());
        assert!(h.registry.outputs_of(&AgentId::new("exec-1")).is_empty());
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_process_drives_lifecycle() {
        let h = harness();

        let mut good = AgentMessage::new("exec-1", MessageKind::Command, json!({}));
        let result = h.pipeline.process(&mut good).await.unwrap();
        assert!(result.is_valid());
        assert_eq!(good.status(), MessageStatus::Validated);

        let mut bad = AgentMessage::new("exec-1", MessageKind::Command, json!({})).with_hash("x");
        let result = h.pipeline.process(&mut bad).await.unwrap();
        assert!(!result.is_valid());
        assert_eq!(bad.status(), MessageStatus::Rejected);

        // Already processed: cannot re-enter processing.
        match h.pipeline.process(&mut good).await {
            Err(GovernanceError::InvalidStatusTransition { .. }) => {}
            other => panic!("expected InvalidStatusTransition, got {other:?}"),
        }
    }

    // ── Concurrency ───────────────────────────────────────────────────────────

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_validation_shares_one_pipeline() {
        let h = Arc::new(harness());
        let mut handles = Vec::new();

        for i in 0..32 {
            let h = h.clone();
            handles.push(tokio::spawn(async move {
                let sender = if i % 2 == 0 { "exec-1" } else { "obs-1" };
                let message = AgentMessage::new(sender, MessageKind::Command, json!({ "i": i }));
                (sender, h.pipeline.validate(&message).await.is_valid())
            }));
        }

        for handle in handles {
            let (sender, valid) = handle.await.unwrap();
            assert_eq!(valid, sender == "exec-1", "sender {sender}");
        }
        assert_eq!(h.log.len(), 32);
    }
}
