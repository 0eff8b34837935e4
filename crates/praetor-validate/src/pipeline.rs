//! The pipeline facade the message bus calls once per message.
//!
//! `PipelineBuilder` wires the strategy chain from an `EngineConfig`:
//!
//!   1. Constitutional hash (a gate when `short_circuit_on_hash` is set)
//!   2. Role-separation authorization
//!   3. Policy evaluation, when a `[policy]` section and an evaluator exist
//!   4. Any extra strategies, in the order they were added
//!
//! Output provenance is written only after the merged verdict: an output
//! claimed by the authorization strategy is recorded against its sender
//! when, and only when, the whole chain accepted the message.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info};

use praetor_contracts::{
    error::{GovernanceError, GovernanceResult},
    message::{AgentMessage, MessageStatus, OutputId},
    validation::ValidationResult,
};
use praetor_core::{
    traits::{DecisionRecorder, PolicyEvaluator, ValidationStrategy},
    AuthorizationEnforcer, EngineConfig, RoleRegistry,
};

use crate::strategy::{
    AuthorizationStrategy, CompositeStrategy, HashValidationStrategy, PolicyValidationStrategy,
    PRODUCED_OUTPUT_KEY,
};

pub struct ValidationPipeline {
    chain: CompositeStrategy,
    enforcer: AuthorizationEnforcer,
    record_outputs: bool,
}

impl ValidationPipeline {
    pub fn builder(
        config: EngineConfig,
        registry: Arc<RoleRegistry>,
        recorder: Arc<dyn DecisionRecorder>,
    ) -> PipelineBuilder {
        PipelineBuilder {
            config,
            registry,
            recorder,
            evaluator: None,
            extra: Vec::new(),
        }
    }

    /// Run every configured strategy against `message`.
    ///
    /// Holds no per-message state, so one pipeline may serve any number of
    /// concurrent callers.
    pub async fn validate(&self, message: &AgentMessage) -> ValidationResult {
        let result = self.chain.validate(message).await;
        if result.is_valid() && self.record_outputs {
            self.record_produced_output(message, &result);
        }
        debug!(
            message_id = %message.id,
            sender = %message.sender,
            kind = %message.kind,
            decision = %result.decision(),
            errors = result.errors().len(),
            "message validated"
        );
        result
    }

    /// Validate and advance the message lifecycle:
    /// `pending → processing → validated | rejected`.
    ///
    /// Fails with `InvalidStatusTransition` if the message is not pending.
    pub async fn process(&self, message: &mut AgentMessage) -> GovernanceResult<ValidationResult> {
        message.transition_to(MessageStatus::Processing)?;
        let result = self.validate(message).await;
        let next = if result.is_valid() {
            MessageStatus::Validated
        } else {
            MessageStatus::Rejected
        };
        message.transition_to(next)?;
        Ok(result)
    }

    fn record_produced_output(&self, message: &AgentMessage, result: &ValidationResult) {
        let Some(output_id) = result
            .metadata()
            .get(PRODUCED_OUTPUT_KEY)
            .and_then(|v| v.as_str())
            .map(OutputId::new)
        else {
            return;
        };

        if self.registry().record_output(&message.sender, &output_id) {
            debug!(
                agent_id = %message.sender,
                output_id = %output_id,
                "output recorded"
            );
        }
    }

    pub fn enforcer(&self) -> &AuthorizationEnforcer {
        &self.enforcer
    }

    pub fn registry(&self) -> &Arc<RoleRegistry> {
        self.enforcer.registry()
    }

    /// Strategy names in execution order.
    pub fn strategy_names(&self) -> Vec<&str> {
        self.chain.strategy_names()
    }
}

pub struct PipelineBuilder {
    config: EngineConfig,
    registry: Arc<RoleRegistry>,
    recorder: Arc<dyn DecisionRecorder>,
    evaluator: Option<Arc<dyn PolicyEvaluator>>,
    extra: Vec<Arc<dyn ValidationStrategy>>,
}

impl PipelineBuilder {
    /// Evaluator for the policy strategy. Without a `[policy]` section the
    /// default `PolicySettings` apply.
    pub fn with_policy_evaluator(mut self, evaluator: Arc<dyn PolicyEvaluator>) -> Self {
        self.evaluator = Some(evaluator);
        self
    }

    /// Append a strategy after the built-in ones.
    pub fn with_strategy(mut self, strategy: Arc<dyn ValidationStrategy>) -> Self {
        self.extra.push(strategy);
        self
    }

    pub fn build(self) -> GovernanceResult<ValidationPipeline> {
        self.config.validate()?;

        let enforcer = AuthorizationEnforcer::new(self.registry, self.recorder)
            .with_strict_mode(self.config.strict_mode)
            .with_default_role(self.config.default_role);

        let hash: Arc<dyn ValidationStrategy> =
            Arc::new(HashValidationStrategy::new(self.config.expected_hash.as_str()));
        let mut chain = CompositeStrategy::new("pipeline");
        chain = if self.config.short_circuit_on_hash {
            chain.with_gate(hash)
        } else {
            chain.with_strategy(hash)
        };

        chain = chain.with_strategy(Arc::new(AuthorizationStrategy::new(enforcer.clone())));

        match (self.evaluator, self.config.policy) {
            (Some(evaluator), settings) => {
                let settings = settings.unwrap_or_default();
                chain = chain.with_strategy(Arc::new(PolicyValidationStrategy::new(
                    evaluator, settings,
                )));
            }
            (None, Some(settings)) => {
                return Err(GovernanceError::ConfigError {
                    reason: format!(
                        "policy '{}' is configured but no policy evaluator was supplied",
                        settings.policy_path
                    ),
                });
            }
            (None, None) => {}
        }

        for strategy in self.extra {
            chain = chain.with_strategy(strategy);
        }

        info!(
            strategies = %json!(chain.strategy_names()),
            strict_mode = enforcer.strict_mode(),
            short_circuit_on_hash = self.config.short_circuit_on_hash,
            "validation pipeline built"
        );

        Ok(ValidationPipeline {
            chain,
            enforcer,
            record_outputs: self.config.record_outputs,
        })
    }
}
