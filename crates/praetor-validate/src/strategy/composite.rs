//! Ordered composition of strategies.
//!
//! Children run in insertion order and their results are merged into a
//! single result starting from `ValidationResult::valid()`. A child added as
//! a gate stops the chain when it fails. Each child runs behind a panic
//! boundary: a panicking strategy contributes a `STRATEGY_FAULT` denial
//! instead of unwinding through the bus.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use serde_json::json;
use tracing::{debug, error};

use praetor_contracts::{
    error::GovernanceError, message::AgentMessage, validation::ValidationResult,
};
use praetor_core::traits::ValidationStrategy;

struct Child {
    strategy: Arc<dyn ValidationStrategy>,
    gate: bool,
}

pub struct CompositeStrategy {
    name: String,
    children: Vec<Child>,
}

impl CompositeStrategy {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    /// Append a strategy whose result is always merged.
    pub fn with_strategy(mut self, strategy: Arc<dyn ValidationStrategy>) -> Self {
        self.children.push(Child {
            strategy,
            gate: false,
        });
        self
    }

    /// Append a strategy that halts the chain when it fails.
    pub fn with_gate(mut self, strategy: Arc<dyn ValidationStrategy>) -> Self {
        self.children.push(Child {
            strategy,
            gate: true,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Child names in execution order.
    pub fn strategy_names(&self) -> Vec<&str> {
        self.children.iter().map(|c| c.strategy.name()).collect()
    }
}

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "strategy panicked".to_string()
    }
}

/// Run one strategy, converting a panic into a denial.
async fn run_guarded(strategy: &dyn ValidationStrategy, message: &AgentMessage) -> ValidationResult {
    match AssertUnwindSafe(strategy.validate(message)).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => {
            let reason = panic_reason(payload.as_ref());
            error!(
                strategy = strategy.name(),
                message_id = %message.id,
                reason = %reason,
                "validation strategy panicked"
            );
            ValidationResult::from_error(&GovernanceError::StrategyFault {
                strategy: strategy.name().to_string(),
                reason,
            })
        }
    }
}

#[async_trait]
impl ValidationStrategy for CompositeStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    async fn validate(&self, message: &AgentMessage) -> ValidationResult {
        let mut merged = ValidationResult::valid();

        for child in &self.children {
            let result = run_guarded(child.strategy.as_ref(), message).await;
            let failed = !result.is_valid();
            merged.merge_from(result);

            if failed && child.gate {
                debug!(
                    composite = %self.name,
                    gate = child.strategy.name(),
                    message_id = %message.id,
                    "gate failed; remaining strategies skipped"
                );
                merged.insert_metadata("short_circuited_by", json!(child.strategy.name()));
                break;
            }
        }

        merged
    }
}
