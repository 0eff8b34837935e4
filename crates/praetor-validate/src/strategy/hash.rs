use async_trait::async_trait;
use serde_json::json;
use tracing::warn;

use praetor_contracts::{
    error::GovernanceError, message::AgentMessage, validation::ValidationResult,
};
use praetor_core::traits::ValidationStrategy;

/// Compares the hash a message declares against the expected constitutional
/// hash. The comparison is exact: no trimming, no case folding.
#[derive(Debug, Clone)]
pub struct HashValidationStrategy {
    expected: String,
}

impl HashValidationStrategy {
    pub fn new(expected: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
        }
    }

    pub fn expected(&self) -> &str {
        &self.expected
    }
}

#[async_trait]
impl ValidationStrategy for HashValidationStrategy {
    fn name(&self) -> &str {
        "constitutional_hash"
    }

    async fn validate(&self, message: &AgentMessage) -> ValidationResult {
        if message.constitutional_hash == self.expected {
            return ValidationResult::valid();
        }

        warn!(
            message_id = %message.id,
            sender = %message.sender,
            declared = %message.constitutional_hash,
            "constitutional hash mismatch"
        );
        ValidationResult::from_error(&GovernanceError::ConstitutionalHashMismatch {
            expected: self.expected.clone(),
            actual: message.constitutional_hash.clone(),
        })
        .with_metadata("constitutional_hash_valid", json!(false))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use praetor_contracts::message::{MessageKind, CONSTITUTIONAL_HASH};

    use super::*;

    #[tokio::test]
    async fn matching_hash_passes() {
        let strategy = HashValidationStrategy::new(CONSTITUTIONAL_HASH);
        let message = AgentMessage::new("exec-1", MessageKind::Command, json!({}));
        let result = strategy.validate(&message).await;
        assert!(result.is_valid());
        assert!(result.errors().is_empty());
    }

    #[tokio::test]
    async fn comparison_is_exact() {
        let strategy = HashValidationStrategy::new(CONSTITUTIONAL_HASH);
        for declared in ["", "CDD01EF066BC6CF2", " cdd01ef066bc6cf2", "deadbeef"] {
            let message =
                AgentMessage::new("exec-1", MessageKind::Command, json!({})).with_hash(declared);
            let result = strategy.validate(&message).await;
            assert!(!result.is_valid(), "declared {declared:?} must fail");
            assert!(result.has_error_code("CONSTITUTIONAL_HASH_MISMATCH"));
        }
    }
}
