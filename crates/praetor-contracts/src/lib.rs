//! # praetor-contracts
//!
//! Shared types, error taxonomy, and contracts for the PRAETOR governance
//! engine.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate beyond the invariants the types themselves enforce: result
//! merging and the message lifecycle state machine.

pub mod authorization;
pub mod error;
pub mod message;
pub mod policy;
pub mod role;
pub mod validation;

#[cfg(test)]
mod tests {
    use super::*;
    use error::GovernanceError;
    use message::{AgentMessage, MessageId, MessageKind, MessageStatus, CONSTITUTIONAL_HASH};
    use role::{Action, Role};
    use validation::{Decision, ValidationResult};

    // ── ValidationResult invariants ──────────────────────────────────────────

    #[test]
    fn valid_result_allows() {
        let result = ValidationResult::valid();
        assert!(result.is_valid());
        assert_eq!(result.decision(), Decision::Allow);
        assert!(result.errors().is_empty());
    }

    #[test]
    fn adding_an_error_flips_to_deny() {
        let mut result = ValidationResult::valid();
        result.add_warning("just a warning");
        assert!(result.is_valid(), "warnings must not invalidate a result");

        result.add_error("broken");
        assert!(!result.is_valid());
        assert_eq!(result.decision(), Decision::Deny);
        assert_eq!(result.errors(), ["broken".to_string()]);
    }

    #[test]
    fn governance_error_is_rendered_with_code() {
        let err = GovernanceError::ConstitutionalHashMismatch {
            expected: CONSTITUTIONAL_HASH.to_string(),
            actual: "wrong".to_string(),
        };
        let result = ValidationResult::from_error(&err);

        assert!(result.has_error_code("CONSTITUTIONAL_HASH_MISMATCH"));
        assert!(result.errors()[0].contains("constitutional hash mismatch"));
        assert!(!result.has_error_code("ROLE_VIOLATION"));
    }

    // ── Merge semantics ──────────────────────────────────────────────────────

    fn sample(errors: &[&str], warnings: &[&str], meta: &[(&str, i64)]) -> ValidationResult {
        let mut r = ValidationResult::valid();
        for e in errors {
            r.add_error(*e);
        }
        for w in warnings {
            r.add_warning(*w);
        }
        for (k, v) in meta {
            r.insert_metadata(*k, serde_json::json!(v));
        }
        r
    }

    #[test]
    fn merge_concatenates_in_order_and_keeps_duplicates() {
        let a = sample(&["e1"], &["w1"], &[]);
        let b = sample(&["e1", "e2"], &[], &[]);

        let merged = a.merge(b);
        assert_eq!(merged.errors(), ["e1", "e1", "e2"].map(String::from));
        assert_eq!(merged.warnings(), ["w1".to_string()]);
        assert_eq!(merged.decision(), Decision::Deny);
    }

    #[test]
    fn merge_of_valid_results_stays_valid() {
        let merged = sample(&[], &["w"], &[]).merge(ValidationResult::valid());
        assert!(merged.is_valid());
        assert_eq!(merged.decision(), Decision::Allow);
    }

    #[test]
    fn merge_is_associative() {
        let cases = [
            sample(&[], &[], &[("k", 1)]),
            sample(&["a"], &["wa"], &[("k", 2)]),
            sample(&["b", "c"], &[], &[("j", 3)]),
            sample(&[], &["wb"], &[("k", 4), ("j", 5)]),
        ];

        for r1 in &cases {
            for r2 in &cases {
                for r3 in &cases {
                    let left = r1.clone().merge(r2.clone()).merge(r3.clone());
                    let right = r1.clone().merge(r2.clone().merge(r3.clone()));
                    assert_eq!(left, right, "merge must be associative");
                }
            }
        }
    }

    // ── Message lifecycle ────────────────────────────────────────────────────

    #[test]
    fn message_defaults_to_pending_with_expected_hash() {
        let msg = AgentMessage::new("exec-1", MessageKind::Command, serde_json::json!({}));
        assert_eq!(msg.status(), MessageStatus::Pending);
        assert_eq!(msg.constitutional_hash, CONSTITUTIONAL_HASH);
        assert!(msg.recipient.is_none());
    }

    #[test]
    fn message_lifecycle_follows_state_machine() {
        let mut msg = AgentMessage::new("exec-1", MessageKind::Command, serde_json::json!({}));
        msg.transition_to(MessageStatus::Processing).unwrap();
        msg.transition_to(MessageStatus::Validated).unwrap();
        msg.transition_to(MessageStatus::Delivered).unwrap();
        assert!(msg.status().is_terminal());

        match msg.transition_to(MessageStatus::Processing) {
            Err(GovernanceError::InvalidStatusTransition { from, to }) => {
                assert_eq!(from, "delivered");
                assert_eq!(to, "processing");
            }
            other => panic!("expected InvalidStatusTransition, got {:?}", other),
        }
    }

    #[test]
    fn rejected_message_cannot_be_delivered() {
        let mut msg = AgentMessage::new("exec-1", MessageKind::Query, serde_json::json!({}));
        msg.transition_to(MessageStatus::Processing).unwrap();
        msg.transition_to(MessageStatus::Rejected).unwrap();
        assert!(msg.transition_to(MessageStatus::Delivered).is_err());
    }

    #[test]
    fn message_id_new_produces_unique_values() {
        let unique: std::collections::HashSet<String> =
            (0..100).map(|_| MessageId::new().to_string()).collect();
        assert_eq!(unique.len(), 100);
    }

    // ── Role / Action parsing ────────────────────────────────────────────────

    #[test]
    fn roles_and_actions_parse_from_config_names() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        for action in Action::ALL {
            assert_eq!(action.as_str().parse::<Action>().unwrap(), action);
        }
        assert_eq!("Extract-Rules".parse::<Action>().unwrap(), Action::ExtractRules);
        assert!("emperor".parse::<Role>().is_err());
    }

    #[test]
    fn role_serializes_as_snake_case() {
        let json = serde_json::to_string(&Role::Judicial).unwrap();
        assert_eq!(json, "\"judicial\"");
    }

    // ── GovernanceError display messages ─────────────────────────────────────

    #[test]
    fn error_self_validation_display() {
        let err = GovernanceError::SelfValidationViolation {
            agent_id: "judge-1".to_string(),
            action: Action::Audit,
        };
        let msg = err.to_string();
        assert!(msg.contains("self-validation"));
        assert!(msg.contains("judge-1"));
        assert_eq!(err.code(), "SELF_VALIDATION_VIOLATION");
    }

    #[test]
    fn error_cross_role_display() {
        let err = GovernanceError::CrossRoleViolation {
            agent_id: "judge-1".to_string(),
            source_role: Role::Judicial,
            action: Action::Validate,
            target_agent: "judge-2".to_string(),
            target_role: Role::Judicial,
        };
        let msg = err.to_string();
        assert!(msg.contains("cross-role violation"));
        assert!(msg.contains("judge-2"));
    }

    #[test]
    fn error_already_registered_display() {
        let err = GovernanceError::AlreadyRegistered {
            agent_id: "exec-1".to_string(),
            existing: Role::Executive,
        };
        assert!(err.to_string().contains("already registered with role executive"));
    }
}
