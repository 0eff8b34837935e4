//! Governance scenarios run by the demo binary.
//!
//! Each scenario submits messages from the bundled roster:
//! exec-1 (executive), leg-1 (legislative), judge-1/judge-2 (judicial),
//! obs-1 (observer).

use serde_json::json;

use praetor_contracts::{
    error::GovernanceResult,
    message::{AgentId, AgentMessage, MessageKind, OutputId},
    validation::Decision,
};

use crate::engine::Engine;

/// Scenario 1: an executive proposal passes every check.
pub async fn proposal(engine: &mut Engine) -> GovernanceResult<()> {
    println!("=== Scenario 1: Executive proposal ===");
    println!();

    let message = AgentMessage::new(
        "exec-1",
        MessageKind::GovernanceRequest,
        json!({ "proposal_id": "prop-001", "summary": "raise inference quota" }),
    )
    .with_metadata("output_id", json!("prop-001"));
    engine
        .submit("exec-1 proposes prop-001", message, Decision::Allow)
        .await?;

    let rules = AgentMessage::new("leg-1", MessageKind::Command, json!({ "source": "charter" }))
        .with_metadata("action", json!("extract_rules"));
    engine
        .submit("leg-1 extracts rules from the charter", rules, Decision::Allow)
        .await?;
    Ok(())
}

/// Scenario 2: a message declaring the wrong constitutional hash is denied
/// before any other check runs.
pub async fn hash_mismatch(engine: &mut Engine) -> GovernanceResult<()> {
    println!("=== Scenario 2: Constitutional hash mismatch ===");
    println!();

    let message = AgentMessage::new("exec-1", MessageKind::Command, json!({ "op": "deploy" }))
        .with_hash("0000000000000000");
    engine
        .submit("exec-1 sends a command with a stale hash", message, Decision::Deny)
        .await?;
    Ok(())
}

/// Scenario 3: separation of powers between the judges and everyone else.
pub async fn separation_of_powers(engine: &mut Engine) -> GovernanceResult<()> {
    println!("=== Scenario 3: Separation of powers ===");
    println!();

    let judge = AgentId::new("judge-1");
    engine
        .registry()
        .record_output(&judge, &OutputId::new("ruling-7"));
    println!("  judge-1 is on record as the author of ruling-7");
    println!();

    let self_audit = AgentMessage::new("judge-1", MessageKind::AuditRequest, json!({}))
        .with_metadata("target_output", json!("ruling-7"));
    engine
        .submit("judge-1 audits its own ruling", self_audit, Decision::Deny)
        .await?;

    let peer_review = AgentMessage::new("judge-1", MessageKind::ConstitutionalValidation, json!({}))
        .with_recipient("judge-2");
    engine
        .submit("judge-1 validates fellow judge judge-2", peer_review, Decision::Deny)
        .await?;

    let review = AgentMessage::new("judge-2", MessageKind::ConstitutionalValidation, json!({}))
        .with_recipient("exec-1")
        .with_metadata("target_output", json!("prop-001"));
    engine
        .submit("judge-2 validates exec-1's proposal", review, Decision::Allow)
        .await?;

    let overreach = AgentMessage::new("obs-1", MessageKind::TaskRequest, json!({}));
    engine
        .submit("obs-1 tries to start a task", overreach, Decision::Deny)
        .await?;
    Ok(())
}

/// Scenario 4: the bus policy rejects well-formed, authorized traffic.
pub async fn policy(engine: &mut Engine) -> GovernanceResult<()> {
    println!("=== Scenario 4: Bus policy ===");
    println!();

    let anonymous = AgentMessage::new(
        "exec-1",
        MessageKind::GovernanceRequest,
        json!({ "summary": "proposal without an id" }),
    );
    engine
        .submit("exec-1 proposes without a proposal_id", anonymous, Decision::Deny)
        .await?;

    let suspended = AgentMessage::new("obs-1", MessageKind::Query, json!({ "q": "status" }))
        .with_tenant("tenant-suspended");
    engine
        .submit("obs-1 queries from a suspended tenant", suspended, Decision::Deny)
        .await?;

    let query = AgentMessage::new("obs-1", MessageKind::Query, json!({ "q": "status" }))
        .with_tenant("tenant-a");
    engine
        .submit("obs-1 queries from tenant-a", query, Decision::Allow)
        .await?;
    Ok(())
}
