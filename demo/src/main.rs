//! PRAETOR Governance Engine: Demo CLI
//!
//! Loads an engine configuration and agent roster, then runs one or all of
//! the governance scenarios through the validation pipeline. Every
//! authorization decision is exported to an in-memory SHA-256 audit chain
//! that is verified before exit.
//!
//! Usage:
//!   cargo run -p demo -- run-all
//!   cargo run -p demo -- proposal
//!   cargo run -p demo -- hash-mismatch
//!   cargo run -p demo -- separation
//!   cargo run -p demo -- policy
//!   cargo run -p demo -- --config my.toml --policy rules.toml run-all

mod engine;
mod scenarios;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use praetor_contracts::error::GovernanceResult;

use crate::engine::Engine;

// ── CLI definition ────────────────────────────────────────────────────────────

/// PRAETOR: constitutional validation and role separation demo.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "PRAETOR governance engine demo",
    long_about = "Runs PRAETOR governance scenarios showing constitutional hash checks,\n\
                  separation of powers, bus policy, and audit chain integrity."
)]
struct Cli {
    /// Engine configuration TOML. Defaults to the bundled config/praetor.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Policy rules TOML. Defaults to the bundled config/policy.toml.
    #[arg(long, global = true)]
    policy: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run every scenario in sequence.
    RunAll,
    /// Scenario 1: executive proposal and legislative rule extraction.
    Proposal,
    /// Scenario 2: wrong constitutional hash.
    HashMismatch,
    /// Scenario 3: self-audit, judge-on-judge, and role overreach.
    Separation,
    /// Scenario 4: policy denials for authorized traffic.
    Policy,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    // Set RUST_LOG=info for scenario events, debug for per-decision output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    print_banner();

    match run(cli).await {
        Ok(0) => {
            println!("All selected scenarios completed as expected.");
        }
        Ok(unexpected) => {
            eprintln!("{unexpected} outcome(s) did not match expectations");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Demo error: {}", e);
            std::process::exit(1);
        }
    }
}

// ── Scenario dispatch ─────────────────────────────────────────────────────────

async fn run(cli: Cli) -> GovernanceResult<usize> {
    let mut engine = Engine::load(cli.config.as_deref(), cli.policy.as_deref())?;

    match cli.command {
        Command::RunAll => {
            scenarios::proposal(&mut engine).await?;
            scenarios::hash_mismatch(&mut engine).await?;
            scenarios::separation_of_powers(&mut engine).await?;
            scenarios::policy(&mut engine).await?;
        }
        Command::Proposal => scenarios::proposal(&mut engine).await?,
        Command::HashMismatch => scenarios::hash_mismatch(&mut engine).await?,
        Command::Separation => scenarios::separation_of_powers(&mut engine).await?,
        Command::Policy => scenarios::policy(&mut engine).await?,
    }

    engine.shutdown().await
}

// ── Banner ────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("PRAETOR — Constitutional Validation Pipeline");
    println!("Separation-of-Powers Demo");
    println!("============================================");
    println!();
    println!("Checks applied to every bus message:");
    println!("  [1] Constitutional hash must match exactly (failure stops the chain)");
    println!("  [2] Sender's role must permit the action; judges never judge themselves or each other");
    println!("  [3] Bus policy evaluates the canonical message (cached, bounded, fail-closed)");
    println!("  [4] Every authorization decision is exported to a SHA-256 audit chain");
    println!();
}
