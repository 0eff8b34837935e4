//! # praetor-audit
//!
//! Audit trail for authorization decisions.
//!
//! ## Overview
//!
//! - [`DecisionLog`] is the bounded ring buffer the enforcer records into.
//!   Appends never block on I/O; overflow evicts the oldest entry.
//! - [`AuditExporter`] forwards decisions to an [`AuditSink`] from a
//!   background task, dropping (and counting) entries when its queue is full.
//! - [`HashChainSink`] is a tamper-evident sink: every decision is chained to
//!   the previous one by SHA-256, and `verify_chain` detects any alteration.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use praetor_audit::{AuditExporter, DecisionLog, HashChainSink};
//!
//! let sink = Arc::new(HashChainSink::new("bus-01"));
//! let (exporter, _task) = AuditExporter::spawn(sink.clone(), 1024);
//! let log = Arc::new(DecisionLog::new(10_000).with_exporter(exporter));
//! // Hand `log` to `AuthorizationEnforcer::new(registry, log)`.
//! ```

pub mod chain;
pub mod event;
pub mod exporter;
pub mod memory;
pub mod ring;

pub use chain::{first_broken_link, hash_event, verify_chain};
pub use event::{AuditEvent, AuditLog};
pub use exporter::{AuditExporter, AuditSink, ExportStats};
pub use memory::HashChainSink;
pub use ring::DecisionLog;

// ── Tests ─────────────────────────────────────────────────────────────────────
