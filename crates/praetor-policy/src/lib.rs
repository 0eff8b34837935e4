//! # praetor-policy
//!
//! Policy-evaluation support for the PRAETOR validation pipeline.
//!
//! ## Overview
//!
//! - [`canonical`] turns message-derived JSON into order-independent bytes
//!   and a SHA-256 content hash.
//! - [`DecisionCache`] keeps definitive evaluator outcomes for a bounded TTL.
//! - [`TomlPolicyEvaluator`] is an in-process, deny-by-default
//!   [`PolicyEvaluator`](praetor_core::traits::PolicyEvaluator) whose rules
//!   are declared in TOML. First matching rule wins.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use praetor_policy::TomlPolicyEvaluator;
//!
//! let evaluator = TomlPolicyEvaluator::from_file(Path::new("policies/bus.toml"))?;
//! // Pass `Arc::new(evaluator)` to the policy-backed validation strategy.
//! ```

pub mod cache;
pub mod canonical;
pub mod evaluator;
pub mod rule;

pub use cache::{CacheStats, DecisionCache};
pub use evaluator::TomlPolicyEvaluator;
pub use rule::{PolicyConfig, PolicyRule, RuleVerdict};

// ── Tests ─────────────────────────────────────────────────────────────────────
