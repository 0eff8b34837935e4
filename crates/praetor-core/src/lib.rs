//! # praetor-core
//!
//! Role separation for the PRAETOR governance engine.
//!
//! This crate provides:
//! - The trait seams (`ValidationStrategy`, `PolicyEvaluator`, `DecisionRecorder`)
//! - The static permission model
//! - The `RoleRegistry` of agent roles and output provenance
//! - The `AuthorizationEnforcer` that applies the separation-of-powers rules
//! - `EngineConfig`, the TOML configuration and roster loader
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use praetor_core::{AuthorizationEnforcer, RoleRegistry};
//!
//! let registry = Arc::new(RoleRegistry::new());
//! let enforcer = AuthorizationEnforcer::new(registry, recorder);
//! let decision = enforcer.authorize(&agent, Action::Propose, None, None);
//! ```

pub mod config;
pub mod enforcer;
pub mod permission;
pub mod registry;
pub mod traits;

pub use config::{EngineConfig, PolicySettings, ReloadMode, RosterReport};
pub use enforcer::AuthorizationEnforcer;
pub use registry::{OutputRetention, RoleRegistry};
