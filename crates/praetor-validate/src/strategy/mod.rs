//! The validation strategies the pipeline composes.

pub mod authorization;
pub mod composite;
pub mod hash;
pub mod policy;

pub use authorization::{AuthorizationStrategy, PRODUCED_OUTPUT_KEY};
pub use composite::CompositeStrategy;
pub use hash::HashValidationStrategy;
pub use policy::PolicyValidationStrategy;
