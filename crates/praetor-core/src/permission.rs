//! The static separation-of-powers permission model.
//!
//! | Role        | Allowed actions                 | May validate/audit outputs of |
//! |-------------|---------------------------------|-------------------------------|
//! | Executive   | Propose, Synthesize, Query      | (none)                        |
//! | Legislative | ExtractRules, Synthesize, Query | (none)                        |
//! | Judicial    | Validate, Audit, Query          | Executive, Legislative        |
//! | Observer    | Query                           | (none)                        |
//!
//! The table is compiled in. Nothing at runtime can widen it.

use praetor_contracts::role::{Action, Role};

/// The actions `role` may perform.
pub fn allowed_actions(role: Role) -> &'static [Action] {
    match role {
        Role::Executive => &[Action::Propose, Action::Synthesize, Action::Query],
        Role::Legislative => &[Action::ExtractRules, Action::Synthesize, Action::Query],
        Role::Judicial => &[Action::Validate, Action::Audit, Action::Query],
        Role::Observer => &[Action::Query],
    }
}

/// The roles whose outputs `role` may validate or audit.
///
/// Judicial never appears in its own list: judges do not judge judges.
pub fn validation_targets(role: Role) -> &'static [Role] {
    match role {
        Role::Judicial => &[Role::Executive, Role::Legislative],
        Role::Executive | Role::Legislative | Role::Observer => &[],
    }
}

pub fn is_permitted(role: Role, action: Action) -> bool {
    allowed_actions(role).contains(&action)
}

/// True if an agent holding `validator` may validate/audit an agent holding `target`.
pub fn may_judge(validator: Role, target: Role) -> bool {
    validation_targets(validator).contains(&target)
}
