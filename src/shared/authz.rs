//! Ownership Rule
//!
//! The one rule deciding who may edit or delete an owned resource. The
//! client uses it to decide which affordances to show; the server calls the
//! same function before mutating, and its answer is the one that counts.

use crate::shared::models::Role;

/// Whoever is making a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: String,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Whether `actor` may modify a resource owned by `owner_id`.
///
/// Permitted iff the actor owns the resource or is an admin. No actor is
/// never permitted.
pub fn may_modify(actor: Option<&Actor>, owner_id: &str) -> bool {
    match actor {
        Some(actor) => actor.is_admin() || actor.user_id == owner_id,
        None => false,
    }
}

/// Whether `actor` may manage site-wide resources such as categories.
pub fn may_administer(actor: Option<&Actor>) -> bool {
    actor.is_some_and(Actor::is_admin)
}
