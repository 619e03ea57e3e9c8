//! Authorization gate
//!
//! Decides which mutating affordances (edit, delete, admin screens) to
//! offer the current session. Advisory only: the server applies the same
//! `shared::authz` rule and its answer wins.

use crate::client::error::ClientError;
use crate::client::session::Session;
use crate::shared::authz::{may_administer, may_modify};

/// What the session may do with one resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Affordances {
    pub can_edit: bool,
    pub can_delete: bool,
}

/// Whether `session` may edit or delete a resource owned by `owner_id`
pub fn can_modify(session: Option<&Session>, owner_id: &str) -> bool {
    may_modify(session.map(Session::actor).as_ref(), owner_id)
}

/// Whether `session` may manage categories
pub fn can_administer(session: Option<&Session>) -> bool {
    may_administer(session.map(Session::actor).as_ref())
}

pub fn affordances(session: Option<&Session>, owner_id: &str) -> Affordances {
    let allowed = can_modify(session, owner_id);
    Affordances {
        can_edit: allowed,
        can_delete: allowed,
    }
}

/// Refuse locally before sending a request the server would reject
///
/// # Errors
///
/// `NotAuthenticated` without a session, `Forbidden` when the session is
/// neither the owner nor an admin.
pub fn guard(session: Option<&Session>, owner_id: &str, action: &str) -> Result<(), ClientError> {
    match session {
        None => Err(ClientError::NotAuthenticated),
        Some(_) if can_modify(session, owner_id) => Ok(()),
        Some(_) => Err(ClientError::Forbidden(format!("Not authorized to {}", action))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::Role;
    use assert_matches::assert_matches;

    fn session(user_id: &str, role: Role) -> Session {
        Session {
            token: "t".to_string(),
            user_id: user_id.to_string(),
            name: "n".to_string(),
            role,
        }
    }

    #[test]
    fn test_affordances() {
        let owner = session("u1", Role::User);
        let other = session("u2", Role::User);
        let admin = session("a1", Role::Admin);

        assert_eq!(
            affordances(Some(&owner), "u1"),
            Affordances { can_edit: true, can_delete: true }
        );
        assert_eq!(affordances(Some(&other), "u1"), Affordances::default());
        assert!(affordances(Some(&admin), "u1").can_delete);
        assert_eq!(affordances(None, "u1"), Affordances::default());
    }

    #[test]
    fn test_guard() {
        let other = session("u2", Role::User);
        assert_matches!(guard(None, "u1", "delete this comment"), Err(ClientError::NotAuthenticated));
        assert_matches!(
            guard(Some(&other), "u1", "delete this comment"),
            Err(ClientError::Forbidden(message)) if message == "Not authorized to delete this comment"
        );
        assert!(guard(Some(&session("u1", Role::User)), "u1", "delete this comment").is_ok());
    }

    #[test]
    fn test_only_admins_administer() {
        assert!(can_administer(Some(&session("a1", Role::Admin))));
        assert!(!can_administer(Some(&session("u1", Role::User))));
        assert!(!can_administer(None));
    }
}
