//! Authorization gate for mutating fruit operations. Owns no data: decisions
//! are pure functions over the session identity and the record's owner id.

use crate::error::{AppError, AppResult};
use crate::fruits::Fruit;

/// A requester may mutate a fruit only when they own it.
pub fn can_mutate(requester_id: &str, fruit: &Fruit) -> bool {
    requester_id == fruit.owner_id
}

/// Require a resolved session identity. `action` names the attempted
/// operation ("create", "update", "delete") for the error message.
pub fn require_authenticated(session_user: Option<String>, action: &str) -> AppResult<String> {
    session_user.ok_or_else(|| {
        AppError::unauthenticated(format!("You need to be logged in to {action} a fruit"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned_by(owner: &str) -> Fruit {
        Fruit {
            id: "f1".into(),
            name: "grape".into(),
            color: "purple".into(),
            emoji: "🍇".into(),
            owner_id: owner.into(),
        }
    }

    #[test]
    fn owner_may_mutate_others_may_not() {
        let fruit = owned_by("u1");
        assert!(can_mutate("u1", &fruit));
        assert!(!can_mutate("u2", &fruit));
        assert!(!can_mutate("", &fruit));
    }

    #[test]
    fn require_authenticated_passes_through_the_user_id() {
        assert_eq!(require_authenticated(Some("u1".into()), "create").unwrap(), "u1");
    }

    #[test]
    fn missing_session_is_unauthenticated() {
        let err = require_authenticated(None, "delete").unwrap_err();
        assert!(matches!(err, AppError::Unauthenticated { .. }));
        assert_eq!(err.message(), "You need to be logged in to delete a fruit");
    }
}
