//! Escalation rule operations.

use crate::{require_user, OpsResult};
use haven_core::{audit as actions, AuthProvider, Rule};
use haven_store::{audit, rules};
use rusqlite::Connection;
use serde_json::json;

/// Create or update the caller's escalation rule.
///
/// `approval_required` is stored and surfaced but not consulted by the
/// evaluation path.
pub fn set_rule<A: AuthProvider>(
    conn: &Connection,
    auth: &A,
    inactivity_duration: u32,
    approval_required: bool,
) -> OpsResult<Rule> {
    let user = require_user(auth)?;

    let rule = Rule {
        user_id: user.id.clone(),
        inactivity_duration,
        approval_required,
    };
    rules::upsert(conn, &rule)?;

    audit::insert(
        conn,
        &user.id,
        actions::RULE_UPDATED,
        json!({
            "inactivityDuration": inactivity_duration,
            "approvalRequired": approval_required,
        }),
    )?;

    Ok(rule)
}

/// The caller's rule; `None` when unauthenticated or unset.
pub fn get_rule<A: AuthProvider>(conn: &Connection, auth: &A) -> OpsResult<Option<Rule>> {
    match auth.current_user() {
        Some(user) => Ok(rules::get(conn, &user.id)?),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OpsError;
    use haven_core::{StaticAuth, User, UserId};
    use haven_store::{inactivity, open_in_memory, users};

    fn auth_for(conn: &Connection, id: &str) -> StaticAuth {
        let user = User {
            id: UserId::new(id),
            email: format!("{id}@example.com"),
            name: None,
            created_at: 0,
        };
        users::user_upsert(conn, &user).unwrap();
        StaticAuth::user(user)
    }

    #[test]
    fn test_set_and_get_rule() {
        let conn = open_in_memory().unwrap();
        let auth = auth_for(&conn, "u_1");

        assert!(get_rule(&conn, &auth).unwrap().is_none());

        set_rule(&conn, &auth, 30, false).unwrap();
        let rule = get_rule(&conn, &auth).unwrap().unwrap();
        assert_eq!(rule.inactivity_duration, 30);

        // Second set replaces
        set_rule(&conn, &auth, 5, true).unwrap();
        let rule = get_rule(&conn, &auth).unwrap().unwrap();
        assert_eq!(rule.inactivity_duration, 5);
        assert!(rule.approval_required);
    }

    #[test]
    fn test_anonymous() {
        let conn = open_in_memory().unwrap();
        let anon = StaticAuth::anonymous();

        assert!(matches!(
            set_rule(&conn, &anon, 30, false).unwrap_err(),
            OpsError::Unauthorized
        ));
        assert!(get_rule(&conn, &anon).unwrap().is_none());
    }

    #[test]
    fn test_set_rule_is_proof_of_life() {
        // Counter at 10, one unrelated owner mutation, counter back at 0
        let conn = open_in_memory().unwrap();
        let auth = auth_for(&conn, "u_1");
        let uid = UserId::new("u_1");
        inactivity::upsert_counter(&conn, &uid, 10).unwrap();

        set_rule(&conn, &auth, 30, false).unwrap();

        assert_eq!(
            inactivity::get(&conn, &uid).unwrap().unwrap().last_checked_at,
            0
        );
    }
}
