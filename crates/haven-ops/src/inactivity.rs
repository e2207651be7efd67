//! Owner-facing inactivity operations.

use crate::{require_user, OpsResult};
use haven_core::{audit as actions, AuthProvider, InactivityRecord};
use haven_escalation::{trigger_disclosure, DisclosureOutcome};
use haven_notify::{Mailer, NotifyConfig};
use haven_store::{audit, inactivity};
use rusqlite::Connection;
use serde_json::json;

/// Make sure the caller has an inactivity record, creating it at zero.
/// Called on signup; an existing record is left alone.
pub fn ensure_check<A: AuthProvider>(conn: &Connection, auth: &A) -> OpsResult<()> {
    let user = require_user(auth)?;
    inactivity::ensure(conn, &user.id)?;
    Ok(())
}

/// The caller's inactivity record; `None` when unauthenticated or absent.
pub fn get_check<A: AuthProvider>(
    conn: &Connection,
    auth: &A,
) -> OpsResult<Option<InactivityRecord>> {
    match auth.current_user() {
        Some(user) => Ok(inactivity::get(conn, &user.id)?),
        None => Ok(None),
    }
}

/// Issue a fresh wellness token on demand.
pub fn create_token<A: AuthProvider>(conn: &Connection, auth: &A) -> OpsResult<String> {
    let user = require_user(auth)?;
    Ok(inactivity::issue_token(conn, &user.id)?)
}

/// Manual reset: the owner declares themselves alive.
pub fn reset_inactivity<A: AuthProvider>(conn: &Connection, auth: &A) -> OpsResult<()> {
    let user = require_user(auth)?;

    inactivity::upsert_counter(conn, &user.id, 0)?;
    audit::insert(conn, &user.id, actions::INACTIVITY_RESET, json!({}))?;

    Ok(())
}

/// Owner escape hatch: run the dead man's switch right now.
pub async fn trigger_disclosure_now<A: AuthProvider, M: Mailer>(
    conn: &Connection,
    auth: &A,
    mailer: &M,
    cfg: &NotifyConfig,
) -> OpsResult<DisclosureOutcome> {
    let user = require_user(auth)?;
    Ok(trigger_disclosure(conn, mailer, cfg, &user).await?)
}
