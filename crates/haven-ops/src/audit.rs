//! Audit trail view.

use crate::OpsResult;
use haven_core::{AuditLogEntry, AuthProvider};
use haven_store::audit;
use rusqlite::Connection;

/// The caller's recent activity, newest first; empty for anonymous
/// callers.
pub fn get_logs<A: AuthProvider>(conn: &Connection, auth: &A) -> OpsResult<Vec<AuditLogEntry>> {
    match auth.current_user() {
        Some(user) => Ok(audit::recent(conn, &user.id, audit::RECENT_LIMIT)?),
        None => Ok(Vec::new()),
    }
}
