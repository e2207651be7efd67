//! Audit trail.
//!
//! Append-only. Inserting an entry doubles as the proof-of-life signal:
//! any audited action resets the owner's inactivity counter to zero. A
//! failed reset is swallowed — the audit entry must land either way.

use crate::{now_ms, StoreResult};
use haven_core::{AuditLogEntry, UserId};
use rusqlite::{params, Connection};
use serde_json::Value;

/// Default page size for the dashboard's recent-activity view.
pub const RECENT_LIMIT: u32 = 50;

/// Append an audit entry and reset the user's inactivity counter.
///
/// The reset touches only an existing record; a user without one stays
/// without one. Reset failures are logged and ignored.
pub fn insert(conn: &Connection, user_id: &UserId, action: &str, details: Value) -> StoreResult<()> {
    conn.execute(
        "INSERT INTO audit_logs (user_id, action, timestamp, details)
         VALUES (?1, ?2, ?3, ?4)",
        params![user_id.as_str(), action, now_ms(), details.to_string()],
    )?;

    let reset = conn.execute(
        "UPDATE user_inactivity_checks SET last_checked_at = 0 WHERE user_id = ?1",
        params![user_id.as_str()],
    );
    if let Err(e) = reset {
        log::warn!("Inactivity reset for {user_id} failed after audit write: {e}");
    }

    Ok(())
}

/// Most recent entries for a user, newest first.
pub fn recent(conn: &Connection, user_id: &UserId, limit: u32) -> StoreResult<Vec<AuditLogEntry>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, user_id, action, timestamp, details
         FROM audit_logs WHERE user_id = ?1
         ORDER BY id DESC LIMIT ?2",
    )?;
    let rows = stmt.query_map(params![user_id.as_str(), limit], |row| {
        let details: Option<String> = row.get(4)?;
        Ok(AuditLogEntry {
            id: row.get(0)?,
            user_id: UserId::new(row.get::<_, String>(1)?),
            action: row.get(2)?,
            timestamp: row.get(3)?,
            details: details
                .and_then(|s| serde_json::from_str(&s).ok())
                .unwrap_or(Value::Null),
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Count entries with a given action for a user. Test and tooling helper.
pub fn count_action(conn: &Connection, user_id: &UserId, action: &str) -> StoreResult<u32> {
    let mut stmt = conn.prepare_cached(
        "SELECT COUNT(*) FROM audit_logs WHERE user_id = ?1 AND action = ?2",
    )?;
    Ok(stmt.query_row(params![user_id.as_str(), action], |row| row.get(0))?)
}
