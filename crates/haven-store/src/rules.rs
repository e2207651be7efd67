//! Escalation rule store. One rule per user.

use crate::StoreResult;
use haven_core::{Rule, UserId};
use rusqlite::{params, Connection};

/// Insert or replace a user's rule.
pub fn upsert(conn: &Connection, rule: &Rule) -> StoreResult<()> {
    conn.execute(
        "INSERT INTO rules (user_id, inactivity_duration, approval_required)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(user_id) DO UPDATE SET
            inactivity_duration = excluded.inactivity_duration,
            approval_required = excluded.approval_required",
        params![
            rule.user_id.as_str(),
            rule.inactivity_duration,
            rule.approval_required as i32
        ],
    )?;
    Ok(())
}

/// Get a user's rule.
pub fn get(conn: &Connection, user_id: &UserId) -> StoreResult<Option<Rule>> {
    let mut stmt = conn.prepare_cached(
        "SELECT user_id, inactivity_duration, approval_required
         FROM rules WHERE user_id = ?1",
    )?;
    let mut rows = stmt.query(params![user_id.as_str()])?;
    match rows.next()? {
        Some(row) => Ok(Some(Rule {
            user_id: UserId::new(row.get::<_, String>(0)?),
            inactivity_duration: row.get(1)?,
            approval_required: row.get::<_, i32>(2)? != 0,
        })),
        None => Ok(None),
    }
}
