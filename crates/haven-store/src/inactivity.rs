//! Inactivity record store.
//!
//! One counter-and-token row per user. The raw counter write
//! ([`upsert_counter`]) deliberately performs no audit: the scheduler's
//! increment must not look like user activity, or it would reset itself.
//! User-attributable resets go through `audit::insert` instead.

use crate::StoreResult;
use haven_core::{InactivityRecord, UserId};
use rand::Rng;
use rusqlite::{params, Connection};

/// Get the record for a user.
pub fn get(conn: &Connection, user_id: &UserId) -> StoreResult<Option<InactivityRecord>> {
    let mut stmt = conn.prepare_cached(
        "SELECT user_id, last_checked_at, token
         FROM user_inactivity_checks WHERE user_id = ?1",
    )?;
    let mut rows = stmt.query(params![user_id.as_str()])?;
    match rows.next()? {
        Some(row) => Ok(Some(row_to_record(row)?)),
        None => Ok(None),
    }
}

/// Create the record at `last_checked_at`, or overwrite the counter if it
/// exists. Never touches the token.
pub fn upsert_counter(conn: &Connection, user_id: &UserId, last_checked_at: u32) -> StoreResult<()> {
    conn.execute(
        "INSERT INTO user_inactivity_checks (user_id, last_checked_at)
         VALUES (?1, ?2)
         ON CONFLICT(user_id) DO UPDATE SET
            last_checked_at = excluded.last_checked_at",
        params![user_id.as_str(), last_checked_at],
    )?;
    Ok(())
}

/// Ensure a record exists, creating it at zero. Existing records are left
/// untouched.
pub fn ensure(conn: &Connection, user_id: &UserId) -> StoreResult<()> {
    conn.execute(
        "INSERT INTO user_inactivity_checks (user_id, last_checked_at)
         VALUES (?1, 0)
         ON CONFLICT(user_id) DO NOTHING",
        params![user_id.as_str()],
    )?;
    Ok(())
}

/// Issue a fresh wellness token and store it on the record (created at
/// zero if absent). Six decimal digits; the collision chance across users
/// is accepted.
pub fn issue_token(conn: &Connection, user_id: &UserId) -> StoreResult<String> {
    let token = rand::thread_rng().gen_range(100_000..1_000_000).to_string();
    conn.execute(
        "INSERT INTO user_inactivity_checks (user_id, last_checked_at, token)
         VALUES (?1, 0, ?2)
         ON CONFLICT(user_id) DO UPDATE SET token = excluded.token",
        params![user_id.as_str(), token],
    )?;
    Ok(token)
}

/// Find the record holding `token`.
pub fn find_by_token(conn: &Connection, token: &str) -> StoreResult<Option<InactivityRecord>> {
    let mut stmt = conn.prepare_cached(
        "SELECT user_id, last_checked_at, token
         FROM user_inactivity_checks WHERE token = ?1",
    )?;
    let mut rows = stmt.query(params![token])?;
    match rows.next()? {
        Some(row) => Ok(Some(row_to_record(row)?)),
        None => Ok(None),
    }
}

/// Clear the stored token. Tokens are single-use: confirm/concern call
/// this after acting.
pub fn clear_token(conn: &Connection, user_id: &UserId) -> StoreResult<()> {
    conn.execute(
        "UPDATE user_inactivity_checks SET token = NULL WHERE user_id = ?1",
        params![user_id.as_str()],
    )?;
    Ok(())
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<InactivityRecord> {
    Ok(InactivityRecord {
        user_id: UserId::new(row.get::<_, String>(0)?),
        last_checked_at: row.get(1)?,
        token: row.get(2)?,
    })
}
