//! Trusted contact store.
//!
//! No uniqueness constraint on `(user_id, contact_email)`: duplicate
//! invites create duplicate rows, matching the observed system.

use crate::{bad_column, StoreResult};
use haven_core::{ContactId, TrustedContact, UserId, VerificationStatus};
use rusqlite::{params, Connection};

/// Insert a new contact in `pending` state.
pub fn insert(conn: &Connection, user_id: &UserId, contact_email: &str) -> StoreResult<ContactId> {
    conn.execute(
        "INSERT INTO trusted_contacts (user_id, contact_email, verification_status)
         VALUES (?1, ?2, 'pending')",
        params![user_id.as_str(), contact_email],
    )?;
    Ok(ContactId(conn.last_insert_rowid()))
}

/// All contacts belonging to a user.
pub fn list(conn: &Connection, user_id: &UserId) -> StoreResult<Vec<TrustedContact>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, user_id, contact_email, verification_status
         FROM trusted_contacts WHERE user_id = ?1 ORDER BY id",
    )?;
    let rows = stmt.query_map(params![user_id.as_str()], row_to_contact)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// A user's contact with the given email, if any. Duplicates resolve to
/// the earliest row.
pub fn find_for_user(
    conn: &Connection,
    user_id: &UserId,
    contact_email: &str,
) -> StoreResult<Option<TrustedContact>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, user_id, contact_email, verification_status
         FROM trusted_contacts
         WHERE user_id = ?1 AND contact_email = ?2
         ORDER BY id LIMIT 1",
    )?;
    let mut rows = stmt.query(params![user_id.as_str(), contact_email])?;
    match rows.next()? {
        Some(row) => Ok(Some(row_to_contact(row)?)),
        None => Ok(None),
    }
}

/// First contact with the given email across ALL users.
///
/// Serves the public verification link, which carries nothing but the
/// email address.
pub fn find_any_by_email(conn: &Connection, contact_email: &str) -> StoreResult<Option<TrustedContact>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, user_id, contact_email, verification_status
         FROM trusted_contacts WHERE contact_email = ?1
         ORDER BY id LIMIT 1",
    )?;
    let mut rows = stmt.query(params![contact_email])?;
    match rows.next()? {
        Some(row) => Ok(Some(row_to_contact(row)?)),
        None => Ok(None),
    }
}

/// Flip a contact to `verified`. Returns false if the row is gone.
pub fn set_verified(conn: &Connection, id: ContactId) -> StoreResult<bool> {
    let affected = conn.execute(
        "UPDATE trusted_contacts SET verification_status = 'verified' WHERE id = ?1",
        params![id.0],
    )?;
    Ok(affected > 0)
}

/// Delete a contact. Returns false if the row is gone.
pub fn delete(conn: &Connection, id: ContactId) -> StoreResult<bool> {
    let affected = conn.execute("DELETE FROM trusted_contacts WHERE id = ?1", params![id.0])?;
    Ok(affected > 0)
}

fn row_to_contact(row: &rusqlite::Row<'_>) -> rusqlite::Result<TrustedContact> {
    let status: String = row.get(3)?;
    Ok(TrustedContact {
        id: ContactId(row.get(0)?),
        user_id: UserId::new(row.get::<_, String>(1)?),
        contact_email: row.get(2)?,
        verification_status: VerificationStatus::parse(&status)
            .ok_or_else(|| bad_column(3, "verification status", &status))?,
    })
}
