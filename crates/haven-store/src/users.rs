//! Users directory.
//!
//! A minimal mirror of the auth provider's registry, synced on
//! signup/login. The escalation scheduler pages through it; nothing else
//! in Haven owns user identity.

use crate::StoreResult;
use haven_core::{User, UserId};
use rusqlite::{params, Connection};

/// Insert or refresh a user row.
pub fn user_upsert(conn: &Connection, user: &User) -> StoreResult<()> {
    conn.execute(
        "INSERT INTO users (id, email, name, created_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(id) DO UPDATE SET
            email = excluded.email,
            name = excluded.name",
        params![user.id.as_str(), user.email, user.name, user.created_at],
    )?;
    Ok(())
}

/// Get a single user by id.
pub fn user_get(conn: &Connection, user_id: &UserId) -> StoreResult<Option<User>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, email, name, created_at FROM users WHERE id = ?1",
    )?;
    let mut rows = stmt.query(params![user_id.as_str()])?;
    match rows.next()? {
        Some(row) => Ok(Some(row_to_user(row)?)),
        None => Ok(None),
    }
}

/// One page of users, ordered by id.
///
/// `cursor` is the last id of the previous page; pass `None` for the
/// first page. Returns fewer than `num_items` rows only on the final
/// page.
pub fn users_page(
    conn: &Connection,
    cursor: Option<&UserId>,
    num_items: u32,
) -> StoreResult<Vec<User>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, email, name, created_at FROM users
         WHERE ?1 IS NULL OR id > ?1
         ORDER BY id
         LIMIT ?2",
    )?;
    let rows = stmt.query_map(
        params![cursor.map(|c| c.as_str()), num_items],
        row_to_user,
    )?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: UserId::new(row.get::<_, String>(0)?),
        email: row.get(1)?,
        name: row.get(2)?,
        created_at: row.get(3)?,
    })
}
