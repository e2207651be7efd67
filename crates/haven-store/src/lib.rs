//! SQLite persistence layer.
//!
//! Five collections plus the users directory, all keyed by `user_id`.
//! Free functions over a `rusqlite::Connection`; a single connection in
//! WAL mode serializes every write, which is what gives the inactivity
//! counter its per-record atomicity (an increment and a reset can race,
//! last writer wins, but a row is never left half-written).

use rusqlite::Connection;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

pub mod audit;
pub mod contacts;
pub mod inactivity;
pub mod rules;
pub mod users;
pub mod vault;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Open (or create) the database at `path` and run migrations.
pub fn open_db(path: &Path) -> StoreResult<Connection> {
    let conn = Connection::open(path)?;
    conn.pragma_update(None, "journal_mode", "WAL")?;
    migrate(&conn)?;
    Ok(conn)
}

/// In-memory database for tests and one-shot tooling.
pub fn open_in_memory() -> StoreResult<Connection> {
    let conn = Connection::open_in_memory()?;
    migrate(&conn)?;
    Ok(conn)
}

fn migrate(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id         TEXT PRIMARY KEY,
            email      TEXT NOT NULL,
            name       TEXT,
            created_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS user_inactivity_checks (
            user_id         TEXT PRIMARY KEY,
            last_checked_at INTEGER NOT NULL DEFAULT 0,
            token           TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_inactivity_token
            ON user_inactivity_checks (token);

        CREATE TABLE IF NOT EXISTS rules (
            user_id             TEXT PRIMARY KEY,
            inactivity_duration INTEGER NOT NULL,
            approval_required   INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS trusted_contacts (
            id                  INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id             TEXT NOT NULL,
            contact_email       TEXT NOT NULL,
            verification_status TEXT NOT NULL DEFAULT 'pending'
        );
        CREATE INDEX IF NOT EXISTS idx_contacts_user ON trusted_contacts (user_id);

        CREATE TABLE IF NOT EXISTS vault_items (
            id                  INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id             TEXT NOT NULL,
            provider            TEXT NOT NULL,
            provider_account_id TEXT,
            name                TEXT NOT NULL,
            metadata            TEXT,
            recovery_methods    TEXT,
            encrypted_payload   TEXT NOT NULL,
            created_at          INTEGER NOT NULL,
            recovery_status     TEXT NOT NULL DEFAULT 'unverified'
        );
        CREATE INDEX IF NOT EXISTS idx_vault_user ON vault_items (user_id);

        CREATE TABLE IF NOT EXISTS audit_logs (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id   TEXT NOT NULL,
            action    TEXT NOT NULL,
            timestamp INTEGER NOT NULL,
            details   TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_audit_user ON audit_logs (user_id);
        ",
    )?;
    Ok(())
}

/// Current time as unix milliseconds.
pub fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Map an unparsable column value to a rusqlite conversion error.
pub(crate) fn bad_column(idx: usize, what: &str, value: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        idx,
        rusqlite::types::Type::Text,
        format!("invalid {what}: {value:?}").into(),
    )
}

/// Parse an optional JSON text column.
pub(crate) fn parse_json_col(
    idx: usize,
    col: Option<String>,
) -> rusqlite::Result<Option<serde_json::Value>> {
    match col {
        None => Ok(None),
        Some(s) => serde_json::from_str(&s).map(Some).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                idx,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_open_and_migrate() {
        let file = NamedTempFile::new().expect("create temp file");
        let conn = open_db(file.path()).expect("open db");

        // Migrations are idempotent
        migrate(&conn).expect("re-run migrations");

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN
                 ('users', 'user_inactivity_checks', 'rules', 'trusted_contacts',
                  'vault_items', 'audit_logs')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 6);
    }

    #[test]
    fn test_now_ms_monotonic_enough() {
        let a = now_ms();
        let b = now_ms();
        assert!(b >= a);
        assert!(a > 1_600_000_000_000); // sometime after 2020
    }
}
