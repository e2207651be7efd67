//! Vault item store.
//!
//! Payloads arrive sealed from the client and are stored verbatim. The
//! JSON columns (metadata, recovery methods) round-trip as text.

use crate::{bad_column, parse_json_col, StoreResult};
use haven_core::{AssetId, RecoveryStatus, UserId, VaultItem};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fields accepted when creating a vault item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewVaultItem {
    pub provider: String,
    pub provider_account_id: Option<String>,
    pub name: String,
    pub metadata: Option<Value>,
    pub recovery_methods: Option<Value>,
    pub encrypted_payload: String,
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VaultPatch {
    pub name: Option<String>,
    pub metadata: Option<Value>,
    pub recovery_methods: Option<Value>,
    pub encrypted_payload: Option<String>,
}

/// Insert a vault item for a user. New items start `unverified`.
pub fn insert(
    conn: &Connection,
    user_id: &UserId,
    item: &NewVaultItem,
    created_at: i64,
) -> StoreResult<AssetId> {
    conn.execute(
        "INSERT INTO vault_items
            (user_id, provider, provider_account_id, name, metadata,
             recovery_methods, encrypted_payload, created_at, recovery_status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 'unverified')",
        params![
            user_id.as_str(),
            item.provider,
            item.provider_account_id,
            item.name,
            item.metadata.as_ref().map(Value::to_string),
            item.recovery_methods.as_ref().map(Value::to_string),
            item.encrypted_payload,
            created_at,
        ],
    )?;
    Ok(AssetId(conn.last_insert_rowid()))
}

/// Get a single vault item.
pub fn get(conn: &Connection, id: AssetId) -> StoreResult<Option<VaultItem>> {
    let mut stmt = conn.prepare_cached(&format!("{SELECT_COLS} WHERE id = ?1"))?;
    let mut rows = stmt.query(params![id.0])?;
    match rows.next()? {
        Some(row) => Ok(Some(row_to_item(row)?)),
        None => Ok(None),
    }
}

/// All vault items belonging to a user.
pub fn list(conn: &Connection, user_id: &UserId) -> StoreResult<Vec<VaultItem>> {
    let mut stmt = conn.prepare_cached(&format!("{SELECT_COLS} WHERE user_id = ?1 ORDER BY id"))?;
    let rows = stmt.query_map(params![user_id.as_str()], row_to_item)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Apply a partial update. Returns false if the row is gone.
pub fn patch(conn: &Connection, id: AssetId, patch: &VaultPatch) -> StoreResult<bool> {
    let affected = conn.execute(
        "UPDATE vault_items SET
            name = COALESCE(?2, name),
            metadata = COALESCE(?3, metadata),
            recovery_methods = COALESCE(?4, recovery_methods),
            encrypted_payload = COALESCE(?5, encrypted_payload)
         WHERE id = ?1",
        params![
            id.0,
            patch.name,
            patch.metadata.as_ref().map(Value::to_string),
            patch.recovery_methods.as_ref().map(Value::to_string),
            patch.encrypted_payload,
        ],
    )?;
    Ok(affected > 0)
}

/// Delete a vault item. Returns false if the row is gone.
pub fn delete(conn: &Connection, id: AssetId) -> StoreResult<bool> {
    let affected = conn.execute("DELETE FROM vault_items WHERE id = ?1", params![id.0])?;
    Ok(affected > 0)
}

const SELECT_COLS: &str = "SELECT id, user_id, provider, provider_account_id, name, metadata,
            recovery_methods, encrypted_payload, created_at, recovery_status
     FROM vault_items";

fn row_to_item(row: &rusqlite::Row<'_>) -> rusqlite::Result<VaultItem> {
    let status: String = row.get(9)?;
    Ok(VaultItem {
        id: AssetId(row.get(0)?),
        user_id: UserId::new(row.get::<_, String>(1)?),
        provider: row.get(2)?,
        provider_account_id: row.get(3)?,
        name: row.get(4)?,
        metadata: parse_json_col(5, row.get(5)?)?,
        recovery_methods: parse_json_col(6, row.get(6)?)?,
        encrypted_payload: row.get(7)?,
        created_at: row.get(8)?,
        recovery_status: RecoveryStatus::parse(&status)
            .ok_or_else(|| bad_column(9, "recovery status", &status))?,
    })
}
