//! Vault item operations.

use crate::{require_user, OpsError, OpsResult};
use haven_core::{audit as actions, AssetId, AuthProvider, VaultItem};
use haven_store::vault::{NewVaultItem, VaultPatch};
use haven_store::{audit, now_ms, vault};
use rusqlite::Connection;
use serde_json::json;

/// Store a new vault item for the caller.
pub fn add_asset<A: AuthProvider>(
    conn: &Connection,
    auth: &A,
    item: &NewVaultItem,
) -> OpsResult<AssetId> {
    let user = require_user(auth)?;

    let id = vault::insert(conn, &user.id, item, now_ms())?;
    audit::insert(
        conn,
        &user.id,
        actions::ASSET_ADDED,
        json!({ "assetName": item.name, "provider": item.provider }),
    )?;

    Ok(id)
}

/// The caller's vault items; empty for anonymous callers.
pub fn get_assets<A: AuthProvider>(conn: &Connection, auth: &A) -> OpsResult<Vec<VaultItem>> {
    match auth.current_user() {
        Some(user) => Ok(vault::list(conn, &user.id)?),
        None => Ok(Vec::new()),
    }
}

/// Partially update one of the caller's vault items.
pub fn update_asset<A: AuthProvider>(
    conn: &Connection,
    auth: &A,
    id: AssetId,
    patch: &VaultPatch,
) -> OpsResult<()> {
    let user = require_user(auth)?;

    let asset = owned_asset(conn, &user.id, id)?;
    vault::patch(conn, asset.id, patch)?;

    audit::insert(
        conn,
        &user.id,
        actions::ASSET_UPDATED,
        json!({ "assetId": id, "fields": patched_fields(patch) }),
    )?;

    Ok(())
}

/// Delete one of the caller's vault items.
pub fn delete_asset<A: AuthProvider>(conn: &Connection, auth: &A, id: AssetId) -> OpsResult<()> {
    let user = require_user(auth)?;

    let asset = owned_asset(conn, &user.id, id)?;
    vault::delete(conn, asset.id)?;

    audit::insert(
        conn,
        &user.id,
        actions::ASSET_DELETED,
        json!({ "assetId": id, "provider": asset.provider }),
    )?;

    Ok(())
}

/// Fetch an asset and check it belongs to the caller. Not-owned looks the
/// same as absent.
fn owned_asset(
    conn: &Connection,
    user_id: &haven_core::UserId,
    id: AssetId,
) -> OpsResult<VaultItem> {
    match vault::get(conn, id)? {
        Some(asset) if &asset.user_id == user_id => Ok(asset),
        _ => Err(OpsError::NotFound("Asset")),
    }
}

fn patched_fields(patch: &VaultPatch) -> Vec<&'static str> {
    let mut fields = Vec::new();
    if patch.name.is_some() {
        fields.push("name");
    }
    if patch.metadata.is_some() {
        fields.push("metadata");
    }
    if patch.recovery_methods.is_some() {
        fields.push("recoveryMethods");
    }
    if patch.encrypted_payload.is_some() {
        fields.push("encryptedPayload");
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
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

    fn new_item(name: &str) -> NewVaultItem {
        NewVaultItem {
            provider: "google".into(),
            provider_account_id: None,
            name: name.into(),
            metadata: None,
            recovery_methods: None,
            encrypted_payload: "enc_abcd_aGVsbG8=".into(),
        }
    }

    #[test]
    fn test_add_and_list() {
        let conn = open_in_memory().unwrap();
        let auth = auth_for(&conn, "u_1");

        add_asset(&conn, &auth, &new_item("Main account")).unwrap();

        let assets = get_assets(&conn, &auth).unwrap();
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].name, "Main account");

        assert!(get_assets(&conn, &StaticAuth::anonymous()).unwrap().is_empty());
    }

    #[test]
    fn test_update_own_asset() {
        let conn = open_in_memory().unwrap();
        let auth = auth_for(&conn, "u_1");
        let id = add_asset(&conn, &auth, &new_item("Main account")).unwrap();

        update_asset(
            &conn,
            &auth,
            id,
            &VaultPatch {
                name: Some("Renamed".into()),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(get_assets(&conn, &auth).unwrap()[0].name, "Renamed");
    }

    #[test]
    fn test_cannot_touch_foreign_asset() {
        let conn = open_in_memory().unwrap();
        let alice = auth_for(&conn, "u_alice");
        let mallory = auth_for(&conn, "u_mallory");
        let id = add_asset(&conn, &alice, &new_item("Main account")).unwrap();

        let err = update_asset(&conn, &mallory, id, &VaultPatch::default()).unwrap_err();
        assert!(matches!(err, OpsError::NotFound(_)));

        let err = delete_asset(&conn, &mallory, id).unwrap_err();
        assert!(matches!(err, OpsError::NotFound(_)));

        // Alice's asset is untouched
        assert_eq!(get_assets(&conn, &alice).unwrap().len(), 1);
    }

    #[test]
    fn test_delete() {
        let conn = open_in_memory().unwrap();
        let auth = auth_for(&conn, "u_1");
        let id = add_asset(&conn, &auth, &new_item("Main account")).unwrap();

        delete_asset(&conn, &auth, id).unwrap();
        assert!(get_assets(&conn, &auth).unwrap().is_empty());

        let err = delete_asset(&conn, &auth, id).unwrap_err();
        assert!(matches!(err, OpsError::NotFound(_)));
    }

    #[test]
    fn test_unauthorized_mutations() {
        let conn = open_in_memory().unwrap();
        let anon = StaticAuth::anonymous();

        assert!(matches!(
            add_asset(&conn, &anon, &new_item("x")).unwrap_err(),
            OpsError::Unauthorized
        ));
        assert!(matches!(
            delete_asset(&conn, &anon, AssetId(1)).unwrap_err(),
            OpsError::Unauthorized
        ));
    }

    #[test]
    fn test_vault_mutation_is_proof_of_life() {
        let conn = open_in_memory().unwrap();
        let auth = auth_for(&conn, "u_1");
        let uid = UserId::new("u_1");
        inactivity::upsert_counter(&conn, &uid, 10).unwrap();

        add_asset(&conn, &auth, &new_item("Main account")).unwrap();

        assert_eq!(
            inactivity::get(&conn, &uid).unwrap().unwrap().last_checked_at,
            0
        );
    }
}
