//! Recovery-material extraction from sealed vault items.
//!
//! Payload shapes are provider-specific and client-authored, so nothing
//! here trusts them: a missing or malformed field yields `None` for that
//! item, never an error. Disclosure emails are built from whatever
//! survives.

use crate::entities::VaultItem;
use crate::sealed;
use serde_json::Value;

/// Pull the first two-factor backup entry out of a decoded payload.
///
/// Expected shape: `{"recoveryMethods": {"twoFactorBackups": [..]}}`.
pub fn backup_codes(payload: &Value) -> Option<Value> {
    payload
        .get("recoveryMethods")?
        .get("twoFactorBackups")?
        .get(0)
        .cloned()
}

/// Open every item and collect its backup codes, skipping items whose
/// payload will not open or does not carry them.
pub fn aggregate_backup_codes<'a, I>(items: I) -> Vec<Value>
where
    I: IntoIterator<Item = &'a VaultItem>,
{
    items
        .into_iter()
        .filter_map(|item| {
            let plaintext = sealed::open_embedded(&item.encrypted_payload).ok()?;
            let payload: Value = serde_json::from_str(&plaintext).ok()?;
            backup_codes(&payload)
        })
        .collect()
}
