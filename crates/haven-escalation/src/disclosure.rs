//! The dead man's switch.
//!
//! Gathers the user's vault items and trusted contacts, aggregates the
//! recovery material, and broadcasts one recovery email per contact.
//! Fire-and-forget: a contact that cannot be reached is recorded in the
//! audit trail and the broadcast moves on. No rollback, no idempotency
//! guard — a repeated trigger repeats the disclosure.

use crate::EscalationError;
use haven_core::{audit as actions, recovery, User};
use haven_notify::{templates, Mailer, NotifyConfig};
use haven_store::{audit, contacts, vault};
use rusqlite::Connection;
use serde::Serialize;
use serde_json::json;

/// What a disclosure attempt amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DisclosureOutcome {
    /// Nothing in the vault; no email went out.
    NoAssets,
    /// One email per contact was attempted.
    Sent { attempted: u32, failed: u32 },
}

/// Run the switch for one user.
///
/// Invoked by the scheduler when the configured day arrives, by the
/// token-gated concern path, and by the owner's manual trigger.
pub async fn trigger_disclosure<M: Mailer>(
    conn: &Connection,
    mailer: &M,
    cfg: &NotifyConfig,
    user: &User,
) -> Result<DisclosureOutcome, EscalationError> {
    let recipients = contacts::list(conn, &user.id)?;
    let assets = vault::list(conn, &user.id)?;

    if assets.is_empty() {
        log::info!("Disclosure for {}: no assets, nothing to send", user.id);
        audit::insert(
            conn,
            &user.id,
            actions::SWITCH_NO_ASSETS,
            json!({ "message": "No assets found to send to contacts" }),
        )?;
        return Ok(DisclosureOutcome::NoAssets);
    }

    // Items with unreadable payloads or no backup codes contribute
    // nothing; the email still lists every asset by name.
    let backup_codes = recovery::aggregate_backup_codes(&assets);

    let mut failed = 0u32;
    for contact in &recipients {
        let email = templates::recovery_email(cfg, user, contact, &assets, &backup_codes);
        match mailer.send(&email).await {
            Ok(()) => {
                log::info!("Recovery email sent to contact {} for {}", contact.id, user.id);
            }
            Err(e) => {
                failed += 1;
                log::warn!(
                    "Recovery email to contact {} for {} failed: {e}",
                    contact.id,
                    user.id
                );
                audit::insert(
                    conn,
                    &user.id,
                    actions::SWITCH_SEND_FAILED,
                    json!({ "contactId": contact.id, "error": e.to_string() }),
                )?;
            }
        }
    }

    audit::insert(
        conn,
        &user.id,
        actions::SWITCH_TRIGGERED,
        json!({ "contacts": recipients.len(), "failed": failed }),
    )?;

    Ok(DisclosureOutcome::Sent {
        attempted: recipients.len() as u32,
        failed,
    })
}
