//! Trusted contact operations.

use crate::{require_user, OpsError, OpsResult};
use haven_core::{audit as actions, AuthProvider, ContactId, TrustedContact};
use haven_notify::{templates, Mailer, NotifyConfig};
use haven_store::{audit, contacts};
use rusqlite::Connection;
use serde::Serialize;
use serde_json::json;

/// Outcome of the public verification link. A closed set — the anonymous
/// visitor sees one of these, never a raw fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifyOutcome {
    Verified,
    NotFound,
    MissingEmail,
}

/// Add a trusted contact and send their verification invite.
///
/// The invite goes out first; if it cannot be sent the contact is not
/// created at all.
pub async fn add_contact<A: AuthProvider, M: Mailer>(
    conn: &Connection,
    auth: &A,
    mailer: &M,
    cfg: &NotifyConfig,
    contact_email: &str,
) -> OpsResult<ContactId> {
    let user = require_user(auth)?;

    let invite = templates::contact_invite_email(cfg, contact_email, false);
    mailer.send(&invite).await?;

    let id = contacts::insert(conn, &user.id, contact_email)?;
    audit::insert(
        conn,
        &user.id,
        actions::CONTACT_ADDED,
        json!({ "email": contact_email }),
    )?;

    Ok(id)
}

/// The caller's contacts; empty for anonymous callers.
pub fn get_contacts<A: AuthProvider>(conn: &Connection, auth: &A) -> OpsResult<Vec<TrustedContact>> {
    match auth.current_user() {
        Some(user) => Ok(contacts::list(conn, &user.id)?),
        None => Ok(Vec::new()),
    }
}

/// Resend the verification invite for an existing contact.
pub async fn resend_invite<A: AuthProvider, M: Mailer>(
    conn: &Connection,
    auth: &A,
    mailer: &M,
    cfg: &NotifyConfig,
    contact_email: &str,
) -> OpsResult<()> {
    let user = require_user(auth)?;

    let contact = contacts::find_for_user(conn, &user.id, contact_email)?
        .ok_or(OpsError::NotFound("Contact"))?;

    let invite = templates::contact_invite_email(cfg, &contact.contact_email, true);
    mailer.send(&invite).await?;

    audit::insert(
        conn,
        &user.id,
        actions::CONTACT_INVITE_RESENT,
        json!({ "email": contact_email }),
    )?;

    Ok(())
}

/// Remove one of the caller's contacts by email.
pub fn delete_contact<A: AuthProvider>(
    conn: &Connection,
    auth: &A,
    contact_email: &str,
) -> OpsResult<()> {
    let user = require_user(auth)?;

    let contact = contacts::find_for_user(conn, &user.id, contact_email)?
        .ok_or(OpsError::NotFound("Contact"))?;

    contacts::delete(conn, contact.id)?;
    audit::insert(
        conn,
        &user.id,
        actions::CONTACT_DELETED,
        json!({ "email": contact_email }),
    )?;

    Ok(())
}

/// Public verification endpoint, keyed by email alone.
///
/// Flips the first matching contact (across all users) to verified and
/// attributes the audit entry to that contact's owner.
pub fn verify_contact(conn: &Connection, contact_email: &str) -> OpsResult<VerifyOutcome> {
    if contact_email.is_empty() {
        return Ok(VerifyOutcome::MissingEmail);
    }

    let Some(contact) = contacts::find_any_by_email(conn, contact_email)? else {
        return Ok(VerifyOutcome::NotFound);
    };

    contacts::set_verified(conn, contact.id)?;
    audit::insert(
        conn,
        &contact.user_id,
        actions::CONTACT_VERIFIED,
        json!({ "email": contact_email }),
    )?;

    log::info!("Contact {} verified for {}", contact.id, contact.user_id);
    Ok(VerifyOutcome::Verified)
}

#[cfg(test)]
mod tests {
    use super::*;
    use haven_core::{StaticAuth, User, UserId, VerificationStatus};
    use haven_notify::MemoryMailer;
    use haven_store::{inactivity, open_in_memory, users};

    fn cfg() -> NotifyConfig {
        NotifyConfig::new("Haven <noreply@haven.app>", "https://haven.app")
    }

    fn owner(conn: &Connection) -> StaticAuth {
        let user = User {
            id: UserId::new("u_1"),
            email: "owner@example.com".into(),
            name: None,
            created_at: 0,
        };
        users::user_upsert(conn, &user).unwrap();
        StaticAuth::user(user)
    }

    #[tokio::test]
    async fn test_add_contact_sends_invite_then_inserts() {
        let conn = open_in_memory().unwrap();
        let mailer = MemoryMailer::new();
        let auth = owner(&conn);

        add_contact(&conn, &auth, &mailer, &cfg(), "kin@example.com")
            .await
            .unwrap();

        let sent = mailer.sent_to("kin@example.com");
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "Verify your trusted contact");

        let list = get_contacts(&conn, &auth).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].verification_status, VerificationStatus::Pending);
    }

    #[tokio::test]
    async fn test_add_contact_invite_failure_creates_nothing() {
        let conn = open_in_memory().unwrap();
        let mailer = MemoryMailer::new();
        mailer.fail_for("kin@example.com");
        let auth = owner(&conn);

        let err = add_contact(&conn, &auth, &mailer, &cfg(), "kin@example.com")
            .await
            .unwrap_err();

        assert!(matches!(err, OpsError::Email(_)));
        assert!(get_contacts(&conn, &auth).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_anonymous_callers() {
        let conn = open_in_memory().unwrap();
        let mailer = MemoryMailer::new();
        let anon = StaticAuth::anonymous();

        let err = add_contact(&conn, &anon, &mailer, &cfg(), "kin@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, OpsError::Unauthorized));

        // Queries degrade to empty, not errors
        assert!(get_contacts(&conn, &anon).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_resend_and_delete_not_found() {
        let conn = open_in_memory().unwrap();
        let mailer = MemoryMailer::new();
        let auth = owner(&conn);

        let err = resend_invite(&conn, &auth, &mailer, &cfg(), "nobody@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, OpsError::NotFound(_)));

        let err = delete_contact(&conn, &auth, "nobody@example.com").unwrap_err();
        assert!(matches!(err, OpsError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_contact() {
        let conn = open_in_memory().unwrap();
        let mailer = MemoryMailer::new();
        let auth = owner(&conn);

        add_contact(&conn, &auth, &mailer, &cfg(), "kin@example.com")
            .await
            .unwrap();
        delete_contact(&conn, &auth, "kin@example.com").unwrap();

        assert!(get_contacts(&conn, &auth).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_verify_contact_public_flow() {
        let conn = open_in_memory().unwrap();
        let mailer = MemoryMailer::new();
        let auth = owner(&conn);

        add_contact(&conn, &auth, &mailer, &cfg(), "kin@example.com")
            .await
            .unwrap();

        assert_eq!(
            verify_contact(&conn, "kin@example.com").unwrap(),
            VerifyOutcome::Verified
        );
        let list = get_contacts(&conn, &auth).unwrap();
        assert_eq!(list[0].verification_status, VerificationStatus::Verified);

        assert_eq!(
            verify_contact(&conn, "nobody@example.com").unwrap(),
            VerifyOutcome::NotFound
        );
        assert_eq!(verify_contact(&conn, "").unwrap(), VerifyOutcome::MissingEmail);
    }

    #[tokio::test]
    async fn test_verify_miss_leaves_contacts_unchanged() {
        let conn = open_in_memory().unwrap();
        let mailer = MemoryMailer::new();
        let auth = owner(&conn);
        add_contact(&conn, &auth, &mailer, &cfg(), "kin@example.com")
            .await
            .unwrap();

        verify_contact(&conn, "stranger@example.com").unwrap();

        let list = get_contacts(&conn, &auth).unwrap();
        assert_eq!(list[0].verification_status, VerificationStatus::Pending);
    }

    #[tokio::test]
    async fn test_contact_mutation_is_proof_of_life() {
        let conn = open_in_memory().unwrap();
        let mailer = MemoryMailer::new();
        let auth = owner(&conn);
        let uid = UserId::new("u_1");
        inactivity::upsert_counter(&conn, &uid, 10).unwrap();

        add_contact(&conn, &auth, &mailer, &cfg(), "kin@example.com")
            .await
            .unwrap();

        let rec = inactivity::get(&conn, &uid).unwrap().unwrap();
        assert_eq!(rec.last_checked_at, 0);
    }
}
