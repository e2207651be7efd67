//! The escalation cycle driver.
//!
//! Runs once per trigger interval (hourly in production). Pages through
//! the users directory, evaluates each user, executes the day's side
//! effects, then persists the incremented counter. One user's failure is
//! that user's alone: it is logged, tallied, and the walk continues.

use crate::disclosure::trigger_disclosure;
use crate::evaluator::{evaluate, Decision};
use crate::EscalationError;
use haven_core::User;
use haven_notify::{templates, Mailer, NotifyConfig};
use haven_store::{contacts, inactivity, rules, users};
use rusqlite::Connection;
use serde::Serialize;

/// Users fetched per page while walking the directory.
pub const PAGE_SIZE: u32 = 100;

/// Result aggregation for one full cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    pub users_seen: u32,
    pub records_created: u32,
    pub reminders_sent: u32,
    pub alerts_sent: u32,
    pub disclosures: u32,
    /// Reminder/alert emails that bounced; the user's cycle still counts.
    pub email_failures: u32,
    /// Users whose cycle aborted (store failure); their counter is left
    /// unchanged.
    pub failures: u32,
}

/// Walk every user once and apply the escalation policy.
///
/// Pages to completion before returning. Only a failure to read the
/// directory itself aborts the cycle.
pub async fn run_cycle<M: Mailer>(
    conn: &Connection,
    mailer: &M,
    cfg: &NotifyConfig,
) -> Result<CycleReport, EscalationError> {
    let mut report = CycleReport::default();
    let mut cursor = None;

    loop {
        let page = users::users_page(conn, cursor.as_ref(), PAGE_SIZE)?;
        let Some(last) = page.last() else {
            break;
        };
        cursor = Some(last.id.clone());

        for user in &page {
            report.users_seen += 1;
            match process_user(conn, mailer, cfg, user, &mut report).await {
                Ok(()) => {}
                Err(e) => {
                    report.failures += 1;
                    log::error!("Escalation cycle failed for {}: {e}", user.id);
                }
            }
        }

        if page.len() < PAGE_SIZE as usize {
            break;
        }
    }

    Ok(report)
}

/// One user's cycle: evaluate, act, increment.
///
/// The counter write happens last, from the snapshot read at the top, so
/// a failed step leaves it unchanged rather than half-advanced.
async fn process_user<M: Mailer>(
    conn: &Connection,
    mailer: &M,
    cfg: &NotifyConfig,
    user: &User,
    report: &mut CycleReport,
) -> Result<(), EscalationError> {
    let record = inactivity::get(conn, &user.id)?;
    let rule = rules::get(conn, &user.id)?;

    let decision = evaluate(record.as_ref(), rule.as_ref());
    let day = record.as_ref().map(|r| r.last_checked_at).unwrap_or(0);

    match decision {
        Decision::CreateRecord => {
            inactivity::upsert_counter(conn, &user.id, 0)?;
            report.records_created += 1;
            // A fresh record sits at day zero until the next cycle
            return Ok(());
        }

        Decision::Wait => {}

        Decision::Remind => {
            let email = templates::reminder_email(cfg, user, day);
            match mailer.send(&email).await {
                Ok(()) => report.reminders_sent += 1,
                Err(e) => {
                    report.email_failures += 1;
                    log::warn!("Reminder email to {} failed: {e}", user.id);
                }
            }
        }

        Decision::Alert => {
            let token = inactivity::issue_token(conn, &user.id)?;
            let recipients = contacts::list(conn, &user.id)?;
            let mut delivered = false;
            for contact in &recipients {
                let email = templates::contact_alert_email(cfg, user, contact, day, &token);
                match mailer.send(&email).await {
                    Ok(()) => delivered = true,
                    Err(e) => {
                        report.email_failures += 1;
                        log::warn!(
                            "Alert email to contact {} for {} failed: {e}",
                            contact.id,
                            user.id
                        );
                    }
                }
            }
            if delivered {
                report.alerts_sent += 1;
            }
        }

        Decision::Disclose => {
            trigger_disclosure(conn, mailer, cfg, user).await?;
            report.disclosures += 1;
        }
    }

    inactivity::upsert_counter(conn, &user.id, day + 1)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use haven_core::{Rule, UserId};
    use haven_notify::MemoryMailer;
    use haven_store::open_in_memory;

    fn cfg() -> NotifyConfig {
        NotifyConfig::new("Haven <noreply@haven.app>", "https://haven.app")
    }

    fn add_user(conn: &Connection, id: &str) -> User {
        let user = User {
            id: UserId::new(id),
            email: format!("{id}@example.com"),
            name: None,
            created_at: 0,
        };
        users::user_upsert(conn, &user).unwrap();
        user
    }

    #[tokio::test]
    async fn test_first_cycle_creates_records_at_zero() {
        let conn = open_in_memory().unwrap();
        let mailer = MemoryMailer::new();
        add_user(&conn, "u_1");
        add_user(&conn, "u_2");

        let report = run_cycle(&conn, &mailer, &cfg()).await.unwrap();

        assert_eq!(report.users_seen, 2);
        assert_eq!(report.records_created, 2);
        assert!(mailer.sent().is_empty());
        for id in ["u_1", "u_2"] {
            let rec = inactivity::get(&conn, &UserId::new(id)).unwrap().unwrap();
            assert_eq!(rec.last_checked_at, 0);
        }
    }

    #[tokio::test]
    async fn test_counter_advances_each_cycle() {
        let conn = open_in_memory().unwrap();
        let mailer = MemoryMailer::new();
        add_user(&conn, "u_1");

        run_cycle(&conn, &mailer, &cfg()).await.unwrap(); // creates at 0
        run_cycle(&conn, &mailer, &cfg()).await.unwrap(); // 0 -> 1
        run_cycle(&conn, &mailer, &cfg()).await.unwrap(); // 1 -> 2

        let rec = inactivity::get(&conn, &UserId::new("u_1")).unwrap().unwrap();
        assert_eq!(rec.last_checked_at, 2);
    }

    #[tokio::test]
    async fn test_reminder_day() {
        let conn = open_in_memory().unwrap();
        let mailer = MemoryMailer::new();
        let user = add_user(&conn, "u_1");
        inactivity::upsert_counter(&conn, &user.id, 14).unwrap();

        let report = run_cycle(&conn, &mailer, &cfg()).await.unwrap();

        assert_eq!(report.reminders_sent, 1);
        assert_eq!(mailer.sent_to("u_1@example.com").len(), 1);
        assert_eq!(mailer.sent()[0].subject, "Are you still there?");
        let rec = inactivity::get(&conn, &user.id).unwrap().unwrap();
        assert_eq!(rec.last_checked_at, 15);
    }

    #[tokio::test]
    async fn test_alert_day_issues_token_and_mails_contacts() {
        let conn = open_in_memory().unwrap();
        let mailer = MemoryMailer::new();
        let user = add_user(&conn, "u_1");
        inactivity::upsert_counter(&conn, &user.id, 17).unwrap();
        contacts::insert(&conn, &user.id, "kin@example.com").unwrap();
        contacts::insert(&conn, &user.id, "friend@example.com").unwrap();

        let report = run_cycle(&conn, &mailer, &cfg()).await.unwrap();

        assert_eq!(report.alerts_sent, 1);
        assert_eq!(mailer.sent().len(), 2);

        let rec = inactivity::get(&conn, &user.id).unwrap().unwrap();
        assert_eq!(rec.last_checked_at, 18);
        let token = rec.token.expect("token issued");
        for sent in mailer.sent() {
            assert!(sent.html.contains(&token));
        }
    }

    #[tokio::test]
    async fn test_disclosure_day_respects_configured_duration() {
        let conn = open_in_memory().unwrap();
        let mailer = MemoryMailer::new();
        let user = add_user(&conn, "u_1");
        inactivity::upsert_counter(&conn, &user.id, 5).unwrap();
        rules::upsert(
            &conn,
            &Rule {
                user_id: user.id.clone(),
                inactivity_duration: 5,
                approval_required: false,
            },
        )
        .unwrap();

        let report = run_cycle(&conn, &mailer, &cfg()).await.unwrap();

        // No assets: the switch fired but had nothing to send
        assert_eq!(report.disclosures, 1);
        assert!(mailer.sent().is_empty());
        let rec = inactivity::get(&conn, &user.id).unwrap().unwrap();
        assert_eq!(rec.last_checked_at, 6);
    }

    #[tokio::test]
    async fn test_email_failure_still_advances_counter() {
        let conn = open_in_memory().unwrap();
        let mailer = MemoryMailer::new();
        mailer.fail_for("u_1@example.com");
        let user = add_user(&conn, "u_1");
        inactivity::upsert_counter(&conn, &user.id, 14).unwrap();

        let report = run_cycle(&conn, &mailer, &cfg()).await.unwrap();

        assert_eq!(report.reminders_sent, 0);
        assert_eq!(report.email_failures, 1);
        assert_eq!(report.failures, 0);
        let rec = inactivity::get(&conn, &user.id).unwrap().unwrap();
        assert_eq!(rec.last_checked_at, 15);
    }

    #[tokio::test]
    async fn test_walks_more_than_one_page() {
        let conn = open_in_memory().unwrap();
        let mailer = MemoryMailer::new();
        for i in 0..(PAGE_SIZE + 25) {
            add_user(&conn, &format!("u_{i:04}"));
        }

        let report = run_cycle(&conn, &mailer, &cfg()).await.unwrap();

        assert_eq!(report.users_seen, PAGE_SIZE + 25);
        assert_eq!(report.records_created, PAGE_SIZE + 25);
    }
}
