//! Token-gated wellness paths.
//!
//! The day-17 alert email hands each trusted contact two links carrying a
//! one-time token. Both land here, unauthenticated, so the result is a
//! closed set of outcomes the page can render — a bad token is an answer,
//! not a fault.
//!
//! Tokens are single-use: both paths clear the token before acting.

use crate::disclosure::{trigger_disclosure, DisclosureOutcome};
use crate::EscalationError;
use haven_core::audit as actions;
use haven_notify::{Mailer, NotifyConfig};
use haven_store::{audit, inactivity, users};
use rusqlite::Connection;
use serde::Serialize;
use serde_json::json;

/// Outcome of a wellness link click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WellnessOutcome {
    /// The contact vouched for the owner; the countdown restarted.
    Confirmed,
    /// The contact raised a concern; disclosure ran immediately.
    Disclosed,
    /// Token unknown (or already used).
    NotFound,
    /// No token in the request.
    MissingToken,
}

/// "They're fine": reset the owner's counter to zero.
pub fn confirm(conn: &Connection, token: &str) -> Result<WellnessOutcome, EscalationError> {
    if token.is_empty() {
        return Ok(WellnessOutcome::MissingToken);
    }

    let Some(record) = inactivity::find_by_token(conn, token)? else {
        return Ok(WellnessOutcome::NotFound);
    };

    inactivity::clear_token(conn, &record.user_id)?;
    inactivity::upsert_counter(conn, &record.user_id, 0)?;
    audit::insert(conn, &record.user_id, actions::INACTIVITY_RESET, json!({}))?;

    log::info!("Wellness confirmed for {}; countdown reset", record.user_id);
    Ok(WellnessOutcome::Confirmed)
}

/// "I'm concerned": run the dead man's switch for the owner now,
/// bypassing the schedule.
pub async fn concern<M: Mailer>(
    conn: &Connection,
    mailer: &M,
    cfg: &NotifyConfig,
    token: &str,
) -> Result<WellnessOutcome, EscalationError> {
    if token.is_empty() {
        return Ok(WellnessOutcome::MissingToken);
    }

    let Some(record) = inactivity::find_by_token(conn, token)? else {
        return Ok(WellnessOutcome::NotFound);
    };

    let Some(user) = users::user_get(conn, &record.user_id)? else {
        log::warn!("Wellness token resolves to unknown user {}", record.user_id);
        return Ok(WellnessOutcome::NotFound);
    };

    inactivity::clear_token(conn, &record.user_id)?;
    let outcome: DisclosureOutcome = trigger_disclosure(conn, mailer, cfg, &user).await?;
    log::info!("Wellness concern for {}: {outcome:?}", user.id);

    Ok(WellnessOutcome::Disclosed)
}
