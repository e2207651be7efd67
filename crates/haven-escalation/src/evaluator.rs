//! Escalation policy evaluation.
//!
//! Pure logic — no I/O, no clock. Takes the user's inactivity record and
//! rule, returns what this cycle should do. The caller (scheduler or a
//! manual trigger) executes the side effects and persists the counter.
//!
//! The reminder and alert days are fixed constants; the configured
//! `inactivity_duration` selects only the disclosure day. Day values are
//! matched exactly, so a day stepped over (scheduler downtime spanning
//! more than one increment) skips its action.

use haven_core::{InactivityRecord, Rule};
use serde::{Deserialize, Serialize};

/// Day the owner gets a reminder email.
pub const REMINDER_DAY: u32 = 14;

/// Day trusted contacts get an alert with wellness links.
pub const ALERT_DAY: u32 = 17;

/// What one evaluation cycle should do for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    /// No record yet: create one at zero, nothing else this cycle.
    CreateRecord,
    /// Fixed reminder day: email the owner.
    Remind,
    /// Fixed alert day: issue a wellness token and email every trusted
    /// contact.
    Alert,
    /// The configured disclosure day: fire the dead man's switch.
    Disclose,
    /// Nothing due today; just advance the counter.
    Wait,
}

/// Decide the action for the user's current day.
///
/// The fixed-day branches take precedence: a rule whose duration lands
/// on day 14 or 17 never reaches the disclosure branch.
pub fn evaluate(record: Option<&InactivityRecord>, rule: Option<&Rule>) -> Decision {
    let Some(record) = record else {
        return Decision::CreateRecord;
    };

    if record.last_checked_at == REMINDER_DAY {
        Decision::Remind
    } else if record.last_checked_at == ALERT_DAY {
        Decision::Alert
    } else if rule.is_some_and(|r| r.inactivity_duration == record.last_checked_at) {
        Decision::Disclose
    } else {
        Decision::Wait
    }
}
