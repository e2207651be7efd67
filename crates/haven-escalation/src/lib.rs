//! Haven inactivity escalation.
//!
//! The one piece of Haven with real state-transition logic. A periodic
//! cycle walks every user, advances their inactivity counter, and fires
//! the day's action:
//!
//! ```text
//! day 14          reminder email to the owner
//! day 17          wellness token issued + alert email per trusted contact
//! configured day  dead man's switch: recovery email per trusted contact
//! ```
//!
//! [`evaluator`] is the pure decision function; [`scheduler`] drives it
//! and owns per-user failure isolation; [`disclosure`] is the switch
//! itself; [`wellness`] handles the token-gated confirm/concern paths
//! that short-circuit the schedule from an email link.

pub mod disclosure;
pub mod evaluator;
pub mod scheduler;
pub mod wellness;

pub use disclosure::{trigger_disclosure, DisclosureOutcome};
pub use evaluator::{evaluate, Decision, ALERT_DAY, REMINDER_DAY};
pub use scheduler::{run_cycle, CycleReport, PAGE_SIZE};
pub use wellness::{concern, confirm, WellnessOutcome};

use thiserror::Error;

/// Errors from the escalation workflow.
///
/// Email dispatch failures never surface here — they are caught where
/// they happen and recorded as audit entries.
#[derive(Debug, Error)]
pub enum EscalationError {
    #[error("Store error: {0}")]
    Store(#[from] haven_store::StoreError),
}
