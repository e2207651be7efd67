//! Owner-facing operations.
//!
//! The API the (out-of-scope) web dashboard calls. Every mutation
//! resolves the caller through the [`AuthProvider`] port, rejects
//! anonymous callers with [`OpsError::Unauthorized`], and appends an
//! audit entry — which doubles as the proof-of-life signal that resets
//! the owner's inactivity counter. Queries return empty results for
//! anonymous callers instead of failing.
//!
//! [`AuthProvider`]: haven_core::AuthProvider

pub mod audit;
pub mod contacts;
pub mod inactivity;
pub mod rules;
pub mod vault;

use haven_core::{AuthProvider, User};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OpsError {
    /// No authenticated user behind an owner-scoped mutation.
    #[error("Unauthorized")]
    Unauthorized,

    /// Referenced entity absent or not owned by the caller.
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Store error: {0}")]
    Store(#[from] haven_store::StoreError),

    #[error("Email error: {0}")]
    Email(#[from] haven_notify::NotifyError),

    #[error(transparent)]
    Escalation(#[from] haven_escalation::EscalationError),
}

pub type OpsResult<T> = Result<T, OpsError>;

/// Resolve the caller or reject the mutation.
pub(crate) fn require_user<A: AuthProvider>(auth: &A) -> OpsResult<User> {
    auth.current_user().ok_or(OpsError::Unauthorized)
}
