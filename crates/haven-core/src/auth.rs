//! Auth provider port.
//!
//! Identity lives in an external provider (social/email login, sessions).
//! Haven only ever asks one question: who is the current caller? Owner
//! operations reject with Unauthorized when the answer is nobody; queries
//! return empty results instead.

use crate::entities::User;

/// The identity interface Haven consumes.
pub trait AuthProvider {
    /// The authenticated user behind the current request, if any.
    fn current_user(&self) -> Option<User>;
}

/// Fixed-answer provider for tests and one-shot tooling.
#[derive(Debug, Clone, Default)]
pub struct StaticAuth(pub Option<User>);

impl StaticAuth {
    pub fn user(user: User) -> Self {
        Self(Some(user))
    }

    pub fn anonymous() -> Self {
        Self(None)
    }
}

impl AuthProvider for StaticAuth {
    fn current_user(&self) -> Option<User> {
        self.0.clone()
    }
}
