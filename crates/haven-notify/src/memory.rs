//! In-memory mailer for tests and dry runs.

use crate::{Mailer, NotifyError, OutboundEmail};
use std::sync::Mutex;

/// Records every message instead of sending it, and can be told to fail
/// for specific recipients to exercise partial-failure paths.
#[derive(Debug, Default)]
pub struct MemoryMailer {
    sent: Mutex<Vec<OutboundEmail>>,
    failing: Mutex<Vec<String>>,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every send to `recipient` fail from now on.
    pub fn fail_for(&self, recipient: impl Into<String>) {
        self.failing.lock().unwrap().push(recipient.into());
    }

    /// Everything successfully "sent" so far.
    pub fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().unwrap().clone()
    }

    /// Messages sent to one recipient.
    pub fn sent_to(&self, recipient: &str) -> Vec<OutboundEmail> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.to == recipient)
            .cloned()
            .collect()
    }
}

impl Mailer for MemoryMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<(), NotifyError> {
        if self.failing.lock().unwrap().iter().any(|r| r == &email.to) {
            return Err(NotifyError::SendFailed(format!(
                "simulated failure for {}",
                email.to
            )));
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}
