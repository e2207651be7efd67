//! Haven notification service.
//!
//! Everything Haven sends leaves through the [`Mailer`] trait:
//!
//! - **Reminder** to the owner after two weeks of silence
//! - **Alert** to trusted contacts, carrying confirm/concern links
//! - **Recovery disclosure** to trusted contacts when the switch fires
//! - **Verification invite** when a contact is added
//!
//! [`SmtpMailer`] is the production transport; [`MemoryMailer`] records
//! traffic for tests and can be told to fail per recipient.

mod memory;
mod smtp;
pub mod templates;

pub use memory::MemoryMailer;
pub use smtp::{SmtpConfig, SmtpMailer};

use serde::{Deserialize, Serialize};
use std::future::Future;
use thiserror::Error;

/// Errors from notification operations.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Email send failed: {0}")]
    SendFailed(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// One outbound message, ready for a transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Transport seam for everything Haven sends.
pub trait Mailer {
    /// Deliver one message. A failure is returned, never panicked, so the
    /// caller decides whether a batch continues.
    fn send(
        &self,
        email: &OutboundEmail,
    ) -> impl Future<Output = Result<(), NotifyError>> + Send;
}

/// Sender identity and link base shared by all templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Sender mailbox, e.g. `Haven <noreply@haven.app>`.
    pub from_address: String,
    /// Base URL the emailed links point at, without a trailing slash.
    pub site_url: String,
}

impl NotifyConfig {
    pub fn new(from_address: impl Into<String>, site_url: impl Into<String>) -> Self {
        let mut site_url: String = site_url.into();
        while site_url.ends_with('/') {
            site_url.pop();
        }
        Self {
            from_address: from_address.into(),
            site_url,
        }
    }
}
