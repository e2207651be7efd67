//! Haven core types
//!
//! Shared vocabulary for the Haven digital-inheritance service:
//!
//! - **Entities**: users, inactivity records, rules, trusted contacts,
//!   vault items, audit log entries
//! - **Sealed payloads**: the client-side placeholder codec for vault
//!   secrets (NOT cryptography — see [`sealed`])
//! - **Recovery extraction**: pulling backup codes out of sealed vault
//!   items without trusting their shape
//! - **Auth port**: the interface to the external identity provider
//!
//! No I/O lives here. Persistence is `haven-store`, email is
//! `haven-notify`, and the escalation workflow is `haven-escalation`.

pub mod audit;
pub mod auth;
pub mod entities;
pub mod recovery;
pub mod sealed;

pub use auth::{AuthProvider, StaticAuth};
pub use entities::{
    AssetId, AuditLogEntry, ContactId, InactivityRecord, RecoveryStatus, Rule, TrustedContact,
    User, UserId, VaultItem, VerificationStatus,
};
