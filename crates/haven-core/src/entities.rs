//! Entity types for the five Haven collections.
//!
//! Field shapes follow the persisted schema: open-ended payloads (vault
//! metadata, recovery methods, audit details) stay `serde_json::Value` at
//! this level and are validated narrowly by whoever consumes them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Identifier of a user as issued by the external auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Row id of a trusted contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactId(pub i64);

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Row id of a vault item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(pub i64);

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A user as mirrored from the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: Option<String>,
    /// Unix milliseconds.
    pub created_at: i64,
}

impl User {
    /// Display name for emails: the user's name, falling back to the id.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.id.as_str())
    }
}

/// Per-user inactivity counter and wellness token.
///
/// At most one record per user. `last_checked_at` counts whole days of
/// inactivity; it only ever moves up by one per scheduler cycle or back
/// to zero on a reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InactivityRecord {
    pub user_id: UserId,
    pub last_checked_at: u32,
    /// One-time wellness token, present after a contact alert was issued
    /// or the owner requested one.
    pub token: Option<String>,
}

/// A user's escalation rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub user_id: UserId,
    /// Days of inactivity before disclosure fires.
    pub inactivity_duration: u32,
    /// Recorded but not consulted by the evaluation path.
    pub approval_required: bool,
}

/// Verification state of a trusted contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Pending,
    Verified,
}

impl VerificationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            VerificationStatus::Pending => "pending",
            VerificationStatus::Verified => "verified",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(VerificationStatus::Pending),
            "verified" => Some(VerificationStatus::Verified),
            _ => None,
        }
    }
}

/// Someone the owner trusts to receive disclosure email.
///
/// The contact is a one-directional reference to an email address; the
/// contact need not be a Haven user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustedContact {
    pub id: ContactId,
    pub user_id: UserId,
    pub contact_email: String,
    pub verification_status: VerificationStatus,
}

/// Recovery health of a vault item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryStatus {
    Healthy,
    AtRisk,
    Unverified,
}

impl RecoveryStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RecoveryStatus::Healthy => "healthy",
            RecoveryStatus::AtRisk => "at_risk",
            RecoveryStatus::Unverified => "unverified",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "healthy" => Some(RecoveryStatus::Healthy),
            "at_risk" => Some(RecoveryStatus::AtRisk),
            "unverified" => Some(RecoveryStatus::Unverified),
            _ => None,
        }
    }
}

/// One stored credential / recovery bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VaultItem {
    pub id: AssetId,
    pub user_id: UserId,
    /// e.g. "google", "microsoft", "custom".
    pub provider: String,
    pub provider_account_id: Option<String>,
    /// Human-friendly label for the entry.
    pub name: String,
    /// Provider-specific metadata; shape is not interpreted here.
    pub metadata: Option<Value>,
    /// Structured recovery factors (backup codes, recovery phone, ...).
    pub recovery_methods: Option<Value>,
    /// Sealed secret blob (see `sealed`).
    pub encrypted_payload: String,
    /// Unix milliseconds.
    pub created_at: i64,
    pub recovery_status: RecoveryStatus,
}

/// Append-only audit trail entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: i64,
    pub user_id: UserId,
    pub action: String,
    /// Unix milliseconds.
    pub timestamp: i64,
    pub details: Value,
}
