//! Audit action vocabulary.
//!
//! Every mutating operation appends an audit entry tagged with one of
//! these action strings. Details stay schemaless (`serde_json::Value`);
//! the action string is the discriminant consumers key on.

pub const CONTACT_ADDED: &str = "Contact Added";
pub const CONTACT_VERIFIED: &str = "Contact Verified";
pub const CONTACT_DELETED: &str = "Contact Deleted";
pub const CONTACT_INVITE_RESENT: &str = "Contact Invite Resent";

pub const ASSET_ADDED: &str = "Asset Added";
pub const ASSET_UPDATED: &str = "Asset Updated";
pub const ASSET_DELETED: &str = "Asset Deleted";

pub const RULE_UPDATED: &str = "Rule Updated";

pub const INACTIVITY_RESET: &str = "Inactivity Reset";

pub const SWITCH_NO_ASSETS: &str = "Dead Man's Switch: No Assets";
pub const SWITCH_SEND_FAILED: &str = "Dead Man's Switch: Send Failed";
pub const SWITCH_TRIGGERED: &str = "Dead Man's Switch: Triggered";
