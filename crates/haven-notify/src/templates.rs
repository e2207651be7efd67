//! Outbound message templates.
//!
//! One function per message. Bodies are plain HTML built here; rendering
//! frameworks live on the (out-of-scope) web side.

use crate::{NotifyConfig, OutboundEmail};
use haven_core::{TrustedContact, User, VaultItem};
use serde_json::Value;

/// Reminder to the owner after the fixed two-week mark.
pub fn reminder_email(cfg: &NotifyConfig, user: &User, days_inactive: u32) -> OutboundEmail {
    let html = format!(
        r#"<p>Hi {name},</p>
<p>We haven't seen any activity on your Haven account for {days_inactive} day(s).</p>
<p>If everything is fine, just sign in — any activity counts as a check-in:</p>
<p><a href="{site}/dashboard">{site}/dashboard</a></p>
<p>If you stay inactive, we will start your configured escalation steps.</p>
<p>— The Haven team</p>"#,
        name = user.display_name(),
        site = cfg.site_url,
    );

    OutboundEmail {
        from: cfg.from_address.clone(),
        to: user.email.clone(),
        subject: "Are you still there?".to_string(),
        html,
    }
}

/// Alert to one trusted contact, carrying the wellness token links.
pub fn contact_alert_email(
    cfg: &NotifyConfig,
    user: &User,
    contact: &TrustedContact,
    days_inactive: u32,
    token: &str,
) -> OutboundEmail {
    let html = format!(
        r#"<p>Hello {contact_email},</p>
<p>{name} ({user_email}) listed you as a trusted contact on Haven.
Their account has shown no activity for {days_inactive} day(s).</p>
<p>Do you know they are okay? Please tell us:</p>
<p><a href="{site}/wellness-check/confirm?token={token}">They're fine — stop the countdown</a></p>
<p><a href="{site}/wellness-check/concern?token={token}">I'm concerned — release their recovery information</a></p>
<p>This link is for you alone and works once.</p>
<p>— The Haven team</p>"#,
        contact_email = contact.contact_email,
        name = user.display_name(),
        user_email = user.email,
        site = cfg.site_url,
    );

    OutboundEmail {
        from: cfg.from_address.clone(),
        to: contact.contact_email.clone(),
        subject: "User Inactivity Alert".to_string(),
        html,
    }
}

/// Recovery disclosure to one trusted contact: asset list, aggregated
/// backup codes, recovery link.
pub fn recovery_email(
    cfg: &NotifyConfig,
    user: &User,
    contact: &TrustedContact,
    assets: &[VaultItem],
    backup_codes: &[Value],
) -> OutboundEmail {
    let asset_list: String = assets
        .iter()
        .map(|a| format!("<li>{} ({})</li>", a.name, a.provider))
        .collect();

    let codes_list: String = backup_codes
        .iter()
        .map(|c| format!("<li><code>{c}</code></li>"))
        .collect();

    let html = format!(
        r#"<p>Hello {contact_email},</p>
<p>{name} entrusted you with the recovery of their accounts. Their Haven
escalation rule has now released that information to you.</p>
<h3>Accounts</h3>
<ul>{asset_list}</ul>
<h3>Backup codes</h3>
<ul>{codes_list}</ul>
<p>Start the guided recovery here:
<a href="{site}/recover?user={user_id}">{site}/recover?user={user_id}</a></p>
<p>Please keep this email private.</p>
<p>— The Haven team</p>"#,
        contact_email = contact.contact_email,
        name = user.display_name(),
        site = cfg.site_url,
        user_id = user.id,
    );

    OutboundEmail {
        from: cfg.from_address.clone(),
        to: contact.contact_email.clone(),
        subject: format!(
            "Google Account Recovery Information for {}",
            user.display_name()
        ),
        html,
    }
}

/// Verification invite for a freshly added trusted contact.
pub fn contact_invite_email(
    cfg: &NotifyConfig,
    contact_email: &str,
    reminder: bool,
) -> OutboundEmail {
    let subject = if reminder {
        "Verify your trusted contact (reminder)".to_string()
    } else {
        "Verify your trusted contact".to_string()
    };

    let html = format!(
        r#"<p>Someone named you as their trusted contact on Haven.</p>
<p>Please verify your email address by clicking
<a href="{site}/verify?email={email}">here</a>.</p>
<p>— The Haven team</p>"#,
        site = cfg.site_url,
        email = encode_query(contact_email),
    );

    OutboundEmail {
        from: cfg.from_address.clone(),
        to: contact_email.to_string(),
        subject,
        html,
    }
}

/// Percent-encode a query-string value. Covers the characters that show
/// up in email addresses; everything non-alphanumeric is escaped.
fn encode_query(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}
