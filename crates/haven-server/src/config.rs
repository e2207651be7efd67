//! Server configuration — parsed from TOML file + environment variable overrides.
//!
//! Priority: environment variables > config file > defaults.

use anyhow::{bail, Context, Result};
use haven_notify::SmtpConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HavenConfig {
    /// General server settings
    #[serde(default)]
    pub server: ServerSection,

    /// Outbound email settings
    pub email: EmailSection,
}

/// General server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSection {
    /// Data directory (SQLite DB)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Escalation check interval in seconds (default: hourly)
    #[serde(default = "default_check_interval")]
    pub check_interval_secs: u64,

    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Base URL emailed links point at
    #[serde(default = "default_site_url")]
    pub site_url: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            check_interval_secs: default_check_interval(),
            log_level: default_log_level(),
            site_url: default_site_url(),
        }
    }
}

/// Outbound email settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailSection {
    /// SMTP server hostname
    pub smtp_host: String,

    /// SMTP port (default: 587)
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    /// SMTP username
    pub smtp_user: String,

    /// SMTP password
    pub smtp_password: String,

    /// Sender mailbox, e.g. `Haven <noreply@haven.app>`
    pub from_address: String,
}

impl EmailSection {
    /// The transport slice of this section.
    pub fn smtp(&self) -> SmtpConfig {
        SmtpConfig {
            smtp_host: self.smtp_host.clone(),
            smtp_port: self.smtp_port,
            smtp_user: self.smtp_user.clone(),
            smtp_password: self.smtp_password.clone(),
        }
    }
}

// ============================================================================
// Default value functions
// ============================================================================

fn default_data_dir() -> PathBuf {
    PathBuf::from("/data")
}

fn default_check_interval() -> u64 {
    3600 // hourly
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_site_url() -> String {
    "https://haven.app".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

// ============================================================================
// Loading & environment override
// ============================================================================

impl HavenConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: HavenConfig =
            toml::from_str(&contents).with_context(|| "Failed to parse TOML config")?;
        Ok(config)
    }

    /// Apply environment variable overrides.
    ///
    /// Supported env vars:
    /// - `HAVEN_DATA_DIR`
    /// - `HAVEN_CHECK_INTERVAL`
    /// - `HAVEN_LOG_LEVEL`
    /// - `HAVEN_SITE_URL`
    /// - `HAVEN_SMTP_HOST`
    /// - `HAVEN_SMTP_PORT`
    /// - `HAVEN_SMTP_USER`
    /// - `HAVEN_SMTP_PASSWORD`
    /// - `HAVEN_FROM_ADDRESS`
    pub fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("HAVEN_DATA_DIR") {
            self.server.data_dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("HAVEN_CHECK_INTERVAL") {
            if let Ok(secs) = v.parse::<u64>() {
                self.server.check_interval_secs = secs;
            }
        }
        if let Ok(v) = std::env::var("HAVEN_LOG_LEVEL") {
            self.server.log_level = v;
        }
        if let Ok(v) = std::env::var("HAVEN_SITE_URL") {
            self.server.site_url = v;
        }
        if let Ok(v) = std::env::var("HAVEN_SMTP_HOST") {
            self.email.smtp_host = v;
        }
        if let Ok(v) = std::env::var("HAVEN_SMTP_PORT") {
            if let Ok(port) = v.parse::<u16>() {
                self.email.smtp_port = port;
            }
        }
        if let Ok(v) = std::env::var("HAVEN_SMTP_USER") {
            self.email.smtp_user = v;
        }
        if let Ok(v) = std::env::var("HAVEN_SMTP_PASSWORD") {
            self.email.smtp_password = v;
        }
        if let Ok(v) = std::env::var("HAVEN_FROM_ADDRESS") {
            self.email.from_address = v;
        }
    }

    /// Validate that the configuration can actually run.
    pub fn validate(&self) -> Result<()> {
        if self.server.check_interval_secs == 0 {
            bail!("check_interval_secs must be greater than zero");
        }
        if self.server.site_url.is_empty() {
            bail!("site_url must not be empty");
        }
        if self.email.smtp_host.is_empty() {
            bail!("smtp_host must not be empty");
        }
        if self.email.from_address.is_empty() {
            bail!("from_address must not be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL: &str = r#"
[email]
smtp_host = "smtp.example.com"
smtp_user = "haven"
smtp_password = "secret"
from_address = "Haven <noreply@haven.app>"
"#;

    #[test]
    fn test_minimal_config_gets_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(MINIMAL.as_bytes()).unwrap();

        let config = HavenConfig::from_file(file.path()).unwrap();

        assert_eq!(config.server.check_interval_secs, 3600);
        assert_eq!(config.server.log_level, "info");
        assert_eq!(config.server.site_url, "https://haven.app");
        assert_eq!(config.email.smtp_port, 587);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_full_config() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(
            br#"
[server]
data_dir = "/var/lib/haven"
check_interval_secs = 600
log_level = "debug"
site_url = "https://haven.example.org"

[email]
smtp_host = "smtp.example.com"
smtp_port = 2525
smtp_user = "haven"
smtp_password = "secret"
from_address = "Haven <noreply@haven.example.org>"
"#,
        )
        .unwrap();

        let config = HavenConfig::from_file(file.path()).unwrap();

        assert_eq!(config.server.data_dir, PathBuf::from("/var/lib/haven"));
        assert_eq!(config.server.check_interval_secs, 600);
        assert_eq!(config.email.smtp_port, 2525);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_email_section_fails_parse() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[server]\nlog_level = \"info\"\n").unwrap();

        assert!(HavenConfig::from_file(file.path()).is_err());
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(MINIMAL.as_bytes()).unwrap();

        let mut config = HavenConfig::from_file(file.path()).unwrap();
        config.server.check_interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_smtp_slice() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(MINIMAL.as_bytes()).unwrap();

        let config = HavenConfig::from_file(file.path()).unwrap();
        let smtp = config.email.smtp();
        assert_eq!(smtp.smtp_host, "smtp.example.com");
        assert_eq!(smtp.smtp_port, 587);
    }
}
