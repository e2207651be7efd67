//! The daemon loop — periodically runs the escalation cycle.

use crate::config::HavenConfig;
use anyhow::{Context, Result};
use chrono::Local;
use haven_escalation::{run_cycle, CycleReport};
use haven_notify::{NotifyConfig, SmtpMailer};
use rusqlite::Connection;
use std::time::Duration;

/// Everything one cycle needs, opened once at startup.
struct Runtime {
    conn: Connection,
    mailer: SmtpMailer,
    notify: NotifyConfig,
}

fn setup(config: &HavenConfig) -> Result<Runtime> {
    std::fs::create_dir_all(&config.server.data_dir).with_context(|| {
        format!(
            "Failed to create data dir: {}",
            config.server.data_dir.display()
        )
    })?;

    let db_path = config.server.data_dir.join("haven.db");
    let conn = haven_store::open_db(&db_path)
        .with_context(|| format!("Failed to open database: {}", db_path.display()))?;

    let mailer = SmtpMailer::new(&config.email.smtp()).context("Failed to build SMTP mailer")?;
    let notify = NotifyConfig::new(&config.email.from_address, &config.server.site_url);

    Ok(Runtime {
        conn,
        mailer,
        notify,
    })
}

/// Run the daemon loop. Blocks forever (until shutdown signal).
pub async fn run(config: HavenConfig) -> Result<()> {
    log::info!("Haven server starting…");
    log::info!("  Data dir:  {}", config.server.data_dir.display());
    log::info!(
        "  Interval:  {} seconds ({:.1} hours)",
        config.server.check_interval_secs,
        config.server.check_interval_secs as f64 / 3600.0
    );
    log::info!("  Site URL:  {}", config.server.site_url);
    log::info!("  SMTP:      {}", config.email.smtp_host);

    let runtime = setup(&config)?;
    let interval = Duration::from_secs(config.server.check_interval_secs);

    // Run first cycle immediately, then loop
    let mut first = true;
    loop {
        if !first {
            log::info!(
                "Next escalation check at {}",
                (Local::now() + chrono::Duration::from_std(interval)?)
                    .format("%Y-%m-%d %H:%M:%S")
            );
            tokio::time::sleep(interval).await;
        }
        first = false;

        match run_cycle(&runtime.conn, &runtime.mailer, &runtime.notify).await {
            Ok(report) => log_report(&report),
            Err(e) => log::error!("Escalation cycle failed: {e:#}"),
        }
    }
}

/// Execute a single escalation cycle and exit. Used by `--check`.
pub async fn run_once(config: &HavenConfig) -> Result<CycleReport> {
    let runtime = setup(config)?;
    let report = run_cycle(&runtime.conn, &runtime.mailer, &runtime.notify)
        .await
        .context("Escalation cycle failed")?;
    log_report(&report);
    Ok(report)
}

fn log_report(report: &CycleReport) {
    log::info!(
        "Cycle complete: {}",
        serde_json::to_string(report).unwrap_or_else(|_| format!("{report:?}"))
    );
    if report.failures > 0 {
        log::warn!(
            "{} user(s) failed this cycle; their counters were left unchanged",
            report.failures
        );
    }
}
