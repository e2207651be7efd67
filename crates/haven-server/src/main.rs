//! Haven Server — headless daemon for 24/7 inactivity escalation
//!
//! Runs the escalation cycle against the shared store on a fixed
//! interval: reminder at day 14, contact alert at day 17, disclosure on
//! the user's configured day. The web dashboard and auth provider live
//! elsewhere; this binary only needs the database and an SMTP relay.
//!
//! # Usage
//!
//! ```bash
//! haven-server --config /path/to/haven-server.toml
//! haven-server --check    # Run one escalation cycle and exit
//! haven-server --validate # Validate config and exit
//! ```

mod config;
mod daemon;

use anyhow::{Context, Result};
use std::path::PathBuf;

fn main() -> Result<()> {
    // Parse CLI args (minimal — no clap dependency needed)
    let args: Vec<String> = std::env::args().collect();

    let mut config_path = PathBuf::from("/config/haven-server.toml");
    let mut one_shot = false;
    let mut validate_only = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                i += 1;
                if i < args.len() {
                    config_path = PathBuf::from(&args[i]);
                } else {
                    anyhow::bail!("--config requires a path argument");
                }
            }
            "--check" | "--once" => {
                one_shot = true;
            }
            "--validate" => {
                validate_only = true;
            }
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            "--version" | "-V" => {
                println!("haven-server {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            other => {
                anyhow::bail!("Unknown argument: {}", other);
            }
        }
        i += 1;
    }

    // Load config
    let mut server_config = config::HavenConfig::from_file(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    // Apply env overrides
    server_config.apply_env_overrides();

    // Validate
    server_config
        .validate()
        .context("Configuration validation failed")?;

    // Init logger
    std::env::set_var("RUST_LOG", &server_config.server.log_level);
    env_logger::init();

    if validate_only {
        println!("Configuration is valid.");
        println!("  Data dir:       {}", server_config.server.data_dir.display());
        println!(
            "  Check interval: {} secs",
            server_config.server.check_interval_secs
        );
        println!("  Site URL:       {}", server_config.server.site_url);
        println!(
            "  SMTP:           {}:{}",
            server_config.email.smtp_host, server_config.email.smtp_port
        );
        println!("  From:           {}", server_config.email.from_address);
        return Ok(());
    }

    // Build tokio runtime
    let rt = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;

    if one_shot {
        log::info!("Running single escalation cycle…");
        rt.block_on(daemon::run_once(&server_config))?;
        log::info!("Done.");
    } else {
        // Install Ctrl-C handler for graceful shutdown
        let shutdown = rt.block_on(async {
            tokio::select! {
                result = daemon::run(server_config) => result,
                _ = tokio::signal::ctrl_c() => {
                    log::info!("Received shutdown signal. Exiting…");
                    Ok(())
                }
            }
        });

        if let Err(e) = shutdown {
            log::error!("Server error: {e:#}");
            std::process::exit(1);
        }
    }

    Ok(())
}

fn print_help() {
    println!(
        r#"Haven Server — headless inactivity escalation daemon

USAGE:
    haven-server [OPTIONS]

OPTIONS:
    -c, --config <PATH>   Config file path (default: /config/haven-server.toml)
    --check, --once       Run a single escalation cycle and exit
    --validate            Validate config file and exit
    -h, --help            Show this help message
    -V, --version         Show version

ENVIRONMENT VARIABLES (override config file):
    HAVEN_DATA_DIR        Data directory path
    HAVEN_CHECK_INTERVAL  Check interval in seconds
    HAVEN_LOG_LEVEL       Log level (error/warn/info/debug/trace)
    HAVEN_SITE_URL        Base URL for emailed links
    HAVEN_SMTP_HOST       SMTP relay hostname
    HAVEN_SMTP_PORT       SMTP relay port
    HAVEN_SMTP_USER       SMTP username
    HAVEN_SMTP_PASSWORD   SMTP password
    HAVEN_FROM_ADDRESS    Sender mailbox

EXAMPLES:
    # Run as daemon with config file
    haven-server --config /path/to/config.toml

    # Single cycle (useful for external cron)
    haven-server --config config.toml --check

    # Validate configuration
    haven-server --config config.toml --validate
"#
    );
}
