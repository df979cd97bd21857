//! Task Bot Watchdog - Main Entry Point
//!
//! Periodically invoked (by a systemd timer or any external scheduler) to
//! check whether the task assistant bot is alive, restarting it with a
//! bounded retry budget and escalating through the audit log once the
//! budget is exhausted.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use bot_watchdog::audit::FileAuditLog;
use bot_watchdog::commands::{CommandHandler, DEFAULT_LOG_COUNT};
use bot_watchdog::config::WatchdogSettings;
use bot_watchdog::process::SystemdManager;
use bot_watchdog::supervisor::{CheckVerdict, FileCounter};

/// Deployment watchdog for the task assistant bot.
#[derive(Parser, Debug)]
#[command(name = "bot-watchdog")]
#[command(about = "Supervise the task assistant bot with bounded restarts")]
#[command(version)]
struct Args {
    /// Name of the supervised service unit (overrides WATCHDOG_SERVICE).
    #[arg(short, long)]
    service: Option<String>,

    /// State directory for counter, audit log and lock (overrides WATCHDOG_STATE_DIR).
    #[arg(long)]
    state_dir: Option<PathBuf>,

    /// Manage a per-user unit (systemctl --user).
    #[arg(long)]
    user: bool,

    /// Path to the .env file for environment variables.
    #[arg(long, default_value = ".env")]
    env_file: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one supervision pass (the default).
    Check,
    /// Show service state and restart counter. Read-only.
    Status {
        /// Emit the report as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Show the most recent audit records. Read-only.
    Logs {
        /// Number of records to show.
        count: Option<usize>,
    },
    /// Force the restart counter back to 0 after manual remediation.
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    init_logging(&args.log_level);

    // Load environment variables
    if let Err(e) = dotenvy::from_filename(&args.env_file) {
        debug!("Could not load .env file ({}): {}", args.env_file, e);
    }

    // Load settings, CLI flags win over environment
    let mut settings = WatchdogSettings::from_env_with_defaults();
    if let Some(service) = args.service {
        settings.service_name = service;
    }
    if let Some(state_dir) = args.state_dir {
        settings.state_dir = state_dir;
    }

    settings
        .policy
        .validate()
        .context("Supervision policy validation failed")?;

    std::fs::create_dir_all(&settings.state_dir).with_context(|| {
        format!(
            "Failed to create state directory {}",
            settings.state_dir.display()
        )
    })?;

    let manager = Arc::new(SystemdManager::new().with_user_mode(args.user));
    let counter = Arc::new(FileCounter::new(settings.counter_path()));
    let audit = Arc::new(FileAuditLog::new(settings.audit_log_path()));

    let handler = CommandHandler::new(settings, manager, counter, audit);

    match args.command.unwrap_or(Command::Check) {
        Command::Check => run_check(&handler).await,
        Command::Status { json } => show_status(&handler, json).await,
        Command::Logs { count } => show_logs(&handler, count.unwrap_or(DEFAULT_LOG_COUNT)),
        Command::Reset => {
            handler.reset().context("Failed to reset restart counter")?;
            println!("✓ Restart counter reset to 0");
            Ok(())
        }
    }
}

/// Runs one supervision pass and reports the verdict.
///
/// A detected-but-handled unhealthy service still exits 0; only an
/// unperformable check (lock held, counter unreadable) is an error.
async fn run_check(handler: &CommandHandler) -> Result<()> {
    let verdict = handler.check().await.context("Check could not be run")?;

    match verdict {
        CheckVerdict::Healthy { cleared_history } => {
            if cleared_history {
                println!("Service healthy (failure history cleared)");
            } else {
                println!("Service healthy");
            }
        }
        CheckVerdict::Recovered { attempt } => {
            println!("Service was down, restarted successfully (attempt {attempt})");
        }
        CheckVerdict::AttemptFailed {
            consecutive_failures,
        } => {
            println!("Service is down, restart failed ({consecutive_failures} consecutive failures)");
        }
        CheckVerdict::Exhausted { attempts } => {
            println!(
                "Service is down after {attempts} failed restarts; not retrying. \
                 Fix the service, then run: bot-watchdog reset"
            );
        }
    }

    Ok(())
}

/// Prints the status report, optionally as JSON.
async fn show_status(handler: &CommandHandler, json: bool) -> Result<()> {
    let report = handler.status().await.context("Failed to read status")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }

    Ok(())
}

/// Prints the most recent audit records.
fn show_logs(handler: &CommandHandler, count: usize) -> Result<()> {
    let records = handler.logs(count).context("Failed to read audit log")?;

    if records.is_empty() {
        println!("No audit records yet");
    } else {
        for record in records {
            println!("{record}");
        }
    }

    Ok(())
}

/// Initializes the logging subsystem.
fn init_logging(level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
