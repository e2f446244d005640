//! explorer-notify - shows reminder notifications when they come due
//!
//! Polls the notification queue that explorer fills on every reminder
//! change and hands due entries to the desktop notification service.

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use explorer_core::config::{Config, LOG_ENV};
use explorer_core::notify::{Notification, NotificationQueue};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "explorer-notify")]
#[command(about = "Show desktop notifications for due explorer reminders")]
struct Cli {
    /// How often to check for due reminders (e.g. "30s", "2m")
    #[arg(long, default_value = "30s", value_parser = humantime::parse_duration)]
    interval: Duration,

    /// Deliver what is due now and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let config = Config::load()?;
    let queue = NotificationQueue::new(config.notifications_path());
    let pending = queue.pending().await?.len();
    info!(
        queue = %queue.path().display(),
        pending,
        interval = ?cli.interval,
        "watching notifications"
    );

    if cli.once {
        deliver_due(&queue).await?;
        return Ok(());
    }

    let mut ticker = tokio::time::interval(cli.interval);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(e) = deliver_due(&queue).await {
                    warn!(error = %format!("{e:#}"), "notification pass failed");
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Show every notification whose time has come. Returns how many were taken.
async fn deliver_due(queue: &NotificationQueue) -> Result<usize> {
    let due = queue
        .take_due(Utc::now())
        .await
        .context("Could not read notification queue")?;

    for notification in &due {
        show(notification);
    }

    Ok(due.len())
}

fn show(notification: &Notification) {
    let result = notify_rust::Notification::new()
        .appname("explorer")
        .summary(&notification.title)
        .body(&notification.body)
        .show();

    match result {
        Ok(_) => info!(reminder_id = %notification.id, "notification shown"),
        Err(e) => warn!(reminder_id = %notification.id, error = %e, "could not show notification"),
    }
}
