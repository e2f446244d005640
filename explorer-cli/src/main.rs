mod commands;
mod dates;
mod render;
mod tui;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use explorer_core::config::{Config, LOG_ENV};
use tracing_subscriber::EnvFilter;

use crate::commands::App;

#[derive(Parser)]
#[command(name = "explorer")]
#[command(about = "Manage reminders and keep them mirrored to your task list")]
struct Cli {
    /// Config file to use instead of ~/.config/explorer/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a reminder
    Add {
        title: String,

        #[arg(short, long)]
        notes: Option<String>,

        /// When it is due (e.g. "tomorrow 6pm", "fri", "2026-03-20 09:30")
        #[arg(short, long)]
        due: Option<String>,

        /// List label; a task list with this title is preferred
        #[arg(short, long)]
        list: Option<String>,
    },
    /// Change a reminder
    Edit {
        /// Reminder id or unique id prefix
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long, conflicts_with = "clear_notes")]
        notes: Option<String>,

        #[arg(long)]
        clear_notes: bool,

        #[arg(long, conflicts_with = "clear_due")]
        due: Option<String>,

        #[arg(long)]
        clear_due: bool,

        #[arg(long, conflicts_with = "clear_list")]
        list: Option<String>,

        #[arg(long)]
        clear_list: bool,
    },
    /// Mark a reminder as completed
    Done { id: String },
    /// Mark a reminder as not completed
    Undo { id: String },
    /// Delete a reminder
    Delete {
        id: String,

        /// Don't ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Show reminders grouped by due date
    List {
        #[arg(long)]
        json: bool,
    },
    /// Retry task-list writes that failed earlier
    Sync,
    /// Show config and data paths
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let config_path = match cli.config {
        Some(path) => path,
        None => Config::config_path()?,
    };
    let config = load_config(&config_path)?;

    match cli.command {
        Commands::Add {
            title,
            notes,
            due,
            list,
        } => commands::add::run(&App::open(&config)?, title, notes, due, list).await,
        Commands::Edit {
            id,
            title,
            notes,
            clear_notes,
            due,
            clear_due,
            list,
            clear_list,
        } => {
            let edits = commands::edit::Edits {
                title,
                notes,
                clear_notes,
                due,
                clear_due,
                list,
                clear_list,
            };
            commands::edit::run(&App::open(&config)?, &id, edits).await
        }
        Commands::Done { id } => commands::done::run(&App::open(&config)?, &id, true).await,
        Commands::Undo { id } => commands::done::run(&App::open(&config)?, &id, false).await,
        Commands::Delete { id, yes } => commands::delete::run(&App::open(&config)?, &id, yes).await,
        Commands::List { json } => commands::list::run(&App::open(&config)?, json),
        Commands::Sync => commands::sync::run(&App::open(&config)?).await,
        Commands::Config => commands::config::run(&config, &config_path),
    }
}

/// Load the config, creating the commented default on first run.
fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        tracing::info!(path = %path.display(), "writing default config");
        Config::create_default_config(path)?;
    }
    let config = Config::load_from(path)?;
    tracing::debug!(path = %path.display(), mirrored = config.mirror.is_some(), "config loaded");
    Ok(config)
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
