use anyhow::Result;
use explorer_core::sync::PendingOp;
use owo_colors::OwoColorize;

use super::App;
use crate::render::{Render, short_id};
use crate::tui;

pub async fn run(app: &App) -> Result<()> {
    let spinner = tui::create_spinner("Syncing task list".to_string());
    let result = app.manager.reconcile().await;
    spinner.finish_and_clear();

    let report = result?;

    if report.resolved == 0 && report.failed.is_empty() {
        println!("{}", "  Everything is in sync".green());
        return Ok(());
    }

    if report.resolved > 0 {
        println!("{}", format!("  Synced {} pending change(s)", report.resolved).green());
    }

    for (op, issue) in &report.failed {
        let target = match op {
            PendingOp::Upsert { id } => format!("reminder {}", short_id(id)),
            PendingOp::Delete { task_id } => format!("deleted task {task_id}"),
        };
        println!("  {} {}", "x".red(), target);
        println!("  {}", issue.render());
    }

    Ok(())
}
