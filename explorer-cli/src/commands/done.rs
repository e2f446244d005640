use anyhow::Result;
use owo_colors::OwoColorize;

use super::App;

pub async fn run(app: &App, id: &str, completed: bool) -> Result<()> {
    let reminder = app.manager.find(id)?;
    let synced = app.manager.set_completion(&reminder.id, completed).await?;

    let verb = if completed { "Completed" } else { "Reopened" };
    println!("{}", format!("  {verb}: {}", synced.value.title).green());
    app.report(&synced.issues);

    Ok(())
}
