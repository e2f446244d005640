use anyhow::Result;
use dialoguer::Confirm;
use owo_colors::OwoColorize;

use super::App;

pub async fn run(app: &App, id: &str, yes: bool) -> Result<()> {
    let reminder = app.manager.find(id)?;

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!("  Delete \"{}\"?", reminder.title))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("{}", "  Cancelled".dimmed());
            return Ok(());
        }
    }

    let synced = app.manager.delete(&reminder.id).await?;

    println!("{}", format!("  Deleted: {}", reminder.title).red());
    app.report(&synced.issues);

    Ok(())
}
