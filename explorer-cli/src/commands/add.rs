use anyhow::Result;
use explorer_core::NewReminder;
use owo_colors::OwoColorize;

use super::App;
use crate::dates::parse_due;
use crate::render::render_due;

pub async fn run(
    app: &App,
    title: String,
    notes: Option<String>,
    due: Option<String>,
    list: Option<String>,
) -> Result<()> {
    let mut new = NewReminder::new(title);
    if let Some(notes) = notes {
        new = new.notes(notes);
    }
    if let Some(due) = due {
        new = new.due(parse_due(&due)?);
    }
    if let Some(list) = list {
        new = new.list(list);
    }

    let synced = app.manager.create(new).await?;
    let reminder = &synced.value;

    match reminder.due_date {
        Some(due) => println!(
            "{} {}",
            format!("  Created: {}", reminder.title).green(),
            render_due(due).dimmed()
        ),
        None => println!("{}", format!("  Created: {}", reminder.title).green()),
    }
    app.report(&synced.issues);

    Ok(())
}
