use anyhow::Result;
use chrono::Local;
use explorer_core::reminder::{Reminder, Section};
use owo_colors::OwoColorize;
use serde::Serialize;

use super::App;
use crate::render::Render;

#[derive(Serialize)]
struct SectionJson<'a> {
    section: Section,
    label: &'static str,
    reminders: &'a [Reminder],
}

pub fn run(app: &App, json: bool) -> Result<()> {
    let agenda = app.manager.agenda(&Local::now())?;

    if json {
        let sections: Vec<SectionJson> = agenda
            .iter()
            .map(|(section, reminders)| SectionJson {
                section: *section,
                label: section.label(),
                reminders,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&sections)?);
        return Ok(());
    }

    if agenda.is_empty() {
        println!("{}", "No reminders. Add one with `explorer add <title>`.".dimmed());
        return Ok(());
    }

    for (i, (section, reminders)) in agenda.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("{} {}", section.render(), format!("({})", reminders.len()).dimmed());
        for reminder in reminders {
            println!("  {}", reminder.render());
        }
    }

    Ok(())
}
