use anyhow::{Result, bail};
use explorer_core::ReminderChanges;
use owo_colors::OwoColorize;

use super::App;
use crate::dates::parse_due;

/// Edit flags as given on the command line.
#[derive(Debug, Default)]
pub struct Edits {
    pub title: Option<String>,
    pub notes: Option<String>,
    pub clear_notes: bool,
    pub due: Option<String>,
    pub clear_due: bool,
    pub list: Option<String>,
    pub clear_list: bool,
}

impl Edits {
    fn into_changes(self) -> Result<ReminderChanges> {
        let due_date = match (self.due, self.clear_due) {
            (Some(due), _) => Some(Some(parse_due(&due)?)),
            (None, true) => Some(None),
            (None, false) => None,
        };

        Ok(ReminderChanges {
            title: self.title,
            notes: field(self.notes, self.clear_notes),
            due_date,
            list: field(self.list, self.clear_list),
        })
    }
}

fn field(value: Option<String>, clear: bool) -> Option<Option<String>> {
    match (value, clear) {
        (Some(value), _) => Some(Some(value)),
        (None, true) => Some(None),
        (None, false) => None,
    }
}

pub async fn run(app: &App, id: &str, edits: Edits) -> Result<()> {
    let changes = edits.into_changes()?;
    if changes.is_empty() {
        bail!("Nothing to change. See `explorer edit --help`.");
    }

    let reminder = app.manager.find(id)?;
    let synced = app.manager.update(&reminder.id, changes).await?;

    println!("{}", format!("  Updated: {}", synced.value.title).green());
    app.report(&synced.issues);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_flags_become_explicit_nones() {
        let changes = Edits {
            clear_notes: true,
            clear_due: true,
            ..Default::default()
        }
        .into_changes()
        .unwrap();

        assert_eq!(changes.notes, Some(None));
        assert_eq!(changes.due_date, Some(None));
        assert_eq!(changes.list, None);
        assert!(changes.title.is_none());
    }

    #[test]
    fn no_flags_is_empty() {
        assert!(Edits::default().into_changes().unwrap().is_empty());
    }

    #[test]
    fn values_are_set() {
        let changes = Edits {
            title: Some("Buy oat milk".into()),
            list: Some("groceries".into()),
            ..Default::default()
        }
        .into_changes()
        .unwrap();

        assert_eq!(changes.title.as_deref(), Some("Buy oat milk"));
        assert_eq!(changes.list, Some(Some("groceries".to_string())));
    }
}
