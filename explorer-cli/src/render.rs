//! TUI rendering for explorer-core types.

use chrono::{DateTime, Local, Utc};
use explorer_core::reminder::{Reminder, Section};
use explorer_core::sync::SyncIssue;
use owo_colors::OwoColorize;

/// Length of the id prefix shown in listings; long enough to be unique in practice.
pub const SHORT_ID_LEN: usize = 8;

pub trait Render {
    fn render(&self) -> String;
}

impl Render for Section {
    fn render(&self) -> String {
        let label = self.label();
        match self {
            Section::Overdue => label.red().bold().to_string(),
            Section::Today => label.yellow().bold().to_string(),
            Section::Scheduled => label.bold().to_string(),
            Section::Unscheduled => label.bold().to_string(),
            Section::Done => label.dimmed().bold().to_string(),
        }
    }
}

impl Render for Reminder {
    fn render(&self) -> String {
        let check = if self.is_completed { "[x]" } else { "[ ]" };
        let title = if self.is_completed {
            self.title.dimmed().strikethrough().to_string()
        } else {
            self.title.clone()
        };

        let mut line = format!("{} {} {}", short_id(&self.id).dimmed(), check, title);
        if let Some(due) = self.due_date {
            line.push_str(&format!("  {}", render_due(due).cyan()));
        }
        if let Some(list) = &self.list {
            line.push_str(&format!("  {}", format!("#{list}").dimmed()));
        }
        if self.external_event_id.is_none() {
            line.push_str(&format!("  {}", "(local only)".dimmed()));
        }
        line
    }
}

impl Render for SyncIssue {
    fn render(&self) -> String {
        format!("  {} {}", "!".yellow(), self.to_string().yellow())
    }
}

pub fn short_id(id: &str) -> &str {
    id.get(..SHORT_ID_LEN).unwrap_or(id)
}

/// Due date in local time, e.g. "Fri Mar 20 09:00".
pub fn render_due(due: DateTime<Utc>) -> String {
    due.with_timezone(&Local).format("%a %b %-d %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_id_truncates_long_ids_only() {
        assert_eq!(short_id("0123456789abcdef"), "01234567");
        assert_eq!(short_id("abc"), "abc");
    }
}
