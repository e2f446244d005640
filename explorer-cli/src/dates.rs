//! Natural-language due dates.

use anyhow::{Result, anyhow};
use chrono::{DateTime, Local, NaiveDateTime, NaiveTime, TimeZone, Utc};

/// Time used when the input names a day but no time of day.
const DEFAULT_DUE_TIME: (u32, u32) = (9, 0);

/// Parse "tomorrow", "fri 6pm", "2026-03-20 09:30" and the like into a UTC
/// instant, reading the input as local time.
pub fn parse_due(input: &str) -> Result<DateTime<Utc>> {
    let expanded = expand_abbreviations(input);
    let parsed = fuzzydate::parse(&expanded)
        .map_err(|_| anyhow!("Could not parse date/time: \"{}\"", input))?;

    let naive = if has_time_component(input) {
        parsed
    } else {
        let (hour, minute) = DEFAULT_DUE_TIME;
        let nine = NaiveTime::from_hms_opt(hour, minute, 0)
            .ok_or_else(|| anyhow!("Invalid default due time"))?;
        NaiveDateTime::new(parsed.date(), nine)
    };

    local_to_utc(naive).ok_or_else(|| anyhow!("\"{}\" does not exist in the local timezone", input))
}

/// Resolve a local wall-clock time, taking the earlier instant when a DST
/// change makes it ambiguous.
fn local_to_utc(naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Expand common abbreviations that fuzzydate doesn't handle.
fn expand_abbreviations(input: &str) -> String {
    let abbrevs = [
        ("mon", "monday"),
        ("tue", "tuesday"),
        ("tues", "tuesday"),
        ("wed", "wednesday"),
        ("thu", "thursday"),
        ("thur", "thursday"),
        ("thurs", "thursday"),
        ("fri", "friday"),
        ("sat", "saturday"),
        ("sun", "sunday"),
        ("tmrw", "tomorrow"),
        ("tmr", "tomorrow"),
        ("jan", "january"),
        ("feb", "february"),
        ("mar", "march"),
        ("apr", "april"),
        ("jun", "june"),
        ("jul", "july"),
        ("aug", "august"),
        ("sep", "september"),
        ("sept", "september"),
        ("oct", "october"),
        ("nov", "november"),
        ("dec", "december"),
    ];

    input
        .to_lowercase()
        .split_whitespace()
        .map(|word| {
            abbrevs
                .iter()
                .find(|(abbr, _)| *abbr == word)
                .map(|(_, full)| *full)
                .unwrap_or(word)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether the input names a time of day (am/pm, HH:MM, noon, midnight, "at 3").
fn has_time_component(input: &str) -> bool {
    let lower = input.to_lowercase();

    if lower.contains("noon") || lower.contains("midnight") {
        return true;
    }

    let bytes = lower.as_bytes();

    // "6pm", "6 pm", "11am"
    for (i, &b) in bytes.iter().enumerate() {
        if (b == b'a' || b == b'p') && bytes.get(i + 1) == Some(&b'm') {
            let digit_before = i > 0 && bytes[i - 1].is_ascii_digit();
            let digit_space_before = i > 1 && bytes[i - 1] == b' ' && bytes[i - 2].is_ascii_digit();
            if digit_before || digit_space_before {
                return true;
            }
        }
    }

    // HH:MM
    for (i, &b) in bytes.iter().enumerate() {
        if b == b':'
            && i > 0
            && bytes[i - 1].is_ascii_digit()
            && bytes.get(i + 1).is_some_and(u8::is_ascii_digit)
        {
            return true;
        }
    }

    // "at 3", "tomorrow at 15"
    let after_at = lower
        .find(" at ")
        .map(|pos| &lower[pos + 4..])
        .or_else(|| lower.strip_prefix("at "));
    after_at.is_some_and(|rest| rest.starts_with(|c: char| c.is_ascii_digit()))
}
