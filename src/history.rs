//! History view over the cycles created in this run.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{Cycle, CycleStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StatusColor {
    Green,
    Yellow,
    Red,
}

impl StatusColor {
    /// SGR foreground code.
    pub fn ansi_code(&self) -> u8 {
        match self {
            StatusColor::Green => 32,
            StatusColor::Yellow => 33,
            StatusColor::Red => 31,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRow {
    pub task: String,
    pub duration: String,
    pub started: String,
    pub status: CycleStatus,
    pub status_label: &'static str,
    pub status_color: StatusColor,
}

/// Rows for `cycles` (oldest first), newest first.
pub fn history_rows(cycles: &[Cycle], now: DateTime<Utc>) -> Vec<HistoryRow> {
    cycles
        .iter()
        .rev()
        .map(|cycle| {
            let status = cycle.status();
            let (status_label, status_color) = status_badge(status);
            HistoryRow {
                task: cycle.task.clone(),
                duration: duration_label(cycle.duration_minutes),
                started: relative_to_now(cycle.started_at, now),
                status,
                status_label,
                status_color,
            }
        })
        .collect()
}

pub fn status_badge(status: CycleStatus) -> (&'static str, StatusColor) {
    match status {
        CycleStatus::Active => ("In progress", StatusColor::Yellow),
        CycleStatus::Interrupted => ("Interrupted", StatusColor::Red),
        CycleStatus::Finished => ("Done", StatusColor::Green),
    }
}

pub fn duration_label(minutes: u32) -> String {
    if minutes == 1 {
        "1 minute".to_string()
    } else {
        format!("{minutes} minutes")
    }
}

/// Coarse "time ago" wording, e.g. "5 minutes ago" or "about 2 hours ago".
pub fn relative_to_now(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - at).num_seconds().max(0);
    let minutes = (secs + 30) / 60;

    let phrase = match minutes {
        0 => "less than a minute".to_string(),
        1 => "1 minute".to_string(),
        2..=44 => format!("{minutes} minutes"),
        45..=89 => "about 1 hour".to_string(),
        90..=1439 => format!("about {} hours", (minutes + 30) / 60),
        1440..=2519 => "1 day".to_string(),
        2520..=43199 => format!("{} days", (minutes + 720) / 1440),
        43200..=86399 => "about 1 month".to_string(),
        86400..=MINUTES_PER_YEAR_LESS_ONE => format!("{} months", minutes / 43200),
        _ => years_phrase(minutes),
    };
    format!("{phrase} ago")
}

const MINUTES_PER_YEAR: i64 = 525_600;
const MINUTES_PER_YEAR_LESS_ONE: i64 = MINUTES_PER_YEAR - 1;

/// Whole years plus a qualifier from the leftover months: under 3 is
/// "about", under 9 is "over", the rest is "almost" the next year.
fn years_phrase(minutes: i64) -> String {
    let years = minutes / MINUTES_PER_YEAR;
    let leftover_months = (minutes % MINUTES_PER_YEAR) / 43200;

    let plural = |n: i64| if n == 1 { "1 year".to_string() } else { format!("{n} years") };
    match leftover_months {
        0..=2 => format!("about {}", plural(years)),
        3..=8 => format!("over {}", plural(years)),
        _ => format!("almost {}", plural(years + 1)),
    }
}
