//! Derivation of the visible task list: sort the whole collection by due date,
//! then filter. Everything here is pure; the canonical collection is never touched.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

use super::task::Task;

const LOCAL_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ascending => "ascending",
            Self::Descending => "descending",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ascending" | "asc" => Ok(Self::Ascending),
            "descending" | "desc" => Ok(Self::Descending),
            other => Err(format!("unknown sort order: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TaskFilter {
    #[default]
    All,
    Completed,
    Pending,
    Unassigned,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Completed => task.completed,
            Self::Pending => !task.completed,
            Self::Unassigned => task.is_unassigned(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Completed => "completed",
            Self::Pending => "pending",
            Self::Unassigned => "unassigned",
        }
    }
}

impl fmt::Display for TaskFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for TaskFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "completed" => Ok(Self::Completed),
            "pending" => Ok(Self::Pending),
            "unassigned" => Ok(Self::Unassigned),
            other => Err(format!("unknown filter: {}", other)),
        }
    }
}

/// Parse a wire due date into an instant.
///
/// Offset-qualified timestamps keep their offset, bare date-times are local
/// time, and a bare date is midnight UTC.
pub fn parse_due_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in LOCAL_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc));
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn due_instant(task: &Task) -> Option<DateTime<Utc>> {
    task.due_date.as_deref().and_then(parse_due_date)
}

/// Ascending due-date order with undated tasks last.
pub fn compare_due_date(a: &Task, b: &Task) -> Ordering {
    match (due_instant(a), due_instant(b)) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(da), Some(db)) => da.cmp(&db),
    }
}

/// Stable sort of references into `tasks`.
///
/// Descending swaps the arguments only between dated tasks, so undated ones stay last.
pub fn sort_tasks(tasks: &[Task], order: SortOrder) -> Vec<&Task> {
    let mut sorted: Vec<&Task> = tasks.iter().collect();
    match order {
        SortOrder::Ascending => sorted.sort_by(|a, b| compare_due_date(a, b)),
        SortOrder::Descending => sorted.sort_by(|a, b| descending(a, b)),
    }
    sorted
}

fn descending(a: &Task, b: &Task) -> Ordering {
    match (due_instant(a), due_instant(b)) {
        (Some(da), Some(db)) => db.cmp(&da),
        _ => compare_due_date(a, b),
    }
}

pub fn apply_filter(filter: TaskFilter, tasks: Vec<&Task>) -> Vec<&Task> {
    tasks.into_iter().filter(|t| filter.matches(t)).collect()
}

/// The list shown to the user: sorted first, then filtered.
pub fn visible_tasks(tasks: &[Task], filter: TaskFilter, order: SortOrder) -> Vec<&Task> {
    apply_filter(filter, sort_tasks(tasks, order))
}
