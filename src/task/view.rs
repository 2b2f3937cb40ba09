//! Pure projections from tasks to the values a dashboard renders.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::{Priority, Task, TaskStatus};

const SECONDS_PER_DAY: i64 = 86_400;

/// Display attributes for a priority or status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BadgeInfo {
    /// Human-readable label.
    pub label: &'static str,
    /// CSS colour.
    pub color: &'static str,
    /// Emoji icon.
    pub icon: &'static str,
}

const LOW: BadgeInfo = BadgeInfo { label: "Low Priority", color: "#28a745", icon: "🟢" };
const MEDIUM: BadgeInfo = BadgeInfo { label: "Medium Priority", color: "#ffc107", icon: "🟡" };
const HIGH: BadgeInfo = BadgeInfo { label: "High Priority", color: "#dc3545", icon: "🔴" };
const URGENT: BadgeInfo = BadgeInfo { label: "Urgent", color: "#ff4444", icon: "🔥" };

const TODO: BadgeInfo = BadgeInfo { label: "To Do", color: "#6c757d", icon: "⏳" };
const IN_PROGRESS: BadgeInfo = BadgeInfo { label: "In Progress", color: "#007bff", icon: "🔄" };
const DONE: BadgeInfo = BadgeInfo { label: "Done", color: "#28a745", icon: "✅" };

impl Priority {
    /// Badge for this priority.
    #[must_use]
    pub fn info(self) -> BadgeInfo {
        match self {
            Priority::Low => LOW,
            Priority::Medium => MEDIUM,
            Priority::High => HIGH,
            Priority::Urgent => URGENT,
        }
    }
}

impl TaskStatus {
    /// Badge for this status.
    #[must_use]
    pub fn info(self) -> BadgeInfo {
        match self {
            TaskStatus::Todo => TODO,
            TaskStatus::InProgress => IN_PROGRESS,
            TaskStatus::Done => DONE,
        }
    }
}

/// Badge for a raw priority rank. Unknown ranks get the MEDIUM badge.
#[must_use]
pub fn priority_info(rank: i64) -> BadgeInfo {
    Priority::from_rank(rank).map_or(MEDIUM, Priority::info)
}

/// Badge for a raw status name. Unknown names get the TODO badge.
#[must_use]
pub fn status_info(raw: &str) -> BadgeInfo {
    raw.parse::<TaskStatus>().map_or(TODO, TaskStatus::info)
}

/// Whether `task` counts as overdue on the calendar day of `now`.
#[must_use]
pub fn is_overdue(task: &Task, now: DateTime<Utc>) -> bool {
    task.is_overdue_on(now.date_naive())
}

/// Relative description of a due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueDatePhrase {
    /// Due date passed this many days ago.
    Overdue(i64),
    /// Due today.
    Today,
    /// Due tomorrow.
    Tomorrow,
    /// Due in this many days (two or more).
    InDays(i64),
}

impl fmt::Display for DueDatePhrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            DueDatePhrase::Overdue(1) => f.write_str("Overdue by 1 day"),
            DueDatePhrase::Overdue(days) => write!(f, "Overdue by {days} days"),
            DueDatePhrase::Today => f.write_str("Due today"),
            DueDatePhrase::Tomorrow => f.write_str("Due tomorrow"),
            DueDatePhrase::InDays(days) => write!(f, "Due in {days} days"),
        }
    }
}

/// Whole days from `now` until midnight UTC of `due`, rounded up.
#[must_use]
pub fn days_until(due: NaiveDate, now: DateTime<Utc>) -> i64 {
    let due_start = due.and_hms_opt(0, 0, 0).map_or(now, |d| d.and_utc());
    let seconds = (due_start - now).num_seconds();
    let days = seconds.div_euclid(SECONDS_PER_DAY);
    if seconds.rem_euclid(SECONDS_PER_DAY) > 0 {
        days + 1
    } else {
        days
    }
}

/// Classifies `due` relative to `now`.
#[must_use]
pub fn due_date_phrase(due: NaiveDate, now: DateTime<Utc>) -> DueDatePhrase {
    match days_until(due, now) {
        days if days < 0 => DueDatePhrase::Overdue(-days),
        0 => DueDatePhrase::Today,
        1 => DueDatePhrase::Tomorrow,
        days => DueDatePhrase::InDays(days),
    }
}

/// Human-readable form of [`due_date_phrase`].
#[must_use]
pub fn format_due_date_phrase(due: NaiveDate, now: DateTime<Utc>) -> String {
    due_date_phrase(due, now).to_string()
}

/// Counts behind the dashboard's filter buttons.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskStats {
    /// Every task.
    pub total: usize,
    /// Status `TODO`.
    pub todo: usize,
    /// Status `IN_PROGRESS`.
    pub in_progress: usize,
    /// Status `DONE`.
    pub done: usize,
    /// Overdue on `today`.
    pub overdue: usize,
    /// `HIGH` or `URGENT`.
    pub high_priority: usize,
}

impl TaskStats {
    /// Tallies `tasks` as of the calendar day `today`.
    #[must_use]
    pub fn from_tasks(tasks: &[Task], today: NaiveDate) -> Self {
        tasks.iter().fold(Self::default(), |mut stats, task| {
            stats.total += 1;
            match task.status {
                TaskStatus::Todo => stats.todo += 1,
                TaskStatus::InProgress => stats.in_progress += 1,
                TaskStatus::Done => stats.done += 1,
            }
            if task.is_overdue_on(today) {
                stats.overdue += 1;
            }
            if task.priority.is_high() {
                stats.high_priority += 1;
            }
            stats
        })
    }
}
