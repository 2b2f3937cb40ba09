//! The task dashboard: filter bar, search box and summary counts.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::error::Result;
use crate::ports::{Clock, TaskRepository};
use crate::task::{Task, TaskStats, TaskStatus};

/// One button of the dashboard filter bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DashboardFilter {
    /// Every task.
    #[default]
    All,
    /// `TODO` tasks.
    Todo,
    /// `IN_PROGRESS` tasks.
    InProgress,
    /// `DONE` tasks.
    Done,
    /// Not done and past due.
    Overdue,
    /// `HIGH` or `URGENT`.
    HighPriority,
}

impl DashboardFilter {
    /// Every filter, in display order.
    pub const ALL: [DashboardFilter; 6] = [
        DashboardFilter::All,
        DashboardFilter::Todo,
        DashboardFilter::InProgress,
        DashboardFilter::Done,
        DashboardFilter::Overdue,
        DashboardFilter::HighPriority,
    ];

    /// Command-line spelling.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DashboardFilter::All => "all",
            DashboardFilter::Todo => "todo",
            DashboardFilter::InProgress => "in-progress",
            DashboardFilter::Done => "done",
            DashboardFilter::Overdue => "overdue",
            DashboardFilter::HighPriority => "high-priority",
        }
    }

    fn status(self) -> Option<TaskStatus> {
        match self {
            DashboardFilter::Todo => Some(TaskStatus::Todo),
            DashboardFilter::InProgress => Some(TaskStatus::InProgress),
            DashboardFilter::Done => Some(TaskStatus::Done),
            _ => None,
        }
    }

    /// Whether `task` passes this filter on `today`.
    #[must_use]
    pub fn matches(self, task: &Task, today: NaiveDate) -> bool {
        match self {
            DashboardFilter::All => true,
            DashboardFilter::Overdue => task.is_overdue_on(today),
            DashboardFilter::HighPriority => task.priority.is_high(),
            status => status.status() == Some(task.status),
        }
    }
}

impl fmt::Display for DashboardFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DashboardFilter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL.into_iter().find(|f| f.as_str() == wanted).ok_or_else(|| {
            let names: Vec<_> = Self::ALL.iter().map(|f| f.as_str()).collect();
            format!("unknown filter '{s}' (expected one of: {})", names.join(", "))
        })
    }
}

/// Reads the task list the way the dashboard shows it.
///
/// Failures propagate; an unreachable backend is never shown as an empty
/// list.
pub struct Dashboard {
    tasks: Arc<dyn TaskRepository>,
    clock: Arc<dyn Clock>,
}

impl Dashboard {
    /// A dashboard over `tasks`, using `clock` for "today".
    pub fn new(tasks: Arc<dyn TaskRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { tasks, clock }
    }

    /// Tasks passing `filter`, in insertion order.
    ///
    /// # Errors
    ///
    /// Propagates repository failures.
    pub async fn load(&self, filter: DashboardFilter) -> Result<Vec<Task>> {
        match filter {
            DashboardFilter::All => self.tasks.list().await,
            DashboardFilter::Overdue => self.tasks.overdue(self.clock.today()).await,
            DashboardFilter::HighPriority => self.tasks.high_priority().await,
            other => match other.status() {
                Some(status) => self.tasks.by_status(status).await,
                None => self.tasks.list().await,
            },
        }
    }

    /// Search results narrowed by `filter`. A blank query behaves like
    /// [`Dashboard::load`].
    ///
    /// # Errors
    ///
    /// Propagates repository failures.
    pub async fn search(&self, query: &str, filter: DashboardFilter) -> Result<Vec<Task>> {
        if query.trim().is_empty() {
            return self.load(filter).await;
        }
        let today = self.clock.today();
        let found = self.tasks.search(query).await?;
        Ok(found.into_iter().filter(|t| filter.matches(t, today)).collect())
    }

    /// Summary counts for the header.
    ///
    /// # Errors
    ///
    /// Propagates repository failures.
    pub async fn stats(&self) -> Result<TaskStats> {
        let tasks = self.tasks.list().await?;
        Ok(TaskStats::from_tasks(&tasks, self.clock.today()))
    }
}
