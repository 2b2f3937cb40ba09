//! Remote backend reached over HTTP through the [`Gateway`](crate::gateway::Gateway).
//!
//! The server speaks `LocalDateTime` strings for due dates and reports some
//! missing records as a 500 with a "not found" message; both quirks are
//! absorbed here so callers see the same contracts as the demo backend.

mod accounts;
mod tasks;

use chrono::NaiveDate;
use serde::Serialize;

pub use accounts::RemoteAccounts;
pub use tasks::RemoteTaskRepository;

use crate::error::Error;
use crate::task::{NewTask, Priority, TaskPatch, TaskStatus};

/// Formats a due date the way the server's `LocalDateTime` fields expect.
fn wire_date(date: NaiveDate) -> String {
    format!("{}T00:00:00", date.format("%Y-%m-%d"))
}

/// Body of `POST /api/tasks` and `PUT /api/tasks/{id}`.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct TaskBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    completed: Option<bool>,
}

impl<'a> From<&'a NewTask> for TaskBody<'a> {
    fn from(fields: &'a NewTask) -> Self {
        Self {
            title: Some(fields.title.trim()),
            description: fields.description.as_deref(),
            priority: Some(fields.priority),
            due_date: Some(wire_date(fields.due_date)),
            ..Self::default()
        }
    }
}

impl<'a> From<&'a TaskPatch> for TaskBody<'a> {
    fn from(patch: &'a TaskPatch) -> Self {
        Self {
            title: patch.title.as_deref().map(str::trim),
            description: patch.description.as_deref(),
            status: patch.status,
            priority: patch.priority,
            due_date: patch.due_date.map(wire_date),
            completed: patch.completed.or(patch.status.map(TaskStatus::is_done)),
        }
    }
}

/// Rewrites the server's "not found" 500s into `not_found`.
fn missing_as(err: Error, not_found: impl FnOnce() -> Error) -> Error {
    match err {
        Error::Server { ref message, .. } if message.to_lowercase().contains("not found") => {
            not_found()
        }
        other => other,
    }
}
