//! Task repository port.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::PortFuture;
use crate::task::{NewTask, Task, TaskId, TaskPatch, TaskStatus};

/// Backend liveness as reported by `health()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// `"UP"` when the backend answers.
    pub status: String,
    /// `"DEMO"` or `"REMOTE"`.
    #[serde(default)]
    pub mode: Option<String>,
}

impl HealthStatus {
    /// Returns `true` when `status` is `UP`.
    #[must_use]
    pub fn is_up(&self) -> bool {
        self.status.eq_ignore_ascii_case("UP")
    }
}

/// The collection of tasks a dashboard works against.
///
/// Two strategies implement it: an in-memory demo dataset and the remote
/// API. One is chosen at startup and injected into every consumer. Both
/// keep `completed == (status == DONE)` after every mutation, preserve
/// insertion order in every listing, and never reuse an id.
pub trait TaskRepository: Send + Sync {
    /// All tasks, insertion order.
    ///
    /// # Errors
    ///
    /// Propagates backend failures.
    fn list(&self) -> PortFuture<'_, Vec<Task>>;

    /// One task.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when no task has `id`.
    fn get(&self, id: TaskId) -> PortFuture<'_, Task>;

    /// Creates a `TODO` task with a fresh id.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty title.
    fn create(&self, fields: NewTask) -> PortFuture<'_, Task>;

    /// Merges `patch` into the task and restamps `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when no task has `id`, or a validation error for
    /// a rejected patch.
    fn update(&self, id: TaskId, patch: TaskPatch) -> PortFuture<'_, Task>;

    /// Removes the task.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when no task has `id`.
    fn delete(&self, id: TaskId) -> PortFuture<'_, ()>;

    /// Marks the task `DONE`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when no task has `id`.
    fn complete(&self, id: TaskId) -> PortFuture<'_, Task> {
        self.update(id, TaskPatch::complete())
    }

    /// Moves the task back to `TODO`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when no task has `id`.
    fn mark_pending(&self, id: TaskId) -> PortFuture<'_, Task> {
        self.update(id, TaskPatch::pending())
    }

    /// Tasks with the given status.
    ///
    /// # Errors
    ///
    /// Propagates backend failures.
    fn by_status(&self, status: TaskStatus) -> PortFuture<'_, Vec<Task>> {
        Box::pin(async move {
            Ok(self.list().await?.into_iter().filter(|t| t.status == status).collect())
        })
    }

    /// Tasks not done and due strictly before `as_of`.
    ///
    /// # Errors
    ///
    /// Propagates backend failures.
    fn overdue(&self, as_of: NaiveDate) -> PortFuture<'_, Vec<Task>> {
        Box::pin(async move {
            Ok(self.list().await?.into_iter().filter(|t| t.is_overdue_on(as_of)).collect())
        })
    }

    /// Tasks with priority `HIGH` or `URGENT`.
    ///
    /// # Errors
    ///
    /// Propagates backend failures.
    fn high_priority(&self) -> PortFuture<'_, Vec<Task>> {
        Box::pin(async move {
            Ok(self.list().await?.into_iter().filter(|t| t.priority.is_high()).collect())
        })
    }

    /// Case-insensitive substring search over title and description.
    /// A blank query returns every task.
    ///
    /// # Errors
    ///
    /// Propagates backend failures.
    fn search(&self, query: &str) -> PortFuture<'_, Vec<Task>> {
        let needle = query.trim().to_lowercase();
        Box::pin(async move {
            let tasks = self.list().await?;
            if needle.is_empty() {
                return Ok(tasks);
            }
            Ok(tasks.into_iter().filter(|t| t.matches_lowercase(&needle)).collect())
        })
    }

    /// Backend liveness.
    ///
    /// # Errors
    ///
    /// Propagates backend failures.
    fn health(&self) -> PortFuture<'_, HealthStatus>;
}
