//! Task records and the inputs that create or change them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::serde_time;
use super::{Priority, TaskStatus};
use crate::error::Result;
use crate::validate;

/// Repository-assigned task identifier.
pub type TaskId = u64;

/// A unit of tracked work.
///
/// `completed` is `true` exactly when `status` is [`TaskStatus::Done`]; every
/// mutation in this crate goes through [`Task::apply`], which keeps both in
/// step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique, never reused.
    pub id: TaskId,
    /// Non-empty title.
    pub title: String,
    /// Free-form details.
    #[serde(default)]
    pub description: Option<String>,
    /// Workflow status.
    #[serde(default)]
    pub status: TaskStatus,
    /// Priority rank.
    #[serde(default)]
    pub priority: Priority,
    /// Calendar due date, if any.
    #[serde(default, deserialize_with = "serde_time::optional_date")]
    pub due_date: Option<NaiveDate>,
    /// Mirrors `status == DONE`.
    #[serde(default)]
    pub completed: bool,
    /// Creation time.
    #[serde(deserialize_with = "serde_time::timestamp")]
    pub created_at: DateTime<Utc>,
    /// Last mutation time.
    #[serde(deserialize_with = "serde_time::timestamp")]
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when creating a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    /// Title; surrounding whitespace is dropped.
    pub title: String,
    /// Optional details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Priority rank.
    #[serde(default)]
    pub priority: Priority,
    /// Calendar due date.
    pub due_date: NaiveDate,
}

impl NewTask {
    /// A task with the given title, due on `due_date`, at medium priority.
    pub fn new(title: impl Into<String>, due_date: NaiveDate) -> Self {
        Self { title: title.into(), description: None, priority: Priority::Medium, due_date }
    }

    /// Sets the priority.
    #[must_use]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A partial update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    /// New title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New status; also decides `completed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    /// New priority.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    /// New due date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    /// New completion flag; moves status when given alone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TaskPatch {
    /// The patch behind `complete(id)`.
    #[must_use]
    pub fn complete() -> Self {
        Self { status: Some(TaskStatus::Done), completed: Some(true), ..Self::default() }
    }

    /// The patch behind `mark_pending(id)`.
    #[must_use]
    pub fn pending() -> Self {
        Self { status: Some(TaskStatus::Todo), completed: Some(false), ..Self::default() }
    }

    /// Returns `true` when no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl Task {
    /// Builds a fresh `TODO` task from creation fields.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the fields are rejected.
    pub fn create(id: TaskId, fields: NewTask, now: DateTime<Utc>) -> Result<Self> {
        validate::check_new_task(&fields)?;
        Ok(Self {
            id,
            title: fields.title.trim().to_string(),
            description: fields.description,
            status: TaskStatus::Todo,
            priority: fields.priority,
            due_date: Some(fields.due_date),
            completed: false,
            created_at: now,
            updated_at: now,
        })
    }

    /// Merges `patch` into this task and stamps `updated_at`.
    ///
    /// The patch is validated before anything is written, so a rejected
    /// patch leaves the task untouched.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank title, overlong fields, or a
    /// `status`/`completed` pair that disagree.
    pub fn apply(&mut self, patch: TaskPatch, now: DateTime<Utc>) -> Result<()> {
        validate::check_patch(&patch)?;

        if let Some(title) = patch.title {
            self.title = title.trim().to_string();
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = Some(due_date);
        }
        match (patch.status, patch.completed) {
            (Some(status), _) => self.set_status(status),
            (None, Some(true)) => self.set_status(TaskStatus::Done),
            (None, Some(false)) if self.status.is_done() => self.set_status(TaskStatus::Todo),
            (None, _) => {}
        }
        self.updated_at = now;
        Ok(())
    }

    /// Re-derives `completed` from `status`.
    ///
    /// Used on records that arrive from outside the crate.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.completed = self.status.is_done();
        self
    }

    /// Not done and due strictly before `today`.
    #[must_use]
    pub fn is_overdue_on(&self, today: NaiveDate) -> bool {
        !self.status.is_done() && self.due_date.is_some_and(|due| due < today)
    }

    /// Case-insensitive substring match on title or description.
    ///
    /// `needle` must already be lower-cased.
    #[must_use]
    pub fn matches_lowercase(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.description.as_ref().is_some_and(|d| d.to_lowercase().contains(needle))
    }

    fn set_status(&mut self, status: TaskStatus) {
        self.status = status;
        self.completed = status.is_done();
    }
}
