//! Change notifications for task repositories.
//!
//! [`ObservedTaskRepository`] wraps any repository and publishes a
//! [`TaskEvent`] after each successful mutation. Views that must refresh
//! after another view changed something subscribe here instead of polling.

use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::broadcast;
use tracing::debug;

use crate::ports::{HealthStatus, PortFuture, TaskRepository};
use crate::task::{NewTask, Task, TaskId, TaskPatch, TaskStatus};

/// Buffered events per subscriber before the slowest one starts lagging.
const CHANNEL_CAPACITY: usize = 64;

/// A completed change to the task collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskEvent {
    /// A task was created.
    Created(Task),
    /// A task was changed; carries the new state.
    Updated(Task),
    /// A task was removed.
    Deleted(TaskId),
}

impl TaskEvent {
    /// Id of the affected task.
    #[must_use]
    pub fn task_id(&self) -> TaskId {
        match self {
            TaskEvent::Created(task) | TaskEvent::Updated(task) => task.id,
            TaskEvent::Deleted(id) => *id,
        }
    }
}

/// A repository that announces its mutations.
///
/// Reads pass straight through. Failed mutations publish nothing.
pub struct ObservedTaskRepository {
    inner: Arc<dyn TaskRepository>,
    events: broadcast::Sender<TaskEvent>,
}

impl ObservedTaskRepository {
    /// Wraps `inner`.
    pub fn new(inner: Arc<dyn TaskRepository>) -> Self {
        let (events, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { inner, events }
    }

    /// A receiver for every event published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<TaskEvent> {
        self.events.subscribe()
    }

    fn publish(&self, event: TaskEvent) {
        let task_id = event.task_id();
        // No receivers is not an error.
        let receivers = self.events.send(event).unwrap_or(0);
        debug!(task_id, receivers, "task event published");
    }

    fn updated<'a>(&'a self, result: PortFuture<'a, Task>) -> PortFuture<'a, Task> {
        Box::pin(async move {
            let task = result.await?;
            self.publish(TaskEvent::Updated(task.clone()));
            Ok(task)
        })
    }
}

impl TaskRepository for ObservedTaskRepository {
    fn list(&self) -> PortFuture<'_, Vec<Task>> {
        self.inner.list()
    }

    fn get(&self, id: TaskId) -> PortFuture<'_, Task> {
        self.inner.get(id)
    }

    fn create(&self, fields: NewTask) -> PortFuture<'_, Task> {
        Box::pin(async move {
            let task = self.inner.create(fields).await?;
            self.publish(TaskEvent::Created(task.clone()));
            Ok(task)
        })
    }

    fn update(&self, id: TaskId, patch: TaskPatch) -> PortFuture<'_, Task> {
        self.updated(self.inner.update(id, patch))
    }

    fn delete(&self, id: TaskId) -> PortFuture<'_, ()> {
        Box::pin(async move {
            self.inner.delete(id).await?;
            self.publish(TaskEvent::Deleted(id));
            Ok(())
        })
    }

    fn complete(&self, id: TaskId) -> PortFuture<'_, Task> {
        self.updated(self.inner.complete(id))
    }

    fn mark_pending(&self, id: TaskId) -> PortFuture<'_, Task> {
        self.updated(self.inner.mark_pending(id))
    }

    fn by_status(&self, status: TaskStatus) -> PortFuture<'_, Vec<Task>> {
        self.inner.by_status(status)
    }

    fn overdue(&self, as_of: NaiveDate) -> PortFuture<'_, Vec<Task>> {
        self.inner.overdue(as_of)
    }

    fn high_priority(&self) -> PortFuture<'_, Vec<Task>> {
        self.inner.high_priority()
    }

    fn search(&self, query: &str) -> PortFuture<'_, Vec<Task>> {
        self.inner.search(query)
    }

    fn health(&self) -> PortFuture<'_, HealthStatus> {
        self.inner.health()
    }
}
