//! In-memory task repository.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::info;

use super::seed_tasks;
use crate::error::{Error, Result};
use crate::ports::{Clock, HealthStatus, PortFuture, TaskRepository};
use crate::task::{NewTask, Task, TaskId, TaskPatch};

struct TaskTable {
    tasks: Vec<Task>,
    next_id: TaskId,
}

impl TaskTable {
    fn from_tasks(tasks: Vec<Task>) -> Self {
        let next_id = tasks.iter().map(|t| t.id).max().map_or(1, |max| max + 1);
        Self { tasks, next_id }
    }

    fn position(&self, id: TaskId) -> Result<usize> {
        self.tasks.iter().position(|t| t.id == id).ok_or_else(|| Error::task_not_found(id))
    }
}

/// Task collection held in process memory.
///
/// Every operation runs to completion under one lock, so callers never see
/// a half-applied mutation. Ids come from a counter that only grows; a
/// deleted task's id is never handed out again.
pub struct InMemoryTaskRepository {
    table: Mutex<TaskTable>,
    initial: Vec<Task>,
    clock: Arc<dyn Clock>,
}

impl InMemoryTaskRepository {
    /// An empty repository.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_tasks(clock, Vec::new())
    }

    /// A repository holding the demo seed tasks.
    pub fn seeded(clock: Arc<dyn Clock>) -> Self {
        Self::with_tasks(clock, seed_tasks())
    }

    /// A repository holding `tasks`, in the given order.
    pub fn with_tasks(clock: Arc<dyn Clock>, tasks: Vec<Task>) -> Self {
        Self { table: Mutex::new(TaskTable::from_tasks(tasks.clone())), initial: tasks, clock }
    }

    fn lock(&self) -> MutexGuard<'_, TaskTable> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the repository to the dataset it was created with.
    ///
    /// The id counter keeps its value, so ids handed out before the reset
    /// are not handed out again.
    pub fn reset(&self) {
        let mut table = self.lock();
        let next_id = table.next_id;
        *table = TaskTable::from_tasks(self.initial.clone());
        table.next_id = table.next_id.max(next_id);
    }

    /// Current tasks and the next id to be assigned.
    #[must_use]
    pub fn snapshot(&self) -> (Vec<Task>, TaskId) {
        let table = self.lock();
        (table.tasks.clone(), table.next_id)
    }

    /// Replaces the contents with a snapshot.
    ///
    /// `next_id` is raised past the largest restored id if needed.
    pub fn restore(&self, tasks: Vec<Task>, next_id: TaskId) {
        let mut table = TaskTable::from_tasks(tasks);
        table.next_id = table.next_id.max(next_id);
        *self.lock() = table;
    }
}

impl TaskRepository for InMemoryTaskRepository {
    fn list(&self) -> PortFuture<'_, Vec<Task>> {
        let tasks = self.lock().tasks.clone();
        Box::pin(async move { Ok(tasks) })
    }

    fn get(&self, id: TaskId) -> PortFuture<'_, Task> {
        let result = {
            let table = self.lock();
            table.position(id).map(|idx| table.tasks[idx].clone())
        };
        Box::pin(async move { result })
    }

    fn create(&self, fields: NewTask) -> PortFuture<'_, Task> {
        let result = {
            let mut table = self.lock();
            Task::create(table.next_id, fields, self.clock.now()).map(|task| {
                table.next_id += 1;
                table.tasks.push(task.clone());
                task
            })
        };
        if let Ok(task) = &result {
            info!(task_id = task.id, "task created");
        }
        Box::pin(async move { result })
    }

    fn update(&self, id: TaskId, patch: TaskPatch) -> PortFuture<'_, Task> {
        let result = {
            let mut table = self.lock();
            table.position(id).and_then(|idx| {
                let task = &mut table.tasks[idx];
                task.apply(patch, self.clock.now())?;
                Ok(task.clone())
            })
        };
        if let Ok(task) = &result {
            info!(task_id = task.id, status = %task.status, "task updated");
        }
        Box::pin(async move { result })
    }

    fn delete(&self, id: TaskId) -> PortFuture<'_, ()> {
        let result = {
            let mut table = self.lock();
            table.position(id).map(|idx| {
                table.tasks.remove(idx);
            })
        };
        if result.is_ok() {
            info!(task_id = id, "task deleted");
        }
        Box::pin(async move { result })
    }

    fn health(&self) -> PortFuture<'_, HealthStatus> {
        Box::pin(async {
            Ok(HealthStatus { status: "UP".to_string(), mode: Some("DEMO".to_string()) })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::FixedClock;
    use crate::task::{Priority, TaskStatus};
    use chrono::{Duration, NaiveDate, TimeZone, Utc};

    fn clock() -> Arc<FixedClock> {
        Arc::new(FixedClock::at(Utc.with_ymd_and_hms(2025, 1, 5, 12, 0, 0).unwrap()))
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
    }

    #[tokio::test]
    async fn create_assigns_increasing_ids() {
        let repo = InMemoryTaskRepository::new(clock());
        let a = repo.create(NewTask::new("A", date(1))).await.unwrap();
        let b = repo.create(NewTask::new("B", date(2))).await.unwrap();
        assert_eq!((a.id, b.id), (1, 2));
        assert_eq!(repo.list().await.unwrap(), vec![a, b]);
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let repo = InMemoryTaskRepository::new(clock());
        let a = repo.create(NewTask::new("A", date(1))).await.unwrap();
        repo.delete(a.id).await.unwrap();
        let b = repo.create(NewTask::new("B", date(1))).await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn seeded_repository_continues_after_highest_id() {
        let repo = InMemoryTaskRepository::seeded(clock());
        let task = repo.create(NewTask::new("Next", date(9))).await.unwrap();
        assert_eq!(task.id, 8);
    }

    #[tokio::test]
    async fn update_restamps_and_keeps_invariant() {
        let clock = clock();
        let repo = InMemoryTaskRepository::new(clock.clone());
        let task = repo.create(NewTask::new("A", date(1))).await.unwrap();

        clock.advance(Duration::hours(1));
        let done = repo.complete(task.id).await.unwrap();
        assert_eq!(done.status, TaskStatus::Done);
        assert!(done.completed);
        assert!(done.updated_at > task.updated_at);
        assert_eq!(done.created_at, task.created_at);

        let pending = repo.mark_pending(task.id).await.unwrap();
        assert_eq!(pending.status, TaskStatus::Todo);
        assert!(!pending.completed);
    }

    #[tokio::test]
    async fn missing_ids_are_not_found() {
        let repo = InMemoryTaskRepository::new(clock());
        assert!(matches!(repo.get(42).await, Err(Error::NotFound { .. })));
        assert!(matches!(
            repo.update(42, TaskPatch::complete()).await,
            Err(Error::NotFound { .. })
        ));
        assert!(matches!(repo.delete(42).await, Err(Error::NotFound { .. })));
    }

    #[tokio::test]
    async fn rejected_create_does_not_consume_an_id() {
        let repo = InMemoryTaskRepository::new(clock());
        assert!(repo.create(NewTask::new(" ", date(1))).await.is_err());
        let task = repo.create(NewTask::new("A", date(1))).await.unwrap();
        assert_eq!(task.id, 1);
    }

    #[tokio::test]
    async fn filters_keep_insertion_order() {
        let repo = InMemoryTaskRepository::new(clock());
        let urgent = repo
            .create(NewTask::new("Urgent", date(1)).with_priority(Priority::Urgent))
            .await
            .unwrap();
        repo.create(NewTask::new("Low", date(1)).with_priority(Priority::Low)).await.unwrap();
        let high = repo
            .create(NewTask::new("High", date(9)).with_priority(Priority::High))
            .await
            .unwrap();

        let ids: Vec<_> = repo.high_priority().await.unwrap().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![urgent.id, high.id]);

        let overdue = repo.overdue(date(5)).await.unwrap();
        assert_eq!(overdue.len(), 2);
        assert!(overdue.iter().all(|t| t.due_date == Some(date(1))));
    }

    #[tokio::test]
    async fn search_matches_title_or_description() {
        let repo = InMemoryTaskRepository::seeded(clock());
        let by_title = repo.search("database").await.unwrap();
        assert_eq!(by_title.len(), 1);
        let by_description = repo.search("AUTHENTICATION").await.unwrap();
        assert_eq!(by_description[0].id, 7);
        assert_eq!(repo.search("").await.unwrap(), repo.list().await.unwrap());
    }

    #[tokio::test]
    async fn reset_and_restore() {
        let repo = InMemoryTaskRepository::seeded(clock());
        repo.delete(1).await.unwrap();
        let (tasks, next_id) = repo.snapshot();
        assert_eq!(tasks.len(), 2);

        repo.reset();
        assert_eq!(repo.list().await.unwrap().len(), 3);

        repo.restore(tasks, next_id);
        assert_eq!(repo.list().await.unwrap().len(), 2);
        assert!(matches!(repo.get(1).await, Err(Error::NotFound { .. })));
    }

    #[tokio::test]
    async fn reset_does_not_rewind_ids() {
        let repo = InMemoryTaskRepository::seeded(clock());
        let before = repo.create(NewTask::new("Before reset", date(9))).await.unwrap();
        assert_eq!(before.id, 8);

        repo.reset();
        let after = repo.create(NewTask::new("After reset", date(9))).await.unwrap();
        assert_eq!(after.id, 9);
        assert_eq!(repo.snapshot().1, 10);
    }

    #[tokio::test]
    async fn health_reports_demo_mode() {
        let repo = InMemoryTaskRepository::new(clock());
        let health = repo.health().await.unwrap();
        assert!(health.is_up());
        assert_eq!(health.mode.as_deref(), Some("DEMO"));
    }
}
