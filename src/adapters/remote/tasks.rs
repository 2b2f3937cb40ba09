//! Task repository backed by the remote API.

use std::sync::Arc;

use tracing::{info, warn};

use super::{missing_as, TaskBody};
use crate::error::{Error, Result};
use crate::gateway::{check_status, decode_json, ApiRequest, Gateway};
use crate::ports::{HealthStatus, HttpResponse, PortFuture, TaskRepository};
use crate::task::{NewTask, Task, TaskId, TaskPatch, TaskStatus};
use crate::validate;

/// Health endpoints, tried in order until one does not answer 404.
const HEALTH_PATHS: [&str; 3] = ["/actuator/health", "/api/health", "/api/tasks/health"];

/// Remote strategy for [`TaskRepository`].
///
/// Every call is bearer-authenticated. Overdue, high-priority and search
/// results are computed from the full list with the same predicates the demo
/// backend uses; the server's own filter endpoints answer differently.
pub struct RemoteTaskRepository {
    gateway: Arc<Gateway>,
}

impl RemoteTaskRepository {
    /// A repository talking through `gateway`.
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    async fn fetch_list(&self, path: &str) -> Result<Vec<Task>> {
        let response = self.gateway.call(ApiRequest::get(path)).await?;
        let response = check_status(response, || endpoint_missing(path))?;
        let tasks: Vec<Task> = decode_json(&response)?;
        Ok(tasks.into_iter().map(Task::normalized).collect())
    }

    async fn send_for_task(&self, id: TaskId, request: ApiRequest) -> Result<HttpResponse> {
        let response = self.gateway.call(request).await?;
        check_status(response, || Error::task_not_found(id))
            .map_err(|err| missing_as(err, || Error::task_not_found(id)))
    }

    async fn fetch_task(&self, id: TaskId, request: ApiRequest) -> Result<Task> {
        let response = self.send_for_task(id, request).await?;
        decode_json::<Task>(&response).map(Task::normalized)
    }

    async fn apply_update(&self, id: TaskId, mut patch: TaskPatch) -> Result<Task> {
        validate::check_patch(&patch)?;
        // The server only moves status on `completed: true`.
        match (patch.status, patch.completed) {
            (None, Some(true)) => patch.status = Some(TaskStatus::Done),
            (None, Some(false)) => {
                if self.get(id).await?.status.is_done() {
                    patch.status = Some(TaskStatus::Todo);
                }
            }
            _ => {}
        }
        let request = ApiRequest::put(format!("/api/tasks/{id}"), &TaskBody::from(&patch))?;
        let task = self.fetch_task(id, request).await?;
        info!(task_id = task.id, status = %task.status, "task updated");
        Ok(task)
    }

    async fn probe_health(&self) -> Result<HealthStatus> {
        for path in HEALTH_PATHS {
            let response = self.gateway.call_anonymous(ApiRequest::get(path)).await?;
            if response.status == 404 {
                warn!(path, "health endpoint missing, trying next");
                continue;
            }
            let response = check_status(response, || endpoint_missing(path))?;
            let mut health: HealthStatus = decode_json(&response)?;
            health.mode.get_or_insert_with(|| "REMOTE".to_string());
            return Ok(health);
        }
        Err(endpoint_missing("health"))
    }
}

fn endpoint_missing(path: &str) -> Error {
    Error::Server { status: 404, message: format!("endpoint {path} not available") }
}

impl TaskRepository for RemoteTaskRepository {
    fn list(&self) -> PortFuture<'_, Vec<Task>> {
        Box::pin(self.fetch_list("/api/tasks"))
    }

    fn get(&self, id: TaskId) -> PortFuture<'_, Task> {
        Box::pin(self.fetch_task(id, ApiRequest::get(format!("/api/tasks/{id}"))))
    }

    fn create(&self, fields: NewTask) -> PortFuture<'_, Task> {
        Box::pin(async move {
            validate::check_new_task(&fields)?;
            let request = ApiRequest::post("/api/tasks", &TaskBody::from(&fields))?;
            let response = self.gateway.call(request).await?;
            let response = check_status(response, || endpoint_missing("/api/tasks"))?;
            let task = decode_json::<Task>(&response)?.normalized();
            info!(task_id = task.id, "task created");
            Ok(task)
        })
    }

    fn update(&self, id: TaskId, patch: TaskPatch) -> PortFuture<'_, Task> {
        Box::pin(self.apply_update(id, patch))
    }

    fn delete(&self, id: TaskId) -> PortFuture<'_, ()> {
        Box::pin(async move {
            self.send_for_task(id, ApiRequest::delete(format!("/api/tasks/{id}"))).await?;
            info!(task_id = id, "task deleted");
            Ok(())
        })
    }

    fn complete(&self, id: TaskId) -> PortFuture<'_, Task> {
        Box::pin(self.fetch_task(id, ApiRequest::patch(format!("/api/tasks/{id}/complete"))))
    }

    fn mark_pending(&self, id: TaskId) -> PortFuture<'_, Task> {
        Box::pin(self.fetch_task(id, ApiRequest::patch(format!("/api/tasks/{id}/pending"))))
    }

    fn by_status(&self, status: TaskStatus) -> PortFuture<'_, Vec<Task>> {
        Box::pin(async move { self.fetch_list(&format!("/api/tasks/status/{status}")).await })
    }

    fn health(&self) -> PortFuture<'_, HealthStatus> {
        Box::pin(self.probe_health())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::ScriptedTransport;
    use crate::ports::Method;
    use crate::session::{Session, SessionCell, User};
    use chrono::NaiveDate;
    use serde_json::json;

    const TASK_7: &str = r#"{"id":7,"title":"Fix Critical Bug","description":"auth","status":"IN_PROGRESS",
        "priority":"URGENT","dueDate":"2025-10-27T00:00:00","createdAt":"2025-10-25T14:00:00",
        "updatedAt":"2025-10-30T16:00:00","completed":false,"overdue":true}"#;

    fn repo(
        responses: Vec<HttpResponse>,
    ) -> (RemoteTaskRepository, Arc<ScriptedTransport>, Arc<SessionCell>) {
        let transport = Arc::new(ScriptedTransport::new(responses));
        let cell = Arc::new(SessionCell::in_memory());
        cell.set(Session {
            token: "jwt".into(),
            user: User { id: 1, name: "A".into(), email: "a@b.co".into(), role: "user".into() },
        });
        let gateway = Gateway::new(transport.clone(), Arc::clone(&cell), "http://api");
        (RemoteTaskRepository::new(Arc::new(gateway)), transport, cell)
    }

    #[tokio::test]
    async fn list_decodes_server_payload() {
        let (repo, transport, _) = repo(vec![HttpResponse::new(200, format!("[{TASK_7}]"))]);
        let tasks = repo.list().await.unwrap();
        assert_eq!(tasks[0].id, 7);
        assert_eq!(tasks[0].due_date, NaiveDate::from_ymd_opt(2025, 10, 27));
        assert_eq!(transport.sent()[0].url, "http://api/api/tasks");
    }

    #[tokio::test]
    async fn missing_task_is_not_found_for_404_and_500() {
        let (repo, _, _) = repo(vec![
            HttpResponse::new(404, ""),
            HttpResponse::new(500, r#"{"message":"Task not found with ID: 9"}"#),
        ]);
        assert!(matches!(repo.get(9).await, Err(Error::NotFound { .. })));
        assert!(matches!(repo.delete(9).await, Err(Error::NotFound { .. })));
    }

    #[tokio::test]
    async fn completed_alone_on_done_task_sends_todo() {
        let done = TASK_7
            .replace("IN_PROGRESS", "DONE")
            .replace("\"completed\":false", "\"completed\":true");
        let (repo, transport, _) = repo(vec![
            HttpResponse::new(200, done),
            HttpResponse::new(200, TASK_7.replace("IN_PROGRESS", "TODO")),
        ]);
        let patch = TaskPatch { completed: Some(false), ..TaskPatch::default() };
        let task = repo.update(7, patch).await.unwrap();
        assert_eq!(task.status, TaskStatus::Todo);

        let sent = transport.sent();
        assert_eq!(sent[1].method, Method::Put);
        assert_eq!(sent[1].body, Some(json!({"status": "TODO", "completed": false})));
    }

    #[tokio::test]
    async fn rejected_patch_never_leaves_the_process() {
        let (repo, transport, _) = repo(Vec::new());
        let patch = TaskPatch {
            status: Some(TaskStatus::Done),
            completed: Some(false),
            ..TaskPatch::default()
        };
        assert!(matches!(repo.update(1, patch).await, Err(Error::Validation(_))));
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn high_priority_filters_locally() {
        let low = TASK_7.replace("\"id\":7", "\"id\":8").replace("URGENT", "LOW");
        let (repo, transport, _) = repo(vec![HttpResponse::new(200, format!("[{TASK_7},{low}]"))]);
        let tasks = repo.high_priority().await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(transport.sent()[0].url, "http://api/api/tasks");
    }

    #[tokio::test]
    async fn by_status_uses_status_endpoint() {
        let (repo, transport, _) = repo(vec![HttpResponse::new(200, "[]")]);
        repo.by_status(TaskStatus::InProgress).await.unwrap();
        assert_eq!(transport.sent()[0].url, "http://api/api/tasks/status/IN_PROGRESS");
    }

    #[tokio::test]
    async fn unauthorized_list_expires_session() {
        let (repo, _, cell) = repo(vec![HttpResponse::new(401, "")]);
        assert!(matches!(repo.list().await, Err(Error::SessionExpired)));
        assert!(!cell.is_authenticated());
    }

    #[tokio::test]
    async fn health_falls_back_past_missing_endpoints() {
        let (repo, transport, _) = repo(vec![
            HttpResponse::new(404, ""),
            HttpResponse::new(200, r#"{"status":"UP","service":"Task Management API"}"#),
        ]);
        let health = repo.health().await.unwrap();
        assert!(health.is_up());
        assert_eq!(health.mode.as_deref(), Some("REMOTE"));
        assert_eq!(transport.sent()[1].url, "http://api/api/health");
        assert_eq!(transport.sent()[1].header("Authorization"), None);
    }
}
