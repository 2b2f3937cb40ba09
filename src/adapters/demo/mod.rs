//! Demo backend: an in-memory substitute for the remote API.
//!
//! Used when no API URL is configured. The dataset starts from a small
//! fixed seed and can be snapshotted to disk so a command-line session keeps
//! its changes between invocations.

mod accounts;
mod tasks;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub use accounts::DemoAccounts;
pub use tasks::InMemoryTaskRepository;

use crate::session::User;
use crate::task::{Priority, Task, TaskId, TaskStatus};

/// Prefix of every bearer token the demo backend issues.
pub const DEMO_TOKEN_PREFIX: &str = "demo-jwt-token-";

/// A demo account with its plain-text password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemoUser {
    /// Public profile.
    #[serde(flatten)]
    pub user: User,
    /// Password, compared verbatim.
    pub password: String,
}

/// Everything the demo backend holds, in a serializable form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemoSnapshot {
    /// Tasks in insertion order.
    pub tasks: Vec<Task>,
    /// Next id to hand out.
    pub next_id: TaskId,
    /// Accounts, including ones registered during the session.
    #[serde(default)]
    pub users: Vec<DemoUser>,
}

fn at(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw).map_or_else(|_| Utc::now(), |ts| ts.with_timezone(&Utc))
}

fn seed_task(
    id: TaskId,
    title: &str,
    description: &str,
    status: TaskStatus,
    priority: Priority,
    due: (i32, u32, u32),
    (created_at, updated_at): (&str, &str),
) -> Task {
    Task {
        id,
        title: title.to_string(),
        description: Some(description.to_string()),
        status,
        priority,
        due_date: NaiveDate::from_ymd_opt(due.0, due.1, due.2),
        completed: status.is_done(),
        created_at: at(created_at),
        updated_at: at(updated_at),
    }
}

/// The tasks a fresh demo backend starts with.
#[must_use]
pub fn seed_tasks() -> Vec<Task> {
    vec![
        seed_task(
            1,
            "Setup Development Environment",
            "Install Node.js, React and Spring Boot",
            TaskStatus::Done,
            Priority::High,
            (2025, 10, 29),
            ("2025-10-28T10:00:00Z", "2025-10-29T15:30:00Z"),
        ),
        seed_task(
            2,
            "Design Database Schema",
            "PostgreSQL schema design",
            TaskStatus::InProgress,
            Priority::High,
            (2025, 11, 1),
            ("2025-10-29T09:00:00Z", "2025-10-30T11:00:00Z"),
        ),
        seed_task(
            7,
            "Fix Critical Bug",
            "Critical failure in the authentication service",
            TaskStatus::InProgress,
            Priority::Urgent,
            (2025, 10, 27),
            ("2025-10-25T14:00:00Z", "2025-10-30T16:00:00Z"),
        ),
    ]
}

/// The accounts a fresh demo backend starts with.
#[must_use]
pub fn seed_users() -> Vec<DemoUser> {
    vec![
        DemoUser {
            user: User {
                id: 1,
                name: "Demo User".into(),
                email: "demo@example.com".into(),
                role: "admin".into(),
            },
            password: "demo123".into(),
        },
        DemoUser {
            user: User {
                id: 2,
                name: "Test User".into(),
                email: "test@example.com".into(),
                role: "user".into(),
            },
            password: "test123".into(),
        },
    ]
}
