//! `taskdeck health` command.

use crate::context::AppContext;
use crate::ports::{HealthStatus, TaskRepository};

/// Asks the backend whether it is up.
///
/// # Errors
///
/// Returns an error string when the backend cannot be reached or reports
/// anything other than `UP`.
pub async fn run(ctx: &AppContext) -> Result<(), String> {
    let health = ctx.tasks().health().await.map_err(|e| e.to_string())?;
    let target = ctx.base_url().unwrap_or("demo backend");
    println!("{target}: {}", summary(&health));
    if health.is_up() {
        Ok(())
    } else {
        Err(format!("backend is {}", health.status))
    }
}

fn summary(health: &HealthStatus) -> String {
    match &health.mode {
        Some(mode) => format!("{} ({mode})", health.status),
        None => health.status.clone(),
    }
}
