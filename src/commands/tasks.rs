//! `taskdeck tasks ...` commands.

use chrono::{DateTime, NaiveDate, Utc};

use crate::cli::{AddArgs, EditArgs, TaskCommand};
use crate::context::AppContext;
use crate::dashboard::DashboardFilter;
use crate::error::Error;
use crate::ports::TaskRepository;
use crate::task::view::format_due_date_phrase;
use crate::task::{NewTask, Task, TaskPatch, TaskStats};
use crate::validate::FieldErrors;

/// Execute a `tasks` subcommand.
///
/// In remote mode a stored session is required; the demo backend accepts
/// anyone.
///
/// # Errors
///
/// Returns an error string when not logged in or when the backend rejects
/// the operation.
pub async fn run(ctx: &AppContext, command: &TaskCommand) -> Result<(), String> {
    if !ctx.is_demo() && !ctx.session.is_authenticated() {
        return Err("not logged in; run `taskdeck login` first".to_string());
    }
    execute(ctx, command).await.map_err(|e| e.to_string())
}

async fn execute(ctx: &AppContext, command: &TaskCommand) -> crate::Result<()> {
    let now = ctx.clock.now();
    let repo = ctx.tasks();
    match command {
        TaskCommand::List { filter } => {
            let tasks = ctx.dashboard().load(*filter).await?;
            print_list(&tasks, now);
        }
        TaskCommand::Search { query, filter } => {
            let tasks = ctx.dashboard().search(query, *filter).await?;
            print_list(&tasks, now);
        }
        TaskCommand::Stats => print_stats(&ctx.dashboard().stats().await?),
        TaskCommand::Show { id } => print_detail(&repo.get(*id).await?, now),
        TaskCommand::Add(args) => {
            let task = repo.create(new_task(args, ctx.clock.today())).await?;
            println!("Created {}", format_task_line(&task, now));
        }
        TaskCommand::Edit(args) => {
            let patch = patch(args);
            if patch.is_empty() {
                return Err(Error::Validation(FieldErrors::single(
                    "task",
                    "nothing to update; pass at least one field",
                )));
            }
            let task = repo.update(args.id, patch).await?;
            println!("Updated {}", format_task_line(&task, now));
        }
        TaskCommand::Done { id } => {
            let task = repo.complete(*id).await?;
            println!("Completed {}", format_task_line(&task, now));
        }
        TaskCommand::Pending { id } => {
            let task = repo.mark_pending(*id).await?;
            println!("Reopened {}", format_task_line(&task, now));
        }
        TaskCommand::Rm { id } => {
            repo.delete(*id).await?;
            println!("Deleted task #{id}");
        }
    }
    Ok(())
}

fn new_task(args: &AddArgs, today: NaiveDate) -> NewTask {
    let mut task =
        NewTask::new(args.title.clone(), args.due.unwrap_or(today)).with_priority(args.priority);
    if let Some(description) = &args.description {
        task = task.with_description(description.clone());
    }
    task
}

fn patch(args: &EditArgs) -> TaskPatch {
    TaskPatch {
        title: args.title.clone(),
        description: args.description.clone(),
        status: args.status,
        priority: args.priority,
        due_date: args.due,
        completed: None,
    }
}

/// One dashboard row: status icon, id, title, priority and due phrase.
#[must_use]
pub fn format_task_line(task: &Task, now: DateTime<Utc>) -> String {
    let due = task
        .due_date
        .map_or_else(|| "No due date".to_string(), |due| format_due_date_phrase(due, now));
    format!(
        "{} #{} {} [{}] {}",
        task.status.info().icon,
        task.id,
        task.title,
        task.priority.info().label,
        due
    )
}

fn print_list(tasks: &[Task], now: DateTime<Utc>) {
    if tasks.is_empty() {
        println!("No tasks found.");
        return;
    }
    for task in tasks {
        println!("{}", format_task_line(task, now));
    }
}

fn print_detail(task: &Task, now: DateTime<Utc>) {
    println!("{}", format_task_line(task, now));
    println!("Status: {}", task.status.info().label);
    if let Some(description) = &task.description {
        println!("Description: {description}");
    }
    if let Some(due) = task.due_date {
        println!("Due: {due}");
    }
    println!("Created: {}", task.created_at.format("%Y-%m-%d %H:%M"));
    println!("Updated: {}", task.updated_at.format("%Y-%m-%d %H:%M"));
}

fn print_stats(stats: &TaskStats) {
    let counts = [
        (DashboardFilter::All, stats.total),
        (DashboardFilter::Todo, stats.todo),
        (DashboardFilter::InProgress, stats.in_progress),
        (DashboardFilter::Done, stats.done),
        (DashboardFilter::Overdue, stats.overdue),
        (DashboardFilter::HighPriority, stats.high_priority),
    ];
    for (filter, count) in counts {
        println!("{:<14} {count}", filter.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{FixedClock, ScriptedTransport};
    use crate::ports::HttpResponse;
    use crate::task::{Priority, TaskStatus};
    use chrono::TimeZone;
    use std::sync::Arc;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 30, 9, 0, 0).unwrap()
    }

    fn context() -> AppContext {
        AppContext::in_memory(Arc::new(FixedClock::at(now())))
    }

    fn add(title: &str, due: Option<NaiveDate>) -> TaskCommand {
        TaskCommand::Add(AddArgs {
            title: title.into(),
            description: None,
            priority: Priority::Low,
            due,
        })
    }

    #[test]
    fn task_line_shows_badges_and_due_phrase() {
        let task = Task {
            id: 7,
            title: "Fix Critical Bug".into(),
            description: None,
            status: TaskStatus::InProgress,
            priority: Priority::Urgent,
            due_date: NaiveDate::from_ymd_opt(2025, 10, 27),
            completed: false,
            created_at: now(),
            updated_at: now(),
        };
        assert_eq!(
            format_task_line(&task, now()),
            "🔄 #7 Fix Critical Bug [Urgent] Overdue by 3 days"
        );

        let undated = Task { due_date: None, status: TaskStatus::Done, ..task };
        assert_eq!(
            format_task_line(&undated, now()),
            "✅ #7 Fix Critical Bug [Urgent] No due date"
        );
    }

    #[tokio::test]
    async fn add_defaults_due_date_to_today() {
        let ctx = context();
        run(&ctx, &add("Write spec", None)).await.unwrap();
        let task = ctx.tasks().get(8).await.unwrap();
        assert_eq!(task.due_date, Some(now().date_naive()));
        assert_eq!(task.priority, Priority::Low);
    }

    #[tokio::test]
    async fn edit_and_toggle_completion() {
        let ctx = context();
        let edit = TaskCommand::Edit(EditArgs {
            id: 2,
            title: Some("Design schema v2".into()),
            description: None,
            status: None,
            priority: None,
            due: None,
        });
        run(&ctx, &edit).await.unwrap();
        run(&ctx, &TaskCommand::Done { id: 2 }).await.unwrap();
        let task = ctx.tasks().get(2).await.unwrap();
        assert_eq!(task.title, "Design schema v2");
        assert!(task.completed);

        run(&ctx, &TaskCommand::Pending { id: 2 }).await.unwrap();
        assert_eq!(ctx.tasks().get(2).await.unwrap().status, TaskStatus::Todo);
    }

    #[tokio::test]
    async fn edit_without_fields_changes_nothing() {
        let ctx = context();
        let before = ctx.tasks().get(2).await.unwrap();
        let edit = TaskCommand::Edit(EditArgs {
            id: 2,
            title: None,
            description: None,
            status: None,
            priority: None,
            due: None,
        });
        let err = run(&ctx, &edit).await.unwrap_err();
        assert!(err.contains("nothing to update"), "{err}");
        assert_eq!(ctx.tasks().get(2).await.unwrap(), before);
    }

    #[tokio::test]
    async fn blank_title_is_rejected() {
        let ctx = context();
        let err = run(&ctx, &add("   ", None)).await.unwrap_err();
        assert!(err.contains("title"), "{err}");
    }

    #[tokio::test]
    async fn remote_mode_requires_login() {
        let transport = Arc::new(ScriptedTransport::new(Vec::<HttpResponse>::new()));
        let clock = Arc::new(FixedClock::at(now()));
        let ctx = AppContext::remote("http://api.test", transport.clone(), clock);
        let err = run(&ctx, &TaskCommand::Stats).await.unwrap_err();
        assert!(err.contains("not logged in"));
        assert!(transport.sent().is_empty());
    }
}
