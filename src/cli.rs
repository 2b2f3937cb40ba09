//! CLI argument definitions.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::dashboard::DashboardFilter;
use crate::task::{Priority, TaskId, TaskStatus};

/// Top-level CLI parser for `taskdeck`.
#[derive(Debug, Parser)]
#[command(name = "taskdeck", version, about = "Task dashboard for the terminal")]
pub struct Cli {
    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and remember the session.
    Login {
        /// Account email.
        email: String,
        /// Account password.
        password: String,
    },
    /// Create an account. Log in separately afterwards.
    Register {
        /// Display name.
        name: String,
        /// Account email.
        email: String,
        /// Password, at least six characters.
        password: String,
        /// Password again; defaults to `password`.
        #[arg(long)]
        confirm: Option<String>,
    },
    /// Forget the stored session.
    Logout,
    /// Show the logged-in user.
    Whoami {
        /// Re-read the profile from the backend.
        #[arg(long)]
        refresh: bool,
    },
    /// Check that the backend answers.
    Health,
    /// Restore the demo dataset to its seed.
    Reset,
    /// Work with tasks.
    #[command(subcommand)]
    Tasks(TaskCommand),
}

/// `taskdeck tasks ...` subcommands.
#[derive(Debug, Subcommand)]
pub enum TaskCommand {
    /// List tasks.
    List {
        /// Which tasks to show.
        #[arg(long, default_value_t = DashboardFilter::All)]
        filter: DashboardFilter,
    },
    /// Show one task in full.
    Show {
        /// Task id.
        id: TaskId,
    },
    /// Create a task.
    Add(AddArgs),
    /// Change fields of a task.
    Edit(EditArgs),
    /// Mark a task done.
    Done {
        /// Task id.
        id: TaskId,
    },
    /// Move a task back to to-do.
    Pending {
        /// Task id.
        id: TaskId,
    },
    /// Delete a task.
    Rm {
        /// Task id.
        id: TaskId,
    },
    /// Search titles and descriptions.
    Search {
        /// Text to look for; case is ignored.
        query: String,
        /// Narrow results further.
        #[arg(long, default_value_t = DashboardFilter::All)]
        filter: DashboardFilter,
    },
    /// Show per-filter counts.
    Stats,
}

/// Arguments of `tasks add`.
#[derive(Debug, Args)]
pub struct AddArgs {
    /// Task title.
    pub title: String,
    /// Longer description.
    #[arg(long)]
    pub description: Option<String>,
    /// low, medium, high, urgent, or 1-4.
    #[arg(long, default_value_t = Priority::Medium)]
    pub priority: Priority,
    /// Due date (YYYY-MM-DD); defaults to today.
    #[arg(long)]
    pub due: Option<NaiveDate>,
}

/// Arguments of `tasks edit`.
#[derive(Debug, Args)]
pub struct EditArgs {
    /// Task id.
    pub id: TaskId,
    /// New title.
    #[arg(long)]
    pub title: Option<String>,
    /// New description.
    #[arg(long)]
    pub description: Option<String>,
    /// New status: todo, in-progress, done.
    #[arg(long)]
    pub status: Option<TaskStatus>,
    /// New priority.
    #[arg(long)]
    pub priority: Option<Priority>,
    /// New due date (YYYY-MM-DD).
    #[arg(long)]
    pub due: Option<NaiveDate>,
}
