//! Command dispatch and handlers.

pub mod auth;
pub mod health;
pub mod tasks;

use std::future::Future;

use tracing::Level;

use crate::cli::Command;
use crate::config::Config;
use crate::context::AppContext;

/// Dispatch a parsed command to its handler.
///
/// Configuration comes from the environment (see [`Config::from_env`]).
/// When `TASKDECK_RECORD` is set, HTTP exchanges are written to that
/// cassette once the command finishes, whether it succeeded or not.
///
/// # Errors
///
/// Returns an error string if configuration is invalid or the selected
/// command handler fails.
pub fn dispatch(command: &Command) -> Result<(), String> {
    let config = Config::from_env().map_err(|e| e.to_string())?;
    init_logging(config.log_level);
    let ctx = AppContext::from_config(&config).map_err(|e| e.to_string())?;

    let result = block_on(dispatch_with_context(command, &ctx))?;

    // Dropping the context writes the cassette, if any.
    drop(ctx);
    result
}

/// Dispatch a command against an existing context.
///
/// Demo state is saved after every successful command so the next
/// invocation sees the same dataset.
///
/// # Errors
///
/// Returns an error string if the handler fails or demo state cannot be
/// saved.
pub async fn dispatch_with_context(command: &Command, ctx: &AppContext) -> Result<(), String> {
    match command {
        Command::Login { email, password } => auth::login(ctx, email, password).await?,
        Command::Register { name, email, password, confirm } => {
            auth::register(ctx, name, email, password, confirm.as_deref()).await?;
        }
        Command::Logout => auth::logout(ctx),
        Command::Whoami { refresh } => auth::whoami(ctx, *refresh).await?,
        Command::Health => health::run(ctx).await?,
        Command::Reset => reset(ctx)?,
        Command::Tasks(command) => tasks::run(ctx, command).await?,
    }
    ctx.save_demo_state().map_err(|e| e.to_string())
}

fn reset(ctx: &AppContext) -> Result<(), String> {
    if !ctx.is_demo() {
        return Err("reset is only available in demo mode".to_string());
    }
    ctx.reset_demo();
    println!("Demo data restored.");
    Ok(())
}

fn block_on<F: Future>(future: F) -> Result<F::Output, String> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to start async runtime: {e}"))?;
    Ok(runtime.block_on(future))
}

fn init_logging(level: Level) {
    // A second init (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
