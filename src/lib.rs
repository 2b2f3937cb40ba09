//! Core library entry for the `taskdeck` task dashboard client.
//!
//! The library holds the task and session model, the two repository
//! strategies (in-memory demo data and the remote API), the session-aware
//! HTTP gateway, and the CLI that drives them.

pub mod adapters;
pub mod cassette;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod dashboard;
pub mod error;
pub mod events;
pub mod gateway;
pub mod ports;
pub mod session;
pub mod task;
pub mod validate;

pub use error::{Error, Result};

use clap::Parser;

/// Run the CLI with the provided arguments.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or command execution fails.
pub fn run<I, T>(args: I) -> std::result::Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = cli::Cli::try_parse_from(args).map_err(|err| err.to_string())?;
    commands::dispatch(&cli.command)
}
