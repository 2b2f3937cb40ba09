//! Binary entrypoint for the `taskdeck` CLI.

use std::process::ExitCode;

fn main() -> ExitCode {
    // Backend selection and cassette recording come from TASKDECK_* variables.
    match taskdeck::run(std::env::args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
