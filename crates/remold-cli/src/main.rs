//! CLI entrypoint for the `remold` batch migration tool.
//!
//! The binary delegates to [`remold_cli::run`], which parses arguments,
//! initialises telemetry, and drives the per-file migration pipeline over
//! the requested paths.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    remold_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
