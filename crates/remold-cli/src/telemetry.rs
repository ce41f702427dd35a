//! Structured telemetry initialisation for the CLI.

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

use crate::errors::AppError;

static TELEMETRY_GUARD: OnceCell<()> = OnceCell::new();

/// Environment variable consulted when `--log-filter` is not supplied.
const LOG_ENV_VAR: &str = "REMOLD_LOG";

/// Configures the global tracing subscriber when invoked for the first
/// time.
///
/// Repeated calls are idempotent: the first invocation installs the
/// global subscriber and later invocations leave it untouched, so tests
/// can call [`crate::run`] more than once in a process.
pub(crate) fn initialise(filter: Option<&str>) -> Result<(), AppError> {
    TELEMETRY_GUARD
        .get_or_try_init(|| install_subscriber(filter))
        .copied()
}

fn install_subscriber(filter: Option<&str>) -> Result<(), AppError> {
    let expression = match filter {
        Some(expr) => expr.to_owned(),
        None => std::env::var(LOG_ENV_VAR).unwrap_or_else(|_| "warn".to_owned()),
    };
    let filter =
        EnvFilter::try_new(&expression).map_err(|error| AppError::LogFilter(error.to_string()))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
