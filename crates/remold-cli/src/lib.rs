//! Command-line runtime for the `remold` batch migration tool.
//!
//! The runtime owns argument parsing, telemetry bootstrapping, path
//! traversal, and the atomic per-file commit protocol. It is designed to
//! be exercised both from the binary entrypoint and from tests where the
//! IO streams can be substituted.
//!
//! Every file is processed independently: the migration pipeline either
//! produces a complete rewritten text, which is committed by renaming a
//! temporary file over the original, or fails, in which case the
//! original is left byte-for-byte untouched and the run exits with a
//! failure status once the remaining files have been processed.

use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use remold_rewrite::{ReviewFlag, migrate_source};
use tempfile::NamedTempFile;
use walkdir::WalkDir;

mod cli;
mod errors;
mod telemetry;

use cli::Cli;
use errors::AppError;

/// Parses arguments and runs the migration over the requested paths.
///
/// Writes the run summary to `stdout` and per-location review flags,
/// per-file errors, and telemetry to `stderr`. Returns a failure exit
/// code when any file could not be migrated; review flags alone do not
/// fail the run.
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator,
    I::Item: Into<OsString> + Clone,
    W: Write,
    E: Write,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => return report_usage(&error, stdout, stderr),
    };
    if let Err(error) = telemetry::initialise(cli.log_filter.as_deref()) {
        let _ = writeln!(stderr, "remold: {error}");
        return ExitCode::FAILURE;
    }

    let targets = match collect_targets(&cli.paths) {
        Ok(targets) => targets,
        Err(error) => {
            let _ = writeln!(stderr, "remold: {error}");
            return ExitCode::FAILURE;
        }
    };

    let mut failed = false;
    let mut migrated = 0usize;
    let mut flagged = 0usize;
    for path in &targets {
        match process_file(path, cli.dry_run) {
            Ok(report) => {
                if report.changed {
                    migrated += 1;
                    if cli.dry_run {
                        let _ = writeln!(stdout, "would migrate {}", path.display());
                    }
                }
                flagged += report.flags.len();
                for flag in &report.flags {
                    let _ = writeln!(
                        stderr,
                        "{}:{}: {} {}",
                        path.display(),
                        flag.line,
                        flag.field,
                        flag.message
                    );
                }
            }
            Err(error) => {
                failed = true;
                let _ = writeln!(stderr, "remold: {error}");
            }
        }
    }
    let _ = writeln!(
        stdout,
        "migrated {migrated} of {} files ({flagged} flagged)",
        targets.len()
    );
    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Renders a clap error to the stream it belongs on.
fn report_usage<W: Write, E: Write>(
    error: &clap::Error,
    stdout: &mut W,
    stderr: &mut E,
) -> ExitCode {
    let rendered = error.render();
    if error.use_stderr() {
        let _ = write!(stderr, "{rendered}");
        ExitCode::FAILURE
    } else {
        // Help and version output belong on stdout and exit cleanly.
        let _ = write!(stdout, "{rendered}");
        ExitCode::SUCCESS
    }
}

/// Expands the requested paths into the ordered list of files to migrate.
///
/// Directories are walked recursively in file-name order; only `.rs`
/// files are taken. Explicitly named files are taken as-is.
fn collect_targets(paths: &[PathBuf]) -> Result<Vec<PathBuf>, AppError> {
    let mut targets = Vec::new();
    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path).sort_by_file_name() {
                let entry = entry.map_err(|source| AppError::Traverse {
                    path: path.clone(),
                    source,
                })?;
                if entry.file_type().is_file()
                    && entry.path().extension().is_some_and(|ext| ext == "rs")
                {
                    targets.push(entry.into_path());
                }
            }
        } else if path.is_file() {
            targets.push(path.clone());
        } else {
            return Err(AppError::UnsupportedPath { path: path.clone() });
        }
    }
    Ok(targets)
}

/// Outcome of migrating one file.
struct FileReport {
    changed: bool,
    flags: Vec<ReviewFlag>,
}

/// Migrates one file, committing the result atomically unless dry-run.
fn process_file(path: &Path, dry_run: bool) -> Result<FileReport, AppError> {
    let source = fs::read_to_string(path).map_err(|source| AppError::ReadSource {
        path: path.to_owned(),
        source,
    })?;
    let migration = migrate_source(&source).map_err(|source| AppError::Migrate {
        path: path.to_owned(),
        source,
    })?;
    let changed = migration.changed(&source);
    if changed && !dry_run {
        write_atomic(path, &migration.output)?;
    }
    tracing::info!(
        path = %path.display(),
        changed,
        flags = migration.flags.len(),
        "processed file"
    );
    Ok(FileReport {
        changed,
        flags: migration.flags,
    })
}

/// Replaces `path` with `output` via a same-directory temporary file, so
/// the original is never observable in a half-written state.
fn write_atomic(path: &Path, output: &str) -> Result<(), AppError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let write_error = |source| AppError::WriteOutput {
        path: path.to_owned(),
        source,
    };
    let mut file = NamedTempFile::new_in(parent).map_err(write_error)?;
    file.write_all(output.as_bytes()).map_err(write_error)?;
    file.persist(path).map_err(|error| write_error(error.error))?;
    Ok(())
}
