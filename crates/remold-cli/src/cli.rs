//! CLI argument definitions for the `remold` migration tool.

use std::path::PathBuf;

use clap::Parser;

/// Command-line interface for the batch DOM-struct migration tool.
#[derive(Parser, Debug)]
#[command(name = "remold", version, about = "Migrates DOM-object modules to the magic wrapper taxonomy")]
pub(crate) struct Cli {
    /// Files or directories to migrate. Directories are walked for `.rs`
    /// files.
    #[arg(value_name = "PATH", required = true, num_args = 1..)]
    pub(crate) paths: Vec<PathBuf>,
    /// Analyses and reports without writing any file.
    #[arg(long)]
    pub(crate) dry_run: bool,
    /// Tracing filter expression; overrides the `REMOLD_LOG` environment
    /// variable.
    #[arg(long, value_name = "FILTER")]
    pub(crate) log_filter: Option<String>,
}
