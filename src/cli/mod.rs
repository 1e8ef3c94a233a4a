//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod console;
mod project;
mod run;

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

pub use console::Console;
pub use project::{init_project, ProjectAction};
pub use run::{apply_selection, validate_toolsfl_bin, Job, RunArgs, Selection};

pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "LVLMUNGE_LOG";

/// lvlmunge - Munge ToolsFL content projects into level files
#[derive(Parser)]
#[command(name = "lvlmunge")]
#[command(about = "lvlmunge - Munge ToolsFL content projects into level files")]
#[command(version)]
pub struct Cli {
    /// Log debug events to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Munge the project
    Munge(RunArgs),

    /// Clean the project's munged output
    Clean(RunArgs),

    /// Create or inspect munge.toml
    Project {
        /// Subcommand: init, show
        #[command(subcommand)]
        action: ProjectAction,
    },
}

/// Install the stderr log subscriber.
///
/// `LVLMUNGE_LOG` takes precedence over the verbosity default.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Main entry point for the CLI
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Munge(args) => run::run_job(&args, Job::Munge),
        Commands::Clean(args) => run::run_job(&args, Job::Clean),
        Commands::Project { action } => project::run_project(action),
    }
}
