pub mod app;
pub mod argspec;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod logging;

use anyhow::Result;
use tracing::debug;

use app::context::AppContext;
use crate::core::{DeepRunner, ShellRunner, interrupt};

/// Entry point for the CLI: run the requested git subcommand in every
/// repository below the current directory.
///
/// Returns the number of repositories processed.
///
/// # Errors
/// Returns `error::DeepError` for a failing repository command or Ctrl-C,
/// or a plain error if setup fails.
pub fn run(cli: &cli::Cli) -> Result<usize> {
    // Ctrl-C must be caught before any child is spawned
    interrupt::install()?;

    let ctx = AppContext::from_cli(cli)?;
    debug!(
        root = %ctx.root.display(),
        program = %ctx.cfg.program,
        pattern = %ctx.cfg.marker_pattern,
        "starting deep run"
    );

    DeepRunner::new(ShellRunner).call(&ctx)
}
