use std::path::PathBuf;

use clap::Parser;

use crate::app::context::RunConfig;

/// gitdeep command-line interface
#[derive(Parser, Debug, Clone)]
#[command(
    name = "gitdeep",
    version,
    about = "Run a git subcommand in every repository below the current directory",
    long_about = None
)]
pub struct Cli {
    /// Enable debug logging. `RUST_LOG` overrides this.
    #[arg(long)]
    pub debug: bool,

    /// Do not print the path and size banner before each repository
    #[arg(short, long)]
    pub quiet: bool,

    /// Also write logs to a daily-rolling gitdeep.log in this directory
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// git subcommand to run in each repository
    #[arg(value_name = "CMD")]
    pub cmd: String,

    /// Arguments forwarded to the git subcommand
    #[arg(value_name = "ARGS", trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

impl Cli {
    /// Per-run settings; `banner` is the configured default for the banner.
    #[must_use]
    pub fn run_config(&self, banner: bool) -> RunConfig {
        RunConfig {
            verbose: banner && !self.quiet,
            debug: self.debug,
            cmd: self.cmd.clone(),
            args: self.args.clone(),
        }
    }
}
