use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::{cli::Cli, config::DeepConfig};

/// Per-invocation settings for a deep run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Print a banner with path and size before each repository.
    pub verbose: bool,
    /// Diagnostic verbosity.
    pub debug: bool,
    /// Subcommand handed to the version-control tool.
    pub cmd: String,
    /// Extra arguments forwarded after `cmd`.
    pub args: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct AppContext {
    /// Directory the repository search starts from.
    pub root: PathBuf,
    pub cfg: DeepConfig,
    pub run: RunConfig,
}

impl AppContext {
    pub const fn new(root: PathBuf, cfg: DeepConfig, run: RunConfig) -> Self {
        Self { root, cfg, run }
    }

    /// Build the context for a CLI invocation: rooted at the current
    /// directory, with settings loaded from git config.
    ///
    /// # Errors
    /// Returns an error if the current directory is unavailable or the
    /// configuration is invalid.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let root = std::env::current_dir().context("failed to read current directory")?;
        let cfg = DeepConfig::load()?;
        let run = cli.run_config(cfg.banner);
        Ok(Self::new(root, cfg, run))
    }
}
