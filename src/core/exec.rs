use std::{
    io::{self, Write},
    process::{Command, ExitStatus, Stdio},
};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use super::interrupt;
use crate::error::DeepError;

/// Exit code and, in capture mode, the child's standard output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub code: i32,
    pub output: Option<String>,
}

impl ExecutionResult {
    #[must_use]
    pub const fn success(&self) -> bool {
        self.code == 0
    }
}

/// How a command line is run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Print `$ <line>` first and stream stdout live instead of capturing it.
    pub echo: bool,
    /// Turn a nonzero exit into [`DeepError::CommandFailed`].
    pub abort_on_failure: bool,
}

/// Executes shell command lines on behalf of the orchestrator.
pub trait Runner {
    /// Run `line` to completion.
    ///
    /// # Errors
    /// Returns an error if the command cannot be spawned, if it fails while
    /// `abort_on_failure` is set, or if the user interrupts it.
    fn run(&mut self, line: &str, opts: RunOptions) -> Result<ExecutionResult>;
}

/// Runs command lines through `sh -c`, blocking until the child exits.
///
/// Standard error is always inherited. There is no timeout: a hung child
/// hangs the caller.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShellRunner;

impl Runner for ShellRunner {
    fn run(&mut self, line: &str, opts: RunOptions) -> Result<ExecutionResult> {
        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(line)
            .stdin(Stdio::inherit())
            .stderr(Stdio::inherit());

        // Echo mode streams to the terminal; otherwise capture stdout
        let result = if opts.echo {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "$ {line}")?;
            stdout.flush()?;
            drop(stdout);

            let status = cmd
                .stdout(Stdio::inherit())
                .status()
                .with_context(|| format!("failed to spawn: {line}"))?;
            ExecutionResult {
                code: exit_code(status)?,
                output: None,
            }
        } else {
            let out = cmd
                .stdout(Stdio::piped())
                .output()
                .with_context(|| format!("failed to spawn: {line}"))?;
            let text = String::from_utf8_lossy(&out.stdout).into_owned();
            ExecutionResult {
                code: exit_code(out.status)?,
                output: (!text.is_empty()).then_some(text),
            }
        };

        debug!(code = result.code, "finished: {line}");
        // Ctrl-C during the child takes precedence over its exit code
        interrupt::check()?;

        if opts.abort_on_failure && !result.success() {
            warn!(code = result.code, "command failed: {line}");
            return Err(DeepError::CommandFailed {
                command: line.to_string(),
                code: result.code,
            }
            .into());
        }
        Ok(result)
    }
}

/// Map an exit status to an integer code, using `128 + signal` for children
/// killed by a signal. A child killed by SIGINT ends the run as interrupted.
fn exit_code(status: ExitStatus) -> Result<i32> {
    if let Some(code) = status.code() {
        return Ok(code);
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(sig) = status.signal() {
            if sig == nix::libc::SIGINT {
                return Err(DeepError::Interrupted.into());
            }
            return Ok(128 + sig);
        }
    }
    Ok(1)
}
