use std::{
    borrow::Cow,
    path::{Path, PathBuf},
};

use anyhow::Result;
use tracing::{debug, info, info_span, warn};

use super::{
    discover::discover,
    exec::{RunOptions, Runner},
    interrupt,
    size::{Symbols, directory_size, format_bytes},
};
use crate::{app::context::AppContext, error::DeepError};

/// Runs one version-control command in every repository below the context
/// root, stopping at the first failure.
pub struct DeepRunner<R> {
    runner: R,
}

impl<R: Runner> DeepRunner<R> {
    pub const fn new(runner: R) -> Self {
        Self { runner }
    }

    pub const fn runner(&self) -> &R {
        &self.runner
    }

    /// Discover repositories and run the configured command in each, in
    /// sorted order. Returns the number of repositories processed.
    ///
    /// Nothing is rolled back when a later repository fails.
    ///
    /// # Errors
    /// Returns `DeepError::CommandFailed` for the first repository whose
    /// command exits nonzero (later repositories are not touched), or
    /// `DeepError::Interrupted` on Ctrl-C.
    pub fn call(&mut self, ctx: &AppContext) -> Result<usize> {
        let pattern = ctx.cfg.marker_regex()?;
        let markers = discover(&ctx.root, &pattern)?;
        // Markers become their real parent directories
        let roots = repository_roots(&markers);
        info!("{} repositories under {}", roots.len(), ctx.root.display());

        let opts = RunOptions {
            echo: true,
            abort_on_failure: true,
        };

        for dir in &roots {
            interrupt::check()?;
            let _span = info_span!("repo", path = %dir.display()).entered();

            if ctx.run.verbose {
                print_banner(dir)?;
            }

            let line = command_line(dir, &ctx.cfg.program, &ctx.run.cmd, &ctx.run.args);
            let result = self.runner.run(&line, opts)?;
            // Blank line between repositories
            println!();

            if !result.success() {
                return Err(DeepError::CommandFailed {
                    command: line,
                    code: result.code,
                }
                .into());
            }
        }

        Ok(roots.len())
    }
}

/// Resolve each marker to its real path and take the containing directory.
/// Discovery order is kept; markers that cannot be resolved are skipped.
#[must_use]
pub fn repository_roots(markers: &[PathBuf]) -> Vec<PathBuf> {
    markers
        .iter()
        .filter_map(|marker| match marker.canonicalize() {
            Ok(real) => real.parent().map(Path::to_path_buf),
            Err(e) => {
                warn!("cannot resolve {}: {e}", marker.display());
                None
            }
        })
        .collect()
}

/// Build `cd <dir> && <program> <cmd> <args...>`, shell-quoting each word
/// that needs it.
#[must_use]
pub fn command_line(dir: &Path, program: &str, cmd: &str, args: &[String]) -> String {
    let mut words = vec![
        "cd".to_string(),
        quote(&dir.to_string_lossy()),
        "&&".to_string(),
        quote(program),
        quote(cmd),
    ];
    words.extend(args.iter().map(|a| quote(a)));
    words.join(" ")
}

fn quote(word: &str) -> String {
    shell_escape::unix::escape(Cow::Borrowed(word)).into_owned()
}

fn print_banner(dir: &Path) -> Result<()> {
    let name = dir
        .file_name()
        .map_or_else(|| dir.to_string_lossy(), |n| n.to_string_lossy());
    let bytes = directory_size(dir)?;
    debug!(bytes, "measured");

    println!("----- {name} -----");
    println!("path: {}", dir.display());
    println!("size: {}", format_bytes(bytes, Symbols::Short));
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{app::context::RunConfig, config::DeepConfig, core::exec::ExecutionResult};
    use std::{collections::VecDeque, fs};
    use tempfile::tempdir;

    /// Records command lines and replays scripted exit codes.
    #[derive(Default)]
    struct Recorder {
        lines: Vec<String>,
        codes: VecDeque<i32>,
    }

    impl Runner for Recorder {
        fn run(&mut self, line: &str, opts: RunOptions) -> Result<ExecutionResult> {
            self.lines.push(line.to_string());
            let code = self.codes.pop_front().unwrap_or(0);
            if opts.abort_on_failure && code != 0 {
                return Err(DeepError::CommandFailed {
                    command: line.to_string(),
                    code,
                }
                .into());
            }
            Ok(ExecutionResult { code, output: None })
        }
    }

    fn ctx(root: &Path, cmd: &str, args: &[&str]) -> AppContext {
        AppContext::new(
            root.to_path_buf(),
            DeepConfig::default(),
            RunConfig {
                verbose: false,
                debug: false,
                cmd: cmd.to_string(),
                args: args.iter().map(ToString::to_string).collect(),
            },
        )
    }

    fn three_repos() -> tempfile::TempDir {
        let td = tempdir().unwrap();
        for p in ["r1/.git", "r2/.git", "r3/.git"] {
            fs::create_dir_all(td.path().join(p)).unwrap();
        }
        td
    }

    #[test]
    fn builds_quoted_command_line() {
        let line = command_line(
            Path::new("/work/my repo"),
            "git",
            "commit",
            &["-m".to_string(), "two words".to_string()],
        );
        assert_eq!(line, "cd '/work/my repo' && git commit -m 'two words'");
    }

    #[test]
    fn plain_arguments_are_joined_by_spaces() {
        let line = command_line(
            Path::new("/src/a"),
            "git",
            "log",
            &["--oneline".to_string(), "-n".to_string(), "3".to_string()],
        );
        assert_eq!(line, "cd /src/a && git log --oneline -n 3");
    }

    #[test]
    fn runs_every_repository_in_order() {
        let td = tempdir().unwrap();
        fs::create_dir_all(td.path().join("proj-b/sub/.git")).unwrap();
        fs::create_dir_all(td.path().join("proj-a/.git")).unwrap();

        let mut deep = DeepRunner::new(Recorder::default());
        let n = deep.call(&ctx(td.path(), "status", &[])).unwrap();

        assert_eq!(n, 2);
        let lines = &deep.runner().lines;
        assert!(lines[0].contains("proj-a"));
        assert!(lines[0].ends_with("&& git status"));
        assert!(lines[1].contains("proj-b/sub"));
    }

    #[test]
    fn stops_at_first_failure() {
        let td = three_repos();
        let mut deep = DeepRunner::new(Recorder {
            codes: VecDeque::from([0, 5, 0]),
            ..Recorder::default()
        });

        let err = deep.call(&ctx(td.path(), "pull", &[])).unwrap_err();
        let lines = &deep.runner().lines;
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("r2"));
        assert_eq!(err.downcast_ref::<DeepError>().map(DeepError::exit_code), Some(5));
    }

    #[test]
    fn failure_in_first_repository_skips_the_rest() {
        let td = three_repos();
        let mut deep = DeepRunner::new(Recorder {
            codes: VecDeque::from([3]),
            ..Recorder::default()
        });

        let err = deep.call(&ctx(td.path(), "fetch", &[])).unwrap_err();
        assert_eq!(deep.runner().lines.len(), 1);
        assert_eq!(err.downcast_ref::<DeepError>().map(DeepError::exit_code), Some(3));
    }

    #[test]
    fn no_repositories_is_success() {
        let td = tempdir().unwrap();
        let mut deep = DeepRunner::new(Recorder::default());
        assert_eq!(deep.call(&ctx(td.path(), "status", &[])).unwrap(), 0);
        assert!(deep.runner().lines.is_empty());
    }

    #[test]
    fn roots_are_real_parent_directories() {
        let td = tempdir().unwrap();
        fs::create_dir_all(td.path().join("x/.git")).unwrap();
        let marker = td.path().join("x/./.git");

        let roots = repository_roots(&[marker]);
        assert_eq!(roots, vec![td.path().join("x").canonicalize().unwrap()]);
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_repository_runs_in_its_target() {
        let td = tempdir().unwrap();
        let real = td.path().join("real");
        fs::create_dir_all(real.join("inner/.git")).unwrap();
        std::os::unix::fs::symlink(real.join("inner/.git"), real.join(".git")).unwrap();

        let roots = repository_roots(&[td.path().join("real/.git")]);
        assert_eq!(roots, vec![real.join("inner").canonicalize().unwrap()]);
    }
}
