use std::{io, path::Path, sync::Mutex};

use anyhow::{Context, Result};

// Keeps the file appender's worker alive for the whole run
static FILE_APPENDER_GUARD: Mutex<Option<tracing_appender::non_blocking::WorkerGuard>> =
    Mutex::new(None);

/// Flush and close the log file appender, if any.
/// Must run before the process exits with a custom status.
pub fn flush_logs() {
    if let Ok(mut guard_holder) = FILE_APPENDER_GUARD.lock()
        && let Some(guard) = guard_holder.take()
    {
        drop(guard);
    }
}

fn base_filter(debug: bool) -> String {
    let base = if debug { "debug" } else { "warn" };
    std::env::var("RUST_LOG").unwrap_or_else(|_| base.to_string())
}

/// Initialize tracing on stderr. `RUST_LOG` (if set) takes precedence;
/// otherwise `--debug` selects "debug" and the default is "warn".
///
/// Stdout is left to git and the per-repository banner.
///
/// # Errors
/// Returns an error if the filter expression is invalid.
pub fn init_tracing(debug: bool) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter_layer =
        EnvFilter::try_new(base_filter(debug)).context("invalid RUST_LOG / filter")?;
    let fmt_layer = fmt::layer().with_target(false).with_writer(io::stderr);

    // Allow re-init to be a no-op in tests
    let _ = tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init();

    Ok(())
}

/// Initialize tracing on stderr plus a daily-rolling `gitdeep.log` in `log_dir`.
///
/// # Errors
/// Returns an error if the filter is invalid or `log_dir` cannot be created.
pub fn init_tracing_with_file(log_dir: &Path, debug: bool) -> Result<()> {
    use tracing_appender::rolling;
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter_layer =
        EnvFilter::try_new(base_filter(debug)).context("invalid RUST_LOG / filter")?;

    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;
    let file_appender = rolling::daily(log_dir, "gitdeep.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    if let Ok(mut guard_holder) = FILE_APPENDER_GUARD.lock() {
        *guard_holder = Some(guard);
    }

    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_writer(non_blocking);
    let console_layer = fmt::layer().with_target(false).with_writer(io::stderr);

    let _ = tracing_subscriber::registry()
        .with(filter_layer)
        .with(file_layer)
        .with(console_layer)
        .try_init();

    Ok(())
}
