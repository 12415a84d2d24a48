use std::process::ExitCode;

use clap::Parser;
use gitdeep::cli::Cli;
use gitdeep::error::DeepError;
use gitdeep::logging::init::{flush_logs, init_tracing, init_tracing_with_file};
use gitdeep::run;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let logging = match &cli.log_dir {
        Some(dir) => init_tracing_with_file(dir, cli.debug),
        None => init_tracing(cli.debug),
    };
    if let Err(e) = logging {
        eprintln!("error: {e:#}");
        return ExitCode::FAILURE;
    }

    let code = match run(&cli) {
        Ok(count) => {
            tracing::debug!("processed {count} repositories");
            0
        }
        Err(e) => report(&e),
    };

    // Flush file logs before exiting with a custom status
    flush_logs();
    u8::try_from(code).map_or(ExitCode::FAILURE, ExitCode::from)
}

/// Print the failure and pick the process exit status.
fn report(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<DeepError>() {
        Some(e @ DeepError::Interrupted) => {
            eprintln!("{e}");
            e.exit_code()
        }
        Some(e) => {
            eprintln!("error: {e}");
            e.exit_code()
        }
        None => {
            eprintln!("error: {err:#}");
            1
        }
    }
}
