use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};

use crate::error::DeepError;

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

extern "C" fn on_sigint(_: nix::libc::c_int) {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

/// Catch SIGINT so that Ctrl-C ends the run through the normal error path.
///
/// Child processes still receive the signal: handled signals are reset to
/// their default disposition across `exec`.
///
/// # Errors
/// Returns an error if the handler cannot be installed.
pub fn install() -> Result<()> {
    let action = SigAction::new(
        SigHandler::Handler(on_sigint),
        SaFlags::SA_RESTART,
        SigSet::empty(),
    );
    // SAFETY: the handler only stores into an atomic, which is async-signal-safe.
    unsafe { signal::sigaction(Signal::SIGINT, &action) }
        .context("failed to install SIGINT handler")?;
    Ok(())
}

/// Whether Ctrl-C has been pressed since the handler was installed.
#[must_use]
pub fn requested() -> bool {
    INTERRUPTED.load(Ordering::SeqCst)
}

/// Bail out with [`DeepError::Interrupted`] once Ctrl-C has been pressed.
///
/// # Errors
/// Returns `DeepError::Interrupted` if an interrupt is pending.
pub fn check() -> Result<()> {
    if requested() {
        return Err(DeepError::Interrupted.into());
    }
    Ok(())
}
