use std::fmt;

/// Exit status used when the run is interrupted with Ctrl-C.
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Failures that decide the process exit status.
///
/// These travel inside `anyhow::Error` and are recovered with
/// `downcast_ref` at the single exit point in `main`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeepError {
    /// An external command exited with a nonzero status.
    CommandFailed { command: String, code: i32 },
    /// The user pressed Ctrl-C while the run was in progress.
    Interrupted,
}

impl DeepError {
    /// Process exit status this error maps to.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::CommandFailed { code, .. } => *code,
            Self::Interrupted => INTERRUPTED_EXIT_CODE,
        }
    }
}

impl fmt::Display for DeepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CommandFailed { command, code } => {
                write!(f, "command failed with exit code {code}\n\t{command}")
            }
            Self::Interrupted => f.write_str("interrupted"),
        }
    }
}

impl std::error::Error for DeepError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes() {
        let failed = DeepError::CommandFailed {
            command: "git status".into(),
            code: 3,
        };
        assert_eq!(failed.exit_code(), 3);
        assert_eq!(DeepError::Interrupted.exit_code(), 130);
    }

    #[test]
    fn failure_message_names_command_and_code() {
        let failed = DeepError::CommandFailed {
            command: "cd '/tmp/x' && git pull".into(),
            code: 128,
        };
        let msg = failed.to_string();
        assert!(msg.contains("exit code 128"));
        assert!(msg.contains("git pull"));
    }

    #[test]
    fn survives_anyhow_round_trip() {
        let err = anyhow::Error::new(DeepError::Interrupted).context("while running");
        assert_eq!(
            err.downcast_ref::<DeepError>(),
            Some(&DeepError::Interrupted)
        );
    }
}
