pub mod deep;
pub mod discover;
pub mod exec;
pub mod interrupt;
pub mod size;

pub use deep::{DeepRunner, command_line, repository_roots};
pub use discover::{DEFAULT_MARKER_PATTERN, discover};
pub use exec::{ExecutionResult, RunOptions, Runner, ShellRunner};
pub use size::{Symbols, directory_size, format_bytes};
