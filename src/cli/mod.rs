//! CLI module
//!
//! Provides:
//! - Argument parsing (clap derive)
//! - Command dispatch (chat, ask, show, files, merge)
//! - The interactive chat loop
//! - Tracing setup

pub mod args;
pub mod commands;
pub mod logging;
pub mod repl;

// Re-exports
pub use args::{Cli, Command};
pub use commands::{format_rows, load_config, run};
pub use logging::{load_config_logged, log_filter, subscriber, BOOTSTRAP_LEVEL};
pub use repl::{format_history, parse_input, ReplCommand};

use marketlens_core::{DatasetError, MergeError};

/// Exit codes (deterministic)
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_DATA_ERROR: i32 = 2;

/// Map a top-level failure to a process exit code
pub fn exit_code(err: &anyhow::Error) -> i32 {
    let missing_source = err.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<DatasetError>(),
            Some(DatasetError::MissingSource(_))
        ) || matches!(
            cause.downcast_ref::<MergeError>(),
            Some(MergeError::MissingSource(_))
        )
    });

    if missing_source {
        EXIT_DATA_ERROR
    } else {
        EXIT_FAILURE
    }
}
