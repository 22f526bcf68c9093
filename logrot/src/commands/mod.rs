//! Command orchestration for CLI subcommands.
//!
//! Provides execute functions for:
//! - `rotate` - One rotation pass
//! - `watch` - Rotation passes on an interval

pub mod rotate;
pub mod watch;

pub use rotate::execute_rotate;
pub use watch::{execute_watch, WatchResult};

use crate::cli::CliError;
use crate::io::RunLockError;
use crate::rotator::RotatorError;
use thiserror::Error;

/// Errors from command execution.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] CliError),

    #[error("{0}")]
    Rotator(#[from] RotatorError),

    #[error("{0}")]
    Lock(#[from] RunLockError),

    #[error("output error: {0}")]
    Output(#[from] serde_json::Error),
}

/// Result of command execution.
pub type CommandResult<T> = Result<T, CommandError>;
