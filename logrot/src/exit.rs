//! Exit codes for the logrot CLI.
//!
//! Per-file failures never change the exit code; they are in the audit log.

use crate::commands::CommandError;
use crate::io::RunLockError;
use crate::rotator::RotatorError;

/// Exit code constants.
pub mod codes {
    /// Successful execution.
    pub const SUCCESS: i32 = 0;
    /// Invalid arguments.
    pub const INVALID_ARGS: i32 = 1;
    /// Source or archive directory unusable.
    pub const DIRECTORY_ERROR: i32 = 2;
    /// Another run holds the lock.
    pub const ALREADY_RUNNING: i32 = 3;
    /// Other IO error in the command layer.
    pub const IO_ERROR: i32 = 4;
}

/// Map a CommandError to an exit code.
pub fn exit_code(error: &CommandError) -> i32 {
    match error {
        CommandError::InvalidArgument(_) => codes::INVALID_ARGS,
        CommandError::Rotator(RotatorError::InvalidThreshold) => codes::INVALID_ARGS,
        CommandError::Rotator(RotatorError::DirectoryAccess { .. }) => codes::DIRECTORY_ERROR,
        CommandError::Lock(RunLockError::AlreadyRunning { .. }) => codes::ALREADY_RUNNING,
        CommandError::Lock(RunLockError::Fs(_)) => codes::IO_ERROR,
        CommandError::Output(_) => codes::IO_ERROR,
    }
}
