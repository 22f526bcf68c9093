//! logrot: size-triggered log rotation.
//!
//! Scans a directory for `.log` files over a size threshold, compresses each
//! into a timestamped gzip archive, then empties the original in place so
//! writers holding it open keep working. Every action is recorded in an
//! append-only audit log.

pub mod cli;
pub mod commands;
pub mod exit;
pub mod io;
pub mod logger;
pub mod rotator;
pub mod signal;
pub mod sleeper;

pub use cli::{
    parse_from, parse_size, Cli, CliError, Command, RotateArgs, RotationArgs, WatchArgs,
    DEFAULT_ARCHIVE_DIR, DEFAULT_AUDIT_LOG, DEFAULT_INTERVAL_SEC, DEFAULT_MAX_SIZE,
    DEFAULT_SOURCE_DIR, MAX_INTERVAL_SEC,
};
pub use commands::{execute_rotate, execute_watch, CommandError, CommandResult, WatchResult};
pub use io::{AuditError, AuditLog, RunLock, RunLockError};
pub use logger::{Logger, MockLogger, NullLogger, StderrLogger, Verbosity};
pub use rotator::{
    FailedFile, FileError, FileOp, RotatedFile, RotationSummary, Rotator, RotatorConfig,
    RotatorError,
};
pub use signal::{NeverShutdown, ShutdownAfter, ShutdownCheck, ShutdownFlag};
pub use sleeper::{MockSleeper, RealSleeper, Sleeper};
