//! Rotate command orchestration.
//!
//! Takes the run lock, runs a single rotation pass, releases the lock.

use logrot_clock::Clock;
use logrot_fs::{Codec, Filesystem};

use crate::cli::RotateArgs;
use crate::io::{lock_path_for, RunLock};
use crate::logger::Logger;
use crate::rotator::{RotationSummary, Rotator};

use super::CommandResult;

/// Execute the rotate command.
pub fn execute_rotate<F, X, C, L>(
    args: &RotateArgs,
    fs: &F,
    codec: &X,
    clock: &C,
    logger: &L,
) -> CommandResult<RotationSummary>
where
    F: Filesystem,
    X: Codec,
    C: Clock,
    L: Logger,
{
    args.validate()?;
    let config = args.rotation.to_config();

    let lock = RunLock::acquire(fs, clock, logger, lock_path_for(&config.audit_log))?;
    logger.debug(&format!("Acquired run lock {}", lock.path().display()));

    let summary = Rotator::new(fs, codec, clock, logger).run(&config)?;

    logger.verbose(&format!(
        "Pass complete: {} rotated, {} skipped, {} failed",
        summary.rotated.len(),
        summary.skipped.len(),
        summary.failed.len()
    ));

    Ok(summary)
}
