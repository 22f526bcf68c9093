//! Watch command orchestration.
//!
//! Holds the run lock for the whole session and runs rotation passes one
//! after another, sleeping `interval_sec` between the end of a pass and the
//! start of the next. Stops on shutdown, after `max_passes`, or on the first
//! fatal pass error.

use logrot_clock::Clock;
use logrot_fs::{Codec, Filesystem};

use crate::cli::WatchArgs;
use crate::io::{lock_path_for, RunLock};
use crate::logger::Logger;
use crate::rotator::{RotationSummary, Rotator};
use crate::signal::ShutdownCheck;
use crate::sleeper::Sleeper;

use super::CommandResult;

/// Result of watch command execution.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WatchResult {
    /// Passes completed.
    pub passes: u64,
    /// Files rotated across all passes.
    pub rotated: usize,
    /// Per-file failures across all passes.
    pub failed: usize,
    /// True if the loop ended because shutdown was requested.
    pub interrupted: bool,
}

/// Execute the watch command.
///
/// `on_pass` is called with each pass's summary as soon as the pass ends.
#[allow(clippy::too_many_arguments)]
pub fn execute_watch<F, X, C, L, S, H, P>(
    args: &WatchArgs,
    fs: &F,
    codec: &X,
    clock: &C,
    logger: &L,
    sleeper: &S,
    shutdown: &H,
    mut on_pass: P,
) -> CommandResult<WatchResult>
where
    F: Filesystem,
    X: Codec,
    C: Clock,
    L: Logger,
    S: Sleeper,
    H: ShutdownCheck,
    P: FnMut(&RotationSummary) -> CommandResult<()>,
{
    args.validate()?;
    let config = args.rotation.to_config();

    let lock = RunLock::acquire(fs, clock, logger, lock_path_for(&config.audit_log))?;
    let rotator = Rotator::new(fs, codec, clock, logger);

    logger.verbose(&format!(
        "Watching {}: interval={}s, max_passes={}",
        config.source_dir.display(),
        args.interval_sec,
        args.max_passes
            .map(|n| n.to_string())
            .unwrap_or_else(|| "unlimited".to_string())
    ));

    let mut result = WatchResult::default();

    loop {
        if shutdown.should_stop() {
            result.interrupted = true;
            break;
        }

        lock.refresh(clock)?;
        let summary = rotator.run(&config)?;

        result.passes += 1;
        result.rotated += summary.rotated.len();
        result.failed += summary.failed.len();
        on_pass(&summary)?;

        if args.max_passes.is_some_and(|max| result.passes >= max) {
            break;
        }

        logger.verbose(&format!(
            "Pass {} done, next in {}s",
            result.passes, args.interval_sec
        ));
        if !sleep_unless_stopped(sleeper, shutdown, args.interval_sec) {
            result.interrupted = true;
            break;
        }
    }

    logger.verbose(&format!(
        "Watch stopped after {} passes: {} rotated, {} failed",
        result.passes, result.rotated, result.failed
    ));

    Ok(result)
}

/// Sleep one second at a time so Ctrl+C is honoured promptly.
/// Returns false if shutdown was requested before the full interval elapsed.
fn sleep_unless_stopped<S: Sleeper, H: ShutdownCheck>(
    sleeper: &S,
    shutdown: &H,
    seconds: u64,
) -> bool {
    for _ in 0..seconds {
        if shutdown.should_stop() {
            return false;
        }
        sleeper.sleep_sec(1);
    }
    true
}
