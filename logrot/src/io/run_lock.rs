//! Run-in-progress guard.
//!
//! A lock file next to the audit log (`<audit-log>.lock`) keeps two logrot
//! processes from rotating the same setup at once. It records the owner's pid
//! and the time it was last refreshed. A lock is taken over when its owner is
//! gone: either procfs shows no such pid, or it was not refreshed within
//! `LOCK_STALE_AFTER_SECS`.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use logrot_clock::Clock;
use logrot_fs::{Filesystem, FsError};
use thiserror::Error;

use crate::logger::Logger;

/// Present only where procfs is mounted.
const PROC_SELF: &str = "/proc/self";

/// Age after which an existing lock is considered abandoned.
pub const LOCK_STALE_AFTER_SECS: u64 = 2 * 3600;

/// Errors from acquiring or maintaining the run lock.
#[derive(Debug, Error)]
pub enum RunLockError {
    #[error("another logrot run holds {path} (pid {pid})")]
    AlreadyRunning { path: PathBuf, pid: String },

    #[error("lock file error: {0}")]
    Fs(#[from] FsError),
}

/// Lock file path used for a given audit log.
pub fn lock_path_for(audit_log: &Path) -> PathBuf {
    let mut raw: OsString = audit_log.as_os_str().to_owned();
    raw.push(".lock");
    PathBuf::from(raw)
}

fn lock_contents(pid: u32, ts_unix: u64) -> String {
    format!("pid={}\nts={}\n", pid, ts_unix)
}

/// Owner information parsed from a lock file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LockInfo {
    pub pid: Option<String>,
    pub ts_unix: Option<u64>,
}

/// Parse `key=value` lines; unknown keys are ignored.
pub fn parse_lock(contents: &str) -> LockInfo {
    let mut info = LockInfo::default();
    for line in contents.lines() {
        match line.split_once('=') {
            Some(("pid", v)) => info.pid = Some(v.trim().to_string()),
            Some(("ts", v)) => info.ts_unix = v.trim().parse().ok(),
            _ => {}
        }
    }
    info
}

/// A lock without a readable timestamp, or one older than the staleness
/// window, is stale.
pub fn is_stale(info: &LockInfo, now_unix: u64) -> bool {
    match info.ts_unix {
        Some(ts) => now_unix.saturating_sub(ts) > LOCK_STALE_AFTER_SECS,
        None => true,
    }
}

/// True if procfs is available and has no entry for the recorded pid.
/// Without procfs, or without a numeric pid, liveness is unknown.
pub fn owner_is_dead<F: Filesystem>(fs: &F, info: &LockInfo) -> bool {
    let pid = match info.pid.as_deref().and_then(|p| p.parse::<u32>().ok()) {
        Some(pid) => pid,
        None => return false,
    };
    fs.exists(Path::new(PROC_SELF)) && !fs.exists(&Path::new("/proc").join(pid.to_string()))
}

/// Held run lock. Removed from disk when dropped.
pub struct RunLock<'a, F: Filesystem, L: Logger> {
    fs: &'a F,
    logger: &'a L,
    path: PathBuf,
}

impl<'a, F: Filesystem, L: Logger> RunLock<'a, F, L> {
    /// Acquire the lock at `path`, replacing one whose owner is gone.
    pub fn acquire<C: Clock>(
        fs: &'a F,
        clock: &C,
        logger: &'a L,
        path: PathBuf,
    ) -> Result<Self, RunLockError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs.create_dir_all(parent)?;
            }
        }

        let now = clock.now_unix_sec();
        let contents = lock_contents(std::process::id(), now);

        match fs.create_new(&path, contents.as_bytes()) {
            Ok(()) => return Ok(Self { fs, logger, path }),
            Err(e) if e.is_already_exists() => {}
            Err(e) => return Err(e.into()),
        }

        // Unreadable contents count as stale, same as a missing timestamp.
        let existing = parse_lock(&fs.read_file(&path).unwrap_or_default());
        if !is_stale(&existing, now) && !owner_is_dead(fs, &existing) {
            return Err(RunLockError::AlreadyRunning {
                pid: existing.pid.unwrap_or_else(|| "unknown".to_string()),
                path,
            });
        }

        logger.warn(&format!(
            "replacing abandoned run lock {} (pid {})",
            path.display(),
            existing.pid.as_deref().unwrap_or("unknown")
        ));
        fs.remove(&path)?;
        match fs.create_new(&path, contents.as_bytes()) {
            Ok(()) => Ok(Self { fs, logger, path }),
            Err(e) if e.is_already_exists() => Err(RunLockError::AlreadyRunning {
                path,
                pid: "unknown".to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Rewrite the timestamp so long-running watchers stay fresh.
    pub fn refresh<C: Clock>(&self, clock: &C) -> Result<(), RunLockError> {
        let contents = lock_contents(std::process::id(), clock.now_unix_sec());
        self.fs.write_atomic(&self.path, contents.as_bytes())?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<F: Filesystem, L: Logger> std::fmt::Debug for RunLock<'_, F, L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunLock").field("path", &self.path).finish()
    }
}

impl<F: Filesystem, L: Logger> Drop for RunLock<'_, F, L> {
    fn drop(&mut self) {
        if let Err(e) = self.fs.remove(&self.path) {
            self.logger.warn(&format!(
                "failed to remove run lock {}: {}",
                self.path.display(),
                e
            ));
        }
    }
}
