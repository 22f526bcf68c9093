//! Clock abstraction for logrot.
//!
//! Provides a trait for getting the current time, with both real and mock implementations
//! to enable deterministic testing, plus rendering of Unix timestamps in the
//! zone a rotation run is configured for.

use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{Local, TimeZone, Utc};

/// Format of the prefix written in front of every audit log entry.
pub const AUDIT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format of the timestamp embedded in archive file names.
pub const ARCHIVE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Trait for getting the current Unix timestamp.
pub trait Clock: Send + Sync {
    /// Returns the current time as Unix seconds since epoch.
    fn now_unix_sec(&self) -> u64;
}

/// Real system clock implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix_sec(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before Unix epoch")
            .as_secs()
    }
}

/// Mock clock for testing with a fixed timestamp.
#[derive(Debug, Clone, Copy)]
pub struct MockClock {
    timestamp: u64,
}

impl MockClock {
    /// Create a mock clock with a fixed timestamp.
    pub fn new(timestamp: u64) -> Self {
        Self { timestamp }
    }
}

impl Clock for MockClock {
    fn now_unix_sec(&self) -> u64 {
        self.timestamp
    }
}

/// Mock clock that auto-advances time on each call.
///
/// Useful for testing passes where consecutive rotations must land in
/// different seconds.
#[derive(Debug)]
pub struct AdvancingClock {
    timestamp: std::sync::atomic::AtomicU64,
    increment: u64,
}

impl AdvancingClock {
    /// Create an advancing clock starting at `timestamp` and incrementing by `increment` each call.
    pub fn new(timestamp: u64, increment: u64) -> Self {
        Self {
            timestamp: std::sync::atomic::AtomicU64::new(timestamp),
            increment,
        }
    }
}

impl Clock for AdvancingClock {
    fn now_unix_sec(&self) -> u64 {
        self.timestamp
            .fetch_add(self.increment, std::sync::atomic::Ordering::SeqCst)
    }
}

/// Time zone used when rendering timestamps for humans and file names.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    /// The host's local time zone.
    #[default]
    Local,
    /// Coordinated Universal Time.
    Utc,
}

/// Render a Unix timestamp with a `strftime`-style format in the given zone.
///
/// Timestamps chrono cannot represent fall back to the raw number of seconds.
pub fn format_unix(ts_unix: u64, zone: Zone, format: &str) -> String {
    let secs = match i64::try_from(ts_unix) {
        Ok(secs) => secs,
        Err(_) => return ts_unix.to_string(),
    };

    let rendered = match zone {
        Zone::Utc => Utc
            .timestamp_opt(secs, 0)
            .single()
            .map(|dt| dt.format(format).to_string()),
        Zone::Local => Local
            .timestamp_opt(secs, 0)
            .single()
            .map(|dt| dt.format(format).to_string()),
    };

    rendered.unwrap_or_else(|| ts_unix.to_string())
}

/// Render the `YYYY-MM-DD HH:MM:SS` audit prefix timestamp.
pub fn audit_timestamp(ts_unix: u64, zone: Zone) -> String {
    format_unix(ts_unix, zone, AUDIT_TIMESTAMP_FORMAT)
}

/// Render the `YYYYMMDD_HHMMSS` archive name timestamp.
pub fn archive_timestamp(ts_unix: u64, zone: Zone) -> String {
    format_unix(ts_unix, zone, ARCHIVE_TIMESTAMP_FORMAT)
}
