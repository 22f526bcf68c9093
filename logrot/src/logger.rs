//! Console logging for logrot.
//!
//! The audit log is the durable record of a pass; this trait carries the
//! human-facing console output (audit echo, warnings, `-v` detail) so it can be
//! captured in tests without global state.

use std::io::Write;
use std::sync::{Arc, RwLock};

/// Verbosity level for console output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// Audit entries and warnings (always shown)
    Normal,
    /// Configuration and pass boundaries (-v)
    Verbose,
    /// Per-entry decisions, including ignored files (-vv)
    Debug,
}

impl Verbosity {
    /// Create verbosity from CLI flag count.
    pub fn from_count(count: u8) -> Self {
        match count {
            0 => Verbosity::Normal,
            1 => Verbosity::Verbose,
            _ => Verbosity::Debug,
        }
    }
}

/// Trait for console output.
pub trait Logger: Send + Sync {
    /// Log a message at the given verbosity level.
    fn log(&self, level: Verbosity, message: &str);

    /// Log at normal level (always visible).
    fn info(&self, message: &str) {
        self.log(Verbosity::Normal, message);
    }

    /// Log a problem that does not stop the pass.
    fn warn(&self, message: &str) {
        self.log(Verbosity::Normal, &format!("warning: {}", message));
    }

    /// Log at verbose level (requires -v).
    fn verbose(&self, message: &str) {
        self.log(Verbosity::Verbose, message);
    }

    /// Log at debug level (requires -vv).
    fn debug(&self, message: &str) {
        self.log(Verbosity::Debug, message);
    }
}

/// Logger that writes to stderr, keeping stdout free for `--json`.
#[derive(Debug)]
pub struct StderrLogger {
    level: Verbosity,
}

impl StderrLogger {
    /// Create a new stderr logger with the given verbosity level.
    pub fn new(level: Verbosity) -> Self {
        Self { level }
    }

    /// Create a logger from the `-v` count.
    pub fn from_count(count: u8) -> Self {
        Self::new(Verbosity::from_count(count))
    }
}

impl Logger for StderrLogger {
    fn log(&self, level: Verbosity, message: &str) {
        if level <= self.level {
            let _ = writeln!(std::io::stderr(), "{}", message);
        }
    }
}

/// A captured log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: Verbosity,
    pub message: String,
}

/// Mock logger for testing that captures all messages.
#[derive(Debug, Clone, Default)]
pub struct MockLogger {
    messages: Arc<RwLock<Vec<LogEntry>>>,
}

impl MockLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all captured log entries.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.messages.read().unwrap().clone()
    }

    /// Get all captured messages (just the text).
    pub fn messages(&self) -> Vec<String> {
        self.entries().into_iter().map(|e| e.message).collect()
    }

    /// Get messages at a specific level.
    pub fn messages_at_level(&self, level: Verbosity) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|e| e.level == level)
            .map(|e| e.message)
            .collect()
    }

    /// Check if any message contains the given substring.
    pub fn contains(&self, substring: &str) -> bool {
        self.messages().iter().any(|m| m.contains(substring))
    }
}

impl Logger for MockLogger {
    fn log(&self, level: Verbosity, message: &str) {
        // Captured regardless of level so tests see what would be printed at -vv.
        self.messages.write().unwrap().push(LogEntry {
            level,
            message: message.to_string(),
        });
    }
}

/// A no-op logger that discards all messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn log(&self, _level: Verbosity, _message: &str) {}
}
