//! Ctrl+C handling for watch mode.
//!
//! The watch loop polls `ShutdownCheck::should_stop` between passes and while
//! sleeping, so a SIGINT ends it after the current pass completes.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Trait for checking shutdown status.
pub trait ShutdownCheck: Send + Sync {
    /// Returns true if shutdown has been requested.
    fn should_stop(&self) -> bool;
}

/// Flag set by the Ctrl+C handler.
#[derive(Debug, Clone)]
pub struct ShutdownFlag {
    flag: Arc<AtomicBool>,
}

impl Default for ShutdownFlag {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownFlag {
    /// Create a flag and register it as the SIGINT handler.
    ///
    /// Registration can fail if a handler is already installed; the flag is
    /// still usable through `trigger`.
    pub fn new() -> Self {
        let flag = Arc::new(AtomicBool::new(false));
        let handler_flag = Arc::clone(&flag);

        let _ = ctrlc::set_handler(move || {
            handler_flag.store(true, Ordering::SeqCst);
        });

        Self { flag }
    }

    /// Create a flag without registering a handler.
    pub fn manual() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request shutdown.
    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }
}

impl ShutdownCheck for ShutdownFlag {
    fn should_stop(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Never requests shutdown.
#[derive(Debug, Default, Clone, Copy)]
pub struct NeverShutdown;

impl ShutdownCheck for NeverShutdown {
    fn should_stop(&self) -> bool {
        false
    }
}

/// Requests shutdown after `should_stop` has answered `false` a fixed number
/// of times. Lets tests interrupt a watch loop mid-sleep.
#[derive(Debug, Clone)]
pub struct ShutdownAfter {
    remaining: Arc<AtomicU64>,
}

impl ShutdownAfter {
    pub fn new(checks: u64) -> Self {
        Self {
            remaining: Arc::new(AtomicU64::new(checks)),
        }
    }
}

impl ShutdownCheck for ShutdownAfter {
    fn should_stop(&self) -> bool {
        self.remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_err()
    }
}
