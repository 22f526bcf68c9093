//! Sleep abstraction for the watch loop.
//!
//! Lets watch mode be tested without real delays.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Trait for sleeping between rotation passes.
pub trait Sleeper: Send + Sync {
    /// Sleep for the specified number of seconds.
    fn sleep_sec(&self, seconds: u64);
}

/// Real sleeper that uses `std::thread::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealSleeper;

impl RealSleeper {
    pub fn new() -> Self {
        Self
    }
}

impl Sleeper for RealSleeper {
    fn sleep_sec(&self, seconds: u64) {
        std::thread::sleep(Duration::from_secs(seconds));
    }
}

/// Mock sleeper that returns immediately and tallies requested seconds.
/// Clones share the tally.
#[derive(Debug, Default, Clone)]
pub struct MockSleeper {
    slept: Arc<AtomicU64>,
}

impl MockSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total seconds requested so far.
    pub fn total_slept(&self) -> u64 {
        self.slept.load(Ordering::SeqCst)
    }
}

impl Sleeper for MockSleeper {
    fn sleep_sec(&self, seconds: u64) {
        self.slept.fetch_add(seconds, Ordering::SeqCst);
    }
}
