//! Durable side files of a rotation run.
//!
//! Provides:
//! - The append-only audit log
//! - The run lock guarding against overlapping runs

pub mod audit_log;
pub mod run_lock;

pub use audit_log::{format_entry, AuditError, AuditLog};
pub use run_lock::{lock_path_for, RunLock, RunLockError, LOCK_STALE_AFTER_SECS};
