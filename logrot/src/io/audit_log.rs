//! Append-only audit log.
//!
//! One line per action, each prefixed with `[YYYY-MM-DD HH:MM:SS] `:
//! - Never rewritten or truncated, only appended to
//! - Every entry is echoed to the console logger
//! - A failed append is reported on the console and does not stop the pass

use std::path::PathBuf;

use logrot_clock::{audit_timestamp, Clock, Zone};
use logrot_fs::{Filesystem, FsError};
use thiserror::Error;

use crate::logger::Logger;

/// Errors from audit log writing.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("failed to append to audit log {path}: {source}")]
    Append {
        path: PathBuf,
        #[source]
        source: FsError,
    },
}

/// Format one audit line, including the trailing newline.
pub fn format_entry(timestamp: &str, message: &str) -> String {
    format!("[{}] {}\n", timestamp, message)
}

/// Writer for the audit log of a rotation pass.
pub struct AuditLog<'a, F, C, L> {
    fs: &'a F,
    clock: &'a C,
    logger: &'a L,
    path: PathBuf,
    zone: Zone,
}

impl<'a, F, C, L> AuditLog<'a, F, C, L>
where
    F: Filesystem,
    C: Clock,
    L: Logger,
{
    /// Create a new audit log writer.
    pub fn new(fs: &'a F, clock: &'a C, logger: &'a L, path: PathBuf, zone: Zone) -> Self {
        Self {
            fs,
            clock,
            logger,
            path,
            zone,
        }
    }

    /// Append one entry, echoing it to the console first.
    pub fn append(&self, message: &str) -> Result<(), AuditError> {
        let stamp = audit_timestamp(self.clock.now_unix_sec(), self.zone);
        let line = format_entry(&stamp, message);

        self.logger.info(line.trim_end());

        self.fs
            .append(&self.path, line.as_bytes())
            .map_err(|source| AuditError::Append {
                path: self.path.clone(),
                source,
            })
    }

    /// Append one entry, reporting a failed write on the console.
    pub fn record(&self, message: &str) {
        if let Err(e) = self.append(message) {
            self.logger.warn(&e.to_string());
        }
    }
}
