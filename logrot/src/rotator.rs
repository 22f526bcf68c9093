//! Core rotation pass.
//!
//! Scans the source directory once, and for every `.log` file larger than the
//! threshold streams it into a gzip archive, then empties it in place. A file
//! is only ever truncated after its archive was completely written and
//! flushed. Failures scoped to one file are audited and the pass moves on;
//! only an inaccessible source or archive directory aborts the pass.

use std::fmt;
use std::path::{Path, PathBuf};

use logrot_clock::{archive_timestamp, Clock, Zone};
use logrot_fs::{
    base_name, create_archive, is_log_file_name, Codec, CodecError, DirEntry, Filesystem, FsError,
    NewArchive,
};
use serde::Serialize;
use thiserror::Error;

use crate::io::AuditLog;
use crate::logger::Logger;

/// Configuration for one rotation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotatorConfig {
    /// Directory scanned for candidate files.
    pub source_dir: PathBuf,
    /// Directory receiving archives.
    pub archive_dir: PathBuf,
    /// Files strictly larger than this many bytes are rotated.
    pub max_size: u64,
    /// Audit log path.
    pub audit_log: PathBuf,
    /// Zone for archive names and audit prefixes.
    pub zone: Zone,
}

impl RotatorConfig {
    /// Create a config using local time.
    pub fn new(source_dir: PathBuf, archive_dir: PathBuf, max_size: u64, audit_log: PathBuf) -> Self {
        Self {
            source_dir,
            archive_dir,
            max_size,
            audit_log,
            zone: Zone::Local,
        }
    }

    /// Builder: set the timestamp zone.
    pub fn with_zone(mut self, zone: Zone) -> Self {
        self.zone = zone;
        self
    }
}

/// Errors that abort a whole pass.
#[derive(Debug, Error)]
pub enum RotatorError {
    #[error("max size must be greater than 0")]
    InvalidThreshold,

    #[error("cannot access directory {path}: {source}")]
    DirectoryAccess {
        path: PathBuf,
        #[source]
        source: FsError,
    },
}

/// File operation that failed for a single candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOp {
    Size,
    Open,
    CreateArchive,
    Truncate,
}

impl fmt::Display for FileOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            FileOp::Size => "read size of",
            FileOp::Open => "open",
            FileOp::CreateArchive => "create archive for",
            FileOp::Truncate => "empty",
        };
        f.write_str(op)
    }
}

/// Errors scoped to one candidate file. Audited, never fatal.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("failed to {op} {name}: {source}")]
    FileIo {
        op: FileOp,
        name: String,
        #[source]
        source: FsError,
    },

    #[error("failed to archive {name}: {source}")]
    Compression {
        name: String,
        #[source]
        source: CodecError,
    },
}

/// A successfully rotated file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RotatedFile {
    pub name: String,
    pub archive_name: String,
    pub size: u64,
}

/// A candidate whose rotation failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedFile {
    pub name: String,
    pub error: String,
}

/// What happened during one pass.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct RotationSummary {
    /// Directory entries listed, candidates or not.
    pub entries_seen: usize,
    /// Entries that were regular `.log` files.
    pub candidates: usize,
    /// Candidates at or under the threshold.
    pub skipped: Vec<String>,
    pub rotated: Vec<RotatedFile>,
    pub failed: Vec<FailedFile>,
}

enum Outcome {
    Skipped,
    Rotated(RotatedFile),
}

/// Executes rotation passes with injected filesystem, codec, clock and logger.
pub struct Rotator<'a, F, X, C, L> {
    fs: &'a F,
    codec: &'a X,
    clock: &'a C,
    logger: &'a L,
}

impl<'a, F, X, C, L> Rotator<'a, F, X, C, L>
where
    F: Filesystem,
    X: Codec,
    C: Clock,
    L: Logger,
{
    pub fn new(fs: &'a F, codec: &'a X, clock: &'a C, logger: &'a L) -> Self {
        Self {
            fs,
            codec,
            clock,
            logger,
        }
    }

    /// Run one full pass over `config.source_dir`.
    pub fn run(&self, config: &RotatorConfig) -> Result<RotationSummary, RotatorError> {
        if config.max_size == 0 {
            return Err(RotatorError::InvalidThreshold);
        }

        self.fs
            .create_dir_all(&config.archive_dir)
            .map_err(|source| RotatorError::DirectoryAccess {
                path: config.archive_dir.clone(),
                source,
            })?;

        let audit = AuditLog::new(
            self.fs,
            self.clock,
            self.logger,
            config.audit_log.clone(),
            config.zone,
        );

        self.logger.verbose(&format!(
            "Rotating {} into {}: max_size={} bytes, audit_log={}",
            config.source_dir.display(),
            config.archive_dir.display(),
            config.max_size,
            config.audit_log.display()
        ));

        audit.record(&format!(
            "Starting check of log files in {}",
            config.source_dir.display()
        ));

        let entries = self
            .fs
            .list_dir(&config.source_dir)
            .map_err(|source| RotatorError::DirectoryAccess {
                path: config.source_dir.clone(),
                source,
            })?;

        let mut summary = RotationSummary::default();

        for entry in entries {
            summary.entries_seen += 1;

            if !self.is_candidate(config, &entry) {
                self.logger.debug(&format!("Ignoring {}", entry.name));
                continue;
            }
            summary.candidates += 1;

            match self.process(config, &audit, &entry) {
                Ok(Outcome::Skipped) => summary.skipped.push(entry.name),
                Ok(Outcome::Rotated(rotated)) => summary.rotated.push(rotated),
                Err(e) => {
                    audit.record(&format!("Error: {}", e));
                    summary.failed.push(FailedFile {
                        name: entry.name,
                        error: e.to_string(),
                    });
                }
            }
        }

        audit.record(&format!(
            "Check finished: {} rotated, {} skipped, {} failed",
            summary.rotated.len(),
            summary.skipped.len(),
            summary.failed.len()
        ));

        Ok(summary)
    }

    /// Regular `.log` files, except the audit log itself when it lives in
    /// the scanned directory under any spelling of its path.
    fn is_candidate(&self, config: &RotatorConfig, entry: &DirEntry) -> bool {
        entry.is_file
            && is_log_file_name(&entry.name)
            && !self.fs.same_file(&entry.path, &config.audit_log)
    }

    fn process(
        &self,
        config: &RotatorConfig,
        audit: &AuditLog<'_, F, C, L>,
        entry: &DirEntry,
    ) -> Result<Outcome, FileError> {
        let name = entry.name.as_str();
        let size = self
            .fs
            .file_size(&entry.path)
            .map_err(|source| file_io(FileOp::Size, name, source))?;

        if size <= config.max_size {
            audit.record(&format!(
                "Skip {} (size: {} bytes, under threshold of {} bytes)",
                name, size, config.max_size
            ));
            return Ok(Outcome::Skipped);
        }

        audit.record(&format!("Archiving {} (size: {} bytes)", name, size));

        let archive_name = self.archive(config, name, &entry.path, audit)?;

        audit.record(&format!("Emptying {}", name));
        self.fs
            .truncate(&entry.path)
            .map_err(|source| file_io(FileOp::Truncate, name, source))?;

        audit.record(&format!("Finished: archived as {}", archive_name));

        Ok(Outcome::Rotated(RotatedFile {
            name: name.to_string(),
            archive_name,
            size,
        }))
    }

    /// Stream `source` through the codec into a newly created archive.
    /// Returns the archive's file name.
    fn archive(
        &self,
        config: &RotatorConfig,
        name: &str,
        source: &Path,
        audit: &AuditLog<'_, F, C, L>,
    ) -> Result<String, FileError> {
        let mut input = self
            .fs
            .open_read(source)
            .map_err(|e| file_io(FileOp::Open, name, e))?;

        let stamp = archive_timestamp(self.clock.now_unix_sec(), config.zone);
        let NewArchive {
            name: archive_name,
            path: archive_path,
            mut writer,
        } = create_archive(
            self.fs,
            &config.archive_dir,
            base_name(name),
            &stamp,
            self.codec.extension(),
        )
        .map_err(|e| file_io(FileOp::CreateArchive, name, e))?;

        let compressed = self.codec.compress(&mut *input, &mut *writer);
        drop(writer);

        match compressed {
            Ok(consumed) => {
                self.logger.debug(&format!(
                    "Compressed {} bytes of {} into {}",
                    consumed,
                    name,
                    archive_path.display()
                ));
                Ok(archive_name)
            }
            Err(source) => {
                self.discard_partial(audit, &archive_path, &archive_name);
                Err(FileError::Compression {
                    name: name.to_string(),
                    source,
                })
            }
        }
    }

    /// Remove an incomplete archive. It was created exclusively by this
    /// pass, so nothing else is lost.
    fn discard_partial(&self, audit: &AuditLog<'_, F, C, L>, archive_path: &Path, archive_name: &str) {
        if let Err(e) = self.fs.remove(archive_path) {
            audit.record(&format!(
                "Error: failed to remove partial archive {}: {}",
                archive_name, e
            ));
        }
    }
}

fn file_io(op: FileOp, name: &str, source: FsError) -> FileError {
    FileError::FileIo {
        op,
        name: name.to_string(),
        source,
    }
}
