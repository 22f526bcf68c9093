//! CLI argument parsing for logrot.
//!
//! Provides the command-line interface for the `logrot` binary with
//! `rotate` (one pass) and `watch` (repeated passes) subcommands.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use logrot_clock::Zone;
use logrot_fs::DEFAULT_LEVEL;
use thiserror::Error;

use crate::rotator::RotatorConfig;

/// Default directory scanned for log files.
pub const DEFAULT_SOURCE_DIR: &str = "/var/log/myapp";

/// Default directory receiving archives.
pub const DEFAULT_ARCHIVE_DIR: &str = "/var/log/myapp/archive";

/// Default rotation threshold (5 MiB).
pub const DEFAULT_MAX_SIZE: &str = "5M";

/// Default audit log location.
pub const DEFAULT_AUDIT_LOG: &str = "/var/log/logrotate_script.log";

/// Default pause between watch passes in seconds.
pub const DEFAULT_INTERVAL_SEC: u64 = 300;

/// Longest accepted pause between watch passes. Kept below the run lock's
/// staleness window so a live watcher never looks abandoned.
pub const MAX_INTERVAL_SEC: u64 = 3600;

/// Errors from CLI argument validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CliError {
    #[error("max-size must be at least 1 byte, got {0}")]
    InvalidMaxSize(u64),

    #[error("level must be between 0 and 9, got {0}")]
    InvalidLevel(u32),

    #[error("interval-sec must be between 1 and 3600, got {0}")]
    InvalidInterval(u64),

    #[error("max-passes must be at least 1, got {0}")]
    InvalidMaxPasses(u64),
}

/// logrot - Compress oversized log files into timestamped archives and empty them in place.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "logrot")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Run a single rotation pass and exit.
    Rotate(RotateArgs),
    /// Run rotation passes on a fixed interval until interrupted.
    Watch(WatchArgs),
}

/// Options shared by every command.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct RotationArgs {
    /// Directory scanned for `.log` files (not recursive).
    #[arg(long, default_value = DEFAULT_SOURCE_DIR)]
    pub source_dir: PathBuf,

    /// Directory where compressed archives are written. Created if missing.
    #[arg(long, default_value = DEFAULT_ARCHIVE_DIR)]
    pub archive_dir: PathBuf,

    /// Files larger than this are rotated. Bytes, or with a K/M/G suffix.
    #[arg(long, default_value = DEFAULT_MAX_SIZE, value_parser = parse_size)]
    pub max_size: u64,

    /// Append-only log of every action taken.
    #[arg(long, default_value = DEFAULT_AUDIT_LOG)]
    pub audit_log: PathBuf,

    /// Render timestamps in UTC instead of local time.
    #[arg(long)]
    pub utc: bool,

    /// Gzip compression level (0-9).
    #[arg(long, default_value_t = DEFAULT_LEVEL)]
    pub level: u32,

    /// Increase console verbosity (-v, -vv).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Print the pass summary as JSON on stdout.
    #[arg(long)]
    pub json: bool,
}

impl RotationArgs {
    /// Validate the arguments.
    pub fn validate(&self) -> Result<(), CliError> {
        if self.max_size == 0 {
            return Err(CliError::InvalidMaxSize(self.max_size));
        }
        if self.level > 9 {
            return Err(CliError::InvalidLevel(self.level));
        }
        Ok(())
    }

    /// Timestamp zone selected by `--utc`.
    pub fn zone(&self) -> Zone {
        if self.utc {
            Zone::Utc
        } else {
            Zone::Local
        }
    }

    /// Build the rotator configuration.
    pub fn to_config(&self) -> RotatorConfig {
        RotatorConfig::new(
            self.source_dir.clone(),
            self.archive_dir.clone(),
            self.max_size,
            self.audit_log.clone(),
        )
        .with_zone(self.zone())
    }
}

/// Arguments for the rotate command.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct RotateArgs {
    #[command(flatten)]
    pub rotation: RotationArgs,
}

impl RotateArgs {
    /// Validate the arguments.
    pub fn validate(&self) -> Result<(), CliError> {
        self.rotation.validate()
    }
}

/// Arguments for the watch command.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct WatchArgs {
    #[command(flatten)]
    pub rotation: RotationArgs,

    /// Seconds to wait between the end of one pass and the start of the next.
    #[arg(long, default_value_t = DEFAULT_INTERVAL_SEC)]
    pub interval_sec: u64,

    /// Stop after this many passes. Runs until Ctrl+C if not given.
    #[arg(long)]
    pub max_passes: Option<u64>,
}

impl WatchArgs {
    /// Validate the arguments.
    pub fn validate(&self) -> Result<(), CliError> {
        self.rotation.validate()?;
        if self.interval_sec == 0 || self.interval_sec > MAX_INTERVAL_SEC {
            return Err(CliError::InvalidInterval(self.interval_sec));
        }
        if self.max_passes == Some(0) {
            return Err(CliError::InvalidMaxPasses(0));
        }
        Ok(())
    }
}

/// Parse a size such as `1048576`, `512K`, `5M` or `1G` (binary multiples).
pub fn parse_size(input: &str) -> Result<u64, String> {
    let trimmed = input.trim();
    let (digits, multiplier) = match trimmed.char_indices().last() {
        Some((idx, c)) if c.is_ascii_alphabetic() => {
            let multiplier = match c.to_ascii_uppercase() {
                'K' => 1u64 << 10,
                'M' => 1u64 << 20,
                'G' => 1u64 << 30,
                _ => return Err(format!("unknown size suffix '{}' in '{}'", c, input)),
            };
            (&trimmed[..idx], multiplier)
        }
        _ => (trimmed, 1),
    };

    let value: u64 = digits
        .trim()
        .parse()
        .map_err(|_| format!("invalid size '{}'", input))?;

    value
        .checked_mul(multiplier)
        .ok_or_else(|| format!("size '{}' is too large", input))
}

/// Parse CLI arguments from an iterator of strings.
/// Useful for testing.
pub fn parse_from<I, T>(iter: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(iter)
}
