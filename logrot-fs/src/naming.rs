//! Candidate detection and archive naming.
//!
//! Archives are named `<base>_<YYYYMMDD_HHMMSS>.log.<ext>` where `<base>` is
//! the log file name with its trailing `.log` removed. When that name is
//! already taken a `-<n>` counter follows the timestamp.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::filesystem::{Filesystem, FsError};

/// Suffix that marks a file as a rotation candidate.
pub const LOG_SUFFIX: &str = ".log";

/// Upper bound on collision counters tried for one archive name.
pub const MAX_COLLISION_ATTEMPTS: u32 = 1000;

/// Returns true if the file name carries the log suffix.
pub fn is_log_file_name(name: &str) -> bool {
    name.ends_with(LOG_SUFFIX)
}

/// Strip the trailing log suffix, and only the trailing one.
pub fn base_name(name: &str) -> &str {
    name.strip_suffix(LOG_SUFFIX).unwrap_or(name)
}

/// Build an archive file name.
///
/// `attempt` 0 gives the plain name; higher values add a `-<attempt>` counter.
pub fn archive_filename(base: &str, stamp: &str, extension: &str, attempt: u32) -> String {
    if attempt == 0 {
        format!("{}_{}{}.{}", base, stamp, LOG_SUFFIX, extension)
    } else {
        format!("{}_{}-{}{}.{}", base, stamp, attempt, LOG_SUFFIX, extension)
    }
}

/// A freshly created, still empty archive file.
pub struct NewArchive {
    pub name: String,
    pub path: PathBuf,
    pub writer: Box<dyn Write + Send>,
}

/// Exclusively create the first free archive name in `dir`.
///
/// A name taken by another writer between attempts is skipped, so an
/// existing archive is never opened for writing.
pub fn create_archive<F: Filesystem>(
    fs: &F,
    dir: &Path,
    base: &str,
    stamp: &str,
    extension: &str,
) -> Result<NewArchive, FsError> {
    for attempt in 0..=MAX_COLLISION_ATTEMPTS {
        let name = archive_filename(base, stamp, extension, attempt);
        let path = dir.join(&name);
        match fs.create_write(&path) {
            Ok(writer) => return Ok(NewArchive { name, path, writer }),
            Err(e) if e.is_already_exists() => continue,
            Err(e) => return Err(e),
        }
    }

    Err(FsError::Path(format!(
        "no free archive name for {} at {} in {}",
        base,
        stamp,
        dir.display()
    )))
}
