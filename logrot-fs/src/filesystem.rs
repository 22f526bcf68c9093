//! Filesystem abstraction for logrot.
//!
//! Provides the `Filesystem` trait used by the rotator and audit log, a real
//! implementation over `std::fs`, and an in-memory mock with per-path fault
//! injection and a journal of mutating calls.

use std::collections::{HashMap, HashSet};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Cursor, Read, Write};
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, RwLock};

use thiserror::Error;

/// Errors from filesystem operations.
#[derive(Debug, Error)]
pub enum FsError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("path error: {0}")]
    Path(String),
}

impl FsError {
    /// Returns true if the underlying IO error is `AlreadyExists`.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, FsError::Io(e) if e.kind() == io::ErrorKind::AlreadyExists)
    }
}

/// A direct child of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// File name (lossily converted to UTF-8).
    pub name: String,
    /// Full path of the entry.
    pub path: PathBuf,
    /// True for regular files (symlinks are followed).
    pub is_file: bool,
}

/// Trait for filesystem operations.
/// Abstracted for testing with mock implementations.
pub trait Filesystem: Send + Sync {
    /// List the direct children of a directory.
    /// Fails if the directory is missing or unreadable.
    fn list_dir(&self, dir: &Path) -> Result<Vec<DirEntry>, FsError>;

    /// Size of a file in bytes.
    fn file_size(&self, path: &Path) -> Result<u64, FsError>;

    /// Open a file for streaming reads.
    fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>, FsError>;

    /// Create a new file for streaming writes.
    /// Fails with `AlreadyExists` if the path is taken; never truncates.
    /// Flushing the returned writer makes the written data durable.
    fn create_write(&self, path: &Path) -> Result<Box<dyn Write + Send>, FsError>;

    /// Create a file exclusively with the given contents.
    /// Fails with `AlreadyExists` if the path is taken.
    fn create_new(&self, path: &Path, data: &[u8]) -> Result<(), FsError>;

    /// Write data atomically to a path (write to temp, then rename).
    fn write_atomic(&self, path: &Path, data: &[u8]) -> Result<(), FsError>;

    /// Append data to a file.
    /// Creates the file and its parent directories if they don't exist.
    fn append(&self, path: &Path, data: &[u8]) -> Result<(), FsError>;

    /// Read file contents as a string.
    fn read_file(&self, path: &Path) -> Result<String, FsError>;

    /// Truncate an existing file to zero length without recreating it.
    fn truncate(&self, path: &Path) -> Result<(), FsError>;

    /// Remove a file.
    fn remove(&self, path: &Path) -> Result<(), FsError>;

    /// Check if a path exists.
    fn exists(&self, path: &Path) -> bool;

    /// True if both paths name the same existing file, however spelled.
    fn same_file(&self, a: &Path, b: &Path) -> bool;

    /// Create directory and parents if needed.
    fn create_dir_all(&self, path: &Path) -> Result<(), FsError>;
}

/// Real filesystem implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFilesystem;

/// File handle whose `flush` also syncs data to disk.
struct DurableFile(File);

impl Write for DurableFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()?;
        self.0.sync_data()
    }
}

impl Filesystem for RealFilesystem {
    fn list_dir(&self, dir: &Path) -> Result<Vec<DirEntry>, FsError> {
        let mut entries = Vec::new();

        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            let is_file = fs::metadata(&path).map(|m| m.is_file()).unwrap_or(false);

            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                path,
                is_file,
            });
        }

        Ok(entries)
    }

    fn file_size(&self, path: &Path) -> Result<u64, FsError> {
        Ok(fs::metadata(path)?.len())
    }

    fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>, FsError> {
        let file = File::open(path)?;
        Ok(Box::new(BufReader::new(file)))
    }

    fn create_write(&self, path: &Path) -> Result<Box<dyn Write + Send>, FsError> {
        let file = OpenOptions::new().write(true).create_new(true).open(path)?;
        Ok(Box::new(BufWriter::new(DurableFile(file))))
    }

    fn create_new(&self, path: &Path, data: &[u8]) -> Result<(), FsError> {
        let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
        file.write_all(data)?;
        file.sync_all()?;
        Ok(())
    }

    fn write_atomic(&self, path: &Path, data: &[u8]) -> Result<(), FsError> {
        // Create temp file path
        let temp_path = path.with_extension("tmp");

        // Write to temp file
        fs::write(&temp_path, data)?;

        // Rename to final path (atomic on most filesystems)
        fs::rename(&temp_path, path)?;

        Ok(())
    }

    fn append(&self, path: &Path, data: &[u8]) -> Result<(), FsError> {
        // Create parent directory if needed
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // Open file in append mode, creating if doesn't exist
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;

        file.write_all(data)?;
        // Use sync_data instead of sync_all - skips metadata sync, still durable for append-only
        file.sync_data()?;

        Ok(())
    }

    fn read_file(&self, path: &Path) -> Result<String, FsError> {
        Ok(fs::read_to_string(path)?)
    }

    fn truncate(&self, path: &Path) -> Result<(), FsError> {
        // Must not create: a vanished file is an error, not a fresh empty file.
        let file = OpenOptions::new().write(true).open(path)?;
        file.set_len(0)?;
        file.sync_data()?;
        Ok(())
    }

    fn remove(&self, path: &Path) -> Result<(), FsError> {
        fs::remove_file(path)?;
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn same_file(&self, a: &Path, b: &Path) -> bool {
        // Resolves `.`, `..`, relative spellings and symlinked directories.
        match (fs::canonicalize(a), fs::canonicalize(b)) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }

    fn create_dir_all(&self, path: &Path) -> Result<(), FsError> {
        fs::create_dir_all(path)?;
        Ok(())
    }
}

/// Operations of the mock filesystem that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOp {
    List,
    Size,
    Read,
    /// The file is created, then every write to it fails.
    Write,
    CreateNew,
    Append,
    Truncate,
    Remove,
    CreateDir,
}

/// A mutating call recorded by the mock filesystem, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FsCall {
    CreateDir(PathBuf),
    Create(PathBuf),
    CreateNew(PathBuf),
    WriteAtomic(PathBuf),
    Append(PathBuf),
    Truncate(PathBuf),
    Remove(PathBuf),
}

#[derive(Debug, Default)]
struct MockState {
    files: HashMap<PathBuf, Vec<u8>>,
    dirs: HashSet<PathBuf>,
    failures: HashSet<(PathBuf, MockOp)>,
    journal: Vec<FsCall>,
}

impl MockState {
    fn add_dir_with_ancestors(&mut self, path: &Path) {
        for ancestor in path.ancestors() {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            self.dirs.insert(ancestor.to_path_buf());
        }
    }

    fn check(&self, path: &Path, op: MockOp) -> Result<(), FsError> {
        if self.failures.contains(&(path.to_path_buf(), op)) {
            return Err(injected(path, op));
        }
        Ok(())
    }

    fn parent_exists(&self, path: &Path) -> bool {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => self.dirs.contains(parent),
            _ => true,
        }
    }
}

fn injected(path: &Path, op: MockOp) -> FsError {
    FsError::Io(io::Error::new(
        io::ErrorKind::PermissionDenied,
        format!("injected {:?} failure: {}", op, path.display()),
    ))
}

fn already_exists(path: &Path) -> FsError {
    FsError::Io(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("file exists: {}", path.display()),
    ))
}

/// Resolve `.` and `..` components without touching the disk.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn not_found(path: &Path) -> FsError {
    FsError::Io(io::Error::new(
        io::ErrorKind::NotFound,
        format!("file not found: {}", path.display()),
    ))
}

/// Mock filesystem for testing.
/// Cloning creates a new handle to the same underlying data.
#[derive(Debug, Clone, Default)]
pub struct MockFilesystem {
    state: Arc<RwLock<MockState>>,
}

impl MockFilesystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all files in the mock filesystem.
    pub fn files(&self) -> HashMap<PathBuf, Vec<u8>> {
        self.state.read().unwrap().files.clone()
    }

    /// Get content of a specific file.
    pub fn get_file(&self, path: &Path) -> Option<Vec<u8>> {
        self.state.read().unwrap().files.get(path).cloned()
    }

    /// Add a file directly (for test setup). Parent directories are created.
    pub fn add_file(&self, path: PathBuf, data: Vec<u8>) {
        let mut state = self.state.write().unwrap();
        if let Some(parent) = path.parent() {
            state.add_dir_with_ancestors(parent);
        }
        state.files.insert(path, data);
    }

    /// Add a directory and its ancestors directly (for test setup).
    pub fn add_dir(&self, path: PathBuf) {
        self.state.write().unwrap().add_dir_with_ancestors(&path);
    }

    /// Make `op` fail for `path` until cleared.
    pub fn fail_on(&self, path: PathBuf, op: MockOp) {
        self.state.write().unwrap().failures.insert((path, op));
    }

    /// Remove all injected failures.
    pub fn clear_failures(&self) {
        self.state.write().unwrap().failures.clear();
    }

    /// Mutating calls made so far, oldest first.
    pub fn journal(&self) -> Vec<FsCall> {
        self.state.read().unwrap().journal.clone()
    }
}

/// Writer handed out by `MockFilesystem::create_write`.
/// Writes land directly in the shared file map.
struct MockWriter {
    state: Arc<RwLock<MockState>>,
    path: PathBuf,
    fail: bool,
}

impl Write for MockWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.fail {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("injected write failure: {}", self.path.display()),
            ));
        }
        let mut state = self.state.write().unwrap();
        state
            .files
            .entry(self.path.clone())
            .or_default()
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Filesystem for MockFilesystem {
    fn list_dir(&self, dir: &Path) -> Result<Vec<DirEntry>, FsError> {
        let state = self.state.read().unwrap();
        state.check(dir, MockOp::List)?;

        if !state.dirs.contains(dir) {
            if state.files.contains_key(dir) {
                return Err(FsError::Path(format!("not a directory: {}", dir.display())));
            }
            return Err(not_found(dir));
        }

        let mut entries: Vec<DirEntry> = Vec::new();
        let children = state
            .files
            .keys()
            .map(|p| (p, true))
            .chain(state.dirs.iter().map(|p| (p, false)));
        for (path, is_file) in children {
            if path.parent() == Some(dir) {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                entries.push(DirEntry {
                    name,
                    path: path.clone(),
                    is_file,
                });
            }
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn file_size(&self, path: &Path) -> Result<u64, FsError> {
        let state = self.state.read().unwrap();
        state.check(path, MockOp::Size)?;
        match state.files.get(path) {
            Some(data) => Ok(data.len() as u64),
            None => Err(not_found(path)),
        }
    }

    fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>, FsError> {
        let state = self.state.read().unwrap();
        state.check(path, MockOp::Read)?;
        match state.files.get(path) {
            Some(data) => Ok(Box::new(Cursor::new(data.clone()))),
            None => Err(not_found(path)),
        }
    }

    fn create_write(&self, path: &Path) -> Result<Box<dyn Write + Send>, FsError> {
        let mut state = self.state.write().unwrap();
        if state.files.contains_key(path) || state.dirs.contains(path) {
            return Err(already_exists(path));
        }
        if !state.parent_exists(path) {
            return Err(not_found(path));
        }
        let fail = state.failures.contains(&(path.to_path_buf(), MockOp::Write));
        state.files.insert(path.to_path_buf(), Vec::new());
        state.journal.push(FsCall::Create(path.to_path_buf()));

        Ok(Box::new(MockWriter {
            state: Arc::clone(&self.state),
            path: path.to_path_buf(),
            fail,
        }))
    }

    fn create_new(&self, path: &Path, data: &[u8]) -> Result<(), FsError> {
        let mut state = self.state.write().unwrap();
        state.check(path, MockOp::CreateNew)?;
        if state.files.contains_key(path) || state.dirs.contains(path) {
            return Err(already_exists(path));
        }
        if !state.parent_exists(path) {
            return Err(not_found(path));
        }
        state.files.insert(path.to_path_buf(), data.to_vec());
        state.journal.push(FsCall::CreateNew(path.to_path_buf()));
        Ok(())
    }

    fn write_atomic(&self, path: &Path, data: &[u8]) -> Result<(), FsError> {
        let mut state = self.state.write().unwrap();
        state.files.insert(path.to_path_buf(), data.to_vec());
        state.journal.push(FsCall::WriteAtomic(path.to_path_buf()));
        Ok(())
    }

    fn append(&self, path: &Path, data: &[u8]) -> Result<(), FsError> {
        let mut state = self.state.write().unwrap();
        state.check(path, MockOp::Append)?;
        if let Some(parent) = path.parent() {
            state.add_dir_with_ancestors(parent);
        }
        state
            .files
            .entry(path.to_path_buf())
            .or_default()
            .extend_from_slice(data);
        state.journal.push(FsCall::Append(path.to_path_buf()));
        Ok(())
    }

    fn read_file(&self, path: &Path) -> Result<String, FsError> {
        let state = self.state.read().unwrap();
        match state.files.get(path) {
            Some(data) => String::from_utf8(data.clone())
                .map_err(|e| FsError::Path(format!("invalid utf8: {}", e))),
            None => Err(not_found(path)),
        }
    }

    fn truncate(&self, path: &Path) -> Result<(), FsError> {
        let mut state = self.state.write().unwrap();
        state.check(path, MockOp::Truncate)?;
        match state.files.get_mut(path) {
            Some(data) => data.clear(),
            None => return Err(not_found(path)),
        }
        state.journal.push(FsCall::Truncate(path.to_path_buf()));
        Ok(())
    }

    fn remove(&self, path: &Path) -> Result<(), FsError> {
        let mut state = self.state.write().unwrap();
        state.check(path, MockOp::Remove)?;
        if state.files.remove(path).is_none() {
            return Err(not_found(path));
        }
        state.journal.push(FsCall::Remove(path.to_path_buf()));
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        let state = self.state.read().unwrap();
        state.files.contains_key(path) || state.dirs.contains(path)
    }

    fn same_file(&self, a: &Path, b: &Path) -> bool {
        let (a, b) = (normalize(a), normalize(b));
        a == b && self.state.read().unwrap().files.contains_key(&a)
    }

    fn create_dir_all(&self, path: &Path) -> Result<(), FsError> {
        let mut state = self.state.write().unwrap();
        state.check(path, MockOp::CreateDir)?;
        if state.files.contains_key(path) {
            return Err(already_exists(path));
        }
        state.add_dir_with_ancestors(path);
        state.journal.push(FsCall::CreateDir(path.to_path_buf()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    // ===========================================
    // MockFilesystem
    // ===========================================

    #[test]
    fn test_mock_list_dir_direct_children_sorted() {
        let fs = MockFilesystem::new();
        let dir = PathBuf::from("/var/log/app");
        fs.add_file(dir.join("b.log"), b"bb".to_vec());
        fs.add_file(dir.join("a.log"), b"a".to_vec());
        fs.add_file(dir.join("nested/c.log"), b"c".to_vec());

        let entries = fs.list_dir(&dir).expect("list");
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a.log", "b.log", "nested"]);
        assert!(entries[0].is_file);
        assert!(!entries[2].is_file);
    }

    #[test]
    fn test_mock_list_dir_missing() {
        let fs = MockFilesystem::new();
        let err = fs.list_dir(Path::new("/nope")).unwrap_err();
        assert!(matches!(err, FsError::Io(ref e) if e.kind() == io::ErrorKind::NotFound));
    }

    #[test]
    fn test_mock_list_dir_on_file() {
        let fs = MockFilesystem::new();
        fs.add_file(PathBuf::from("/tmp/file.log"), vec![]);
        assert!(matches!(
            fs.list_dir(Path::new("/tmp/file.log")),
            Err(FsError::Path(_))
        ));
    }

    #[test]
    fn test_mock_file_size() {
        let fs = MockFilesystem::new();
        let path = PathBuf::from("/tmp/app.log");
        fs.add_file(path.clone(), vec![0u8; 42]);
        assert_eq!(fs.file_size(&path).unwrap(), 42);
        assert!(fs.file_size(Path::new("/tmp/missing.log")).is_err());
    }

    #[test]
    fn test_mock_create_write_streams_into_file() {
        let fs = MockFilesystem::new();
        fs.add_dir(PathBuf::from("/archive"));
        let path = PathBuf::from("/archive/out.gz");

        let mut writer = fs.create_write(&path).expect("create");
        writer.write_all(b"hello ").unwrap();
        writer.write_all(b"world").unwrap();
        writer.flush().unwrap();

        assert_eq!(fs.get_file(&path), Some(b"hello world".to_vec()));
        assert_eq!(fs.journal(), vec![FsCall::Create(path)]);
    }

    #[test]
    fn test_mock_create_write_needs_parent() {
        let fs = MockFilesystem::new();
        assert!(fs.create_write(Path::new("/missing/out.gz")).is_err());
    }

    #[test]
    fn test_mock_injected_write_failure_leaves_empty_file() {
        let fs = MockFilesystem::new();
        fs.add_dir(PathBuf::from("/archive"));
        let path = PathBuf::from("/archive/out.gz");
        fs.fail_on(path.clone(), MockOp::Write);

        let mut writer = fs.create_write(&path).expect("create");
        assert!(writer.write_all(b"data").is_err());
        assert_eq!(fs.get_file(&path), Some(Vec::new()));
    }

    #[test]
    fn test_mock_create_write_refuses_existing_file() {
        let fs = MockFilesystem::new();
        let path = PathBuf::from("/archive/out.gz");
        fs.add_file(path.clone(), b"earlier archive".to_vec());

        let err = fs.create_write(&path).err().expect("must not overwrite");

        assert!(err.is_already_exists());
        assert_eq!(fs.get_file(&path), Some(b"earlier archive".to_vec()));
        assert!(fs.journal().is_empty());
    }

    #[test]
    fn test_mock_same_file_normalizes_dots() {
        let fs = MockFilesystem::new();
        fs.add_file(PathBuf::from("/var/log/app/audit.log"), vec![]);

        assert!(fs.same_file(
            Path::new("/var/log/app/./audit.log"),
            Path::new("/var/log/other/../app/audit.log")
        ));
        assert!(!fs.same_file(
            Path::new("/var/log/app/audit.log"),
            Path::new("/var/log/app/other.log")
        ));
        assert!(!fs.same_file(
            Path::new("/var/log/app/missing.log"),
            Path::new("/var/log/app/missing.log")
        ));
    }

    #[test]
    fn test_mock_truncate_keeps_file() {
        let fs = MockFilesystem::new();
        let path = PathBuf::from("/tmp/app.log");
        fs.add_file(path.clone(), b"content".to_vec());

        fs.truncate(&path).expect("truncate");

        assert!(fs.exists(&path));
        assert_eq!(fs.get_file(&path), Some(Vec::new()));
    }

    #[test]
    fn test_mock_truncate_missing_fails() {
        let fs = MockFilesystem::new();
        assert!(fs.truncate(Path::new("/tmp/gone.log")).is_err());
        assert!(!fs.exists(Path::new("/tmp/gone.log")));
    }

    #[test]
    fn test_mock_append_creates_and_extends() {
        let fs = MockFilesystem::new();
        let path = PathBuf::from("/var/log/audit.log");

        fs.append(&path, b"one\n").unwrap();
        fs.append(&path, b"two\n").unwrap();

        assert_eq!(fs.read_file(&path).unwrap(), "one\ntwo\n");
        assert!(fs.exists(Path::new("/var/log")));
    }

    #[test]
    fn test_mock_create_new_is_exclusive() {
        let fs = MockFilesystem::new();
        fs.add_dir(PathBuf::from("/tmp"));
        let path = PathBuf::from("/tmp/run.lock");

        fs.create_new(&path, b"pid=1").unwrap();
        let err = fs.create_new(&path, b"pid=2").unwrap_err();

        assert!(err.is_already_exists());
        assert_eq!(fs.read_file(&path).unwrap(), "pid=1");
    }

    #[test]
    fn test_mock_create_dir_all_registers_ancestors() {
        let fs = MockFilesystem::new();
        fs.create_dir_all(Path::new("/a/b/c")).unwrap();
        assert!(fs.exists(Path::new("/a")));
        assert!(fs.exists(Path::new("/a/b")));
        assert!(fs.exists(Path::new("/a/b/c")));
    }

    #[test]
    fn test_mock_fail_on_and_clear() {
        let fs = MockFilesystem::new();
        let path = PathBuf::from("/tmp/app.log");
        fs.add_file(path.clone(), vec![1, 2, 3]);
        fs.fail_on(path.clone(), MockOp::Size);

        assert!(fs.file_size(&path).is_err());
        fs.clear_failures();
        assert_eq!(fs.file_size(&path).unwrap(), 3);
    }

    #[test]
    fn test_mock_clone_shares_state() {
        let fs = MockFilesystem::new();
        let other = fs.clone();
        other.add_file(PathBuf::from("/tmp/x.log"), vec![9]);
        assert_eq!(fs.get_file(Path::new("/tmp/x.log")), Some(vec![9]));
    }

    #[test]
    fn test_mock_remove() {
        let fs = MockFilesystem::new();
        let path = PathBuf::from("/tmp/x.gz");
        fs.add_file(path.clone(), vec![1]);
        fs.remove(&path).unwrap();
        assert!(!fs.exists(&path));
        assert!(fs.remove(&path).is_err());
    }

    // ===========================================
    // RealFilesystem
    // ===========================================

    #[test]
    fn test_real_list_dir_marks_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("app.log"), b"x").unwrap();
        fs::create_dir(dir.path().join("sub.log")).unwrap();

        let mut entries = RealFilesystem.list_dir(dir.path()).unwrap();
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "app.log");
        assert!(entries[0].is_file);
        assert_eq!(entries[1].name, "sub.log");
        assert!(!entries[1].is_file);
    }

    #[test]
    fn test_real_list_dir_missing() {
        let dir = tempdir().unwrap();
        assert!(RealFilesystem.list_dir(&dir.path().join("nope")).is_err());
    }

    #[test]
    fn test_real_truncate_in_place() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        fs::write(&path, b"some log lines\n").unwrap();

        // An open append handle keeps working after truncation.
        let mut handle = OpenOptions::new().append(true).open(&path).unwrap();
        RealFilesystem.truncate(&path).unwrap();
        handle.write_all(b"after\n").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"after\n");
    }

    #[test]
    fn test_real_truncate_missing_does_not_create() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gone.log");
        assert!(RealFilesystem.truncate(&path).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_real_create_write_and_read_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.bin");

        let mut writer = RealFilesystem.create_write(&path).unwrap();
        writer.write_all(b"payload").unwrap();
        writer.flush().unwrap();
        drop(writer);

        let mut content = Vec::new();
        RealFilesystem
            .open_read(&path)
            .unwrap()
            .read_to_end(&mut content)
            .unwrap();
        assert_eq!(content, b"payload");
        assert_eq!(RealFilesystem.file_size(&path).unwrap(), 7);
    }

    #[test]
    fn test_real_create_write_never_overwrites() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app_20240101_120000.log.gz");
        fs::write(&path, b"earlier archive").unwrap();

        let err = RealFilesystem.create_write(&path).err().expect("must not overwrite");

        assert!(err.is_already_exists());
        assert_eq!(fs::read(&path).unwrap(), b"earlier archive");
    }

    #[cfg(unix)]
    #[test]
    fn test_real_same_file_across_spellings() {
        let dir = tempdir().unwrap();
        let logs = dir.path().join("logs");
        fs::create_dir(&logs).unwrap();
        let audit = logs.join("audit.log");
        fs::write(&audit, b"").unwrap();
        let link = dir.path().join("linked");
        std::os::unix::fs::symlink(&logs, &link).unwrap();

        assert!(RealFilesystem.same_file(&audit, &logs.join(".").join("audit.log")));
        assert!(RealFilesystem.same_file(&audit, &logs.join("..").join("logs").join("audit.log")));
        assert!(RealFilesystem.same_file(&audit, &link.join("audit.log")));
        assert!(!RealFilesystem.same_file(&audit, &logs.join("other.log")));
    }

    #[test]
    fn test_real_create_new_is_exclusive() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.lock");
        RealFilesystem.create_new(&path, b"a").unwrap();
        assert!(RealFilesystem.create_new(&path, b"b").unwrap_err().is_already_exists());
    }

    #[test]
    fn test_real_append_creates_parents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/deeper/audit.log");
        RealFilesystem.append(&path, b"line\n").unwrap();
        RealFilesystem.append(&path, b"line\n").unwrap();
        assert_eq!(RealFilesystem.read_file(&path).unwrap(), "line\nline\n");
    }

    #[test]
    fn test_real_write_atomic_overwrites() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state");
        RealFilesystem.write_atomic(&path, b"one").unwrap();
        RealFilesystem.write_atomic(&path, b"two").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"two");
    }
}
