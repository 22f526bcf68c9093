//! Filesystem abstraction for logrot.
//!
//! This crate provides:
//! - Filesystem trait for directory listing, streaming IO and in-place truncation
//! - Codec trait with a gzip implementation for archive artifacts
//! - Naming rules for candidate log files and their archives

pub mod codec;
pub mod filesystem;
pub mod naming;

pub use codec::{Codec, CodecError, FailingCodec, GzipCodec, DEFAULT_LEVEL};
pub use filesystem::{
    DirEntry, Filesystem, FsCall, FsError, MockFilesystem, MockOp, RealFilesystem,
};
pub use naming::{
    archive_filename, base_name, create_archive, is_log_file_name, NewArchive, LOG_SUFFIX,
};
