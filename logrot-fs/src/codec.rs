//! Compression codec used to produce archive artifacts.

use std::io::{self, Read, Write};

use flate2::write::GzEncoder;
use flate2::Compression;
use thiserror::Error;

/// Size of the buffer used when streaming a file through the encoder.
pub const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Default gzip compression level.
pub const DEFAULT_LEVEL: u32 = 6;

/// Errors from compressing a stream.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to read input: {0}")]
    Read(#[source] io::Error),

    #[error("failed to write compressed output: {0}")]
    Write(#[source] io::Error),
}

/// Trait for stream compression.
pub trait Codec: Send + Sync {
    /// Extension appended to archive names, without the leading dot.
    fn extension(&self) -> &'static str;

    /// Compress everything readable from `input` into `output`.
    ///
    /// Returns the number of uncompressed bytes consumed. On success the
    /// compressed stream is complete and `output` has been flushed.
    fn compress(&self, input: &mut dyn Read, output: &mut dyn Write) -> Result<u64, CodecError>;
}

/// Single-member gzip codec.
#[derive(Debug, Clone, Copy)]
pub struct GzipCodec {
    level: u32,
}

impl Default for GzipCodec {
    fn default() -> Self {
        Self::new(DEFAULT_LEVEL)
    }
}

impl GzipCodec {
    /// Create a codec with the given level (clamped to 0-9).
    pub fn new(level: u32) -> Self {
        Self {
            level: level.min(9),
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }
}

impl Codec for GzipCodec {
    fn extension(&self) -> &'static str {
        "gz"
    }

    fn compress(&self, input: &mut dyn Read, output: &mut dyn Write) -> Result<u64, CodecError> {
        let mut encoder = GzEncoder::new(output, Compression::new(self.level));
        let mut buf = vec![0u8; COPY_BUFFER_SIZE];
        let mut total: u64 = 0;

        loop {
            let n = match input.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(CodecError::Read(e)),
            };
            encoder.write_all(&buf[..n]).map_err(CodecError::Write)?;
            total += n as u64;
        }

        let output = encoder.finish().map_err(CodecError::Write)?;
        output.flush().map_err(CodecError::Write)?;

        Ok(total)
    }
}

/// Codec that writes a few bytes and then fails, for testing cleanup paths.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingCodec;

impl FailingCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Codec for FailingCodec {
    fn extension(&self) -> &'static str {
        "gz"
    }

    fn compress(&self, _input: &mut dyn Read, output: &mut dyn Write) -> Result<u64, CodecError> {
        output.write_all(b"\x1f\x8b").map_err(CodecError::Write)?;
        Err(CodecError::Write(io::Error::new(
            io::ErrorKind::Other,
            "no space left on device",
        )))
    }
}
