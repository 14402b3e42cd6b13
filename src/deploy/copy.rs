//! Single-leaf copy through a fixed-size buffer.
use std::io::{self, Read, Write};
use std::path::Path;

use crate::logging::Log;
use crate::resources::{DestinationTree, ResourceError, ResourceTree};

/// A leaf that was copied in full.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Copied {
    /// Number of bytes written.
    pub bytes: u64,
}

/// Why a leaf could not be copied.
#[derive(Debug)]
pub enum CopyFailure {
    /// The leaf could not be opened or read; it may be a directory the
    /// bundle format presents as a leaf, so it is worth probing as one.
    NeedsFallback(ResourceError),
    /// The destination could not be written; the entry is skipped.
    Unwritable(ResourceError),
}

impl From<ResourceError> for CopyFailure {
    fn from(err: ResourceError) -> Self {
        if err.is_source_side() {
            Self::NeedsFallback(err)
        } else {
            Self::Unwritable(err)
        }
    }
}

/// Which side of a stream copy failed.
#[derive(Debug)]
pub(crate) enum StreamError {
    Read(io::Error),
    Write(io::Error),
}

impl StreamError {
    fn at(self, src: &Path, dst: &Path) -> ResourceError {
        match self {
            Self::Read(e) => ResourceError::read(src, e),
            Self::Write(e) => ResourceError::write(dst, e),
        }
    }
}

/// Copy `reader` into `writer` through a buffer of `buffer_size` bytes until
/// end-of-stream, returning the number of bytes copied.
pub(crate) fn copy_stream(
    reader: &mut dyn Read,
    writer: &mut dyn Write,
    buffer_size: usize,
) -> Result<u64, StreamError> {
    let mut buf = vec![0u8; buffer_size.max(1)];
    let mut total = 0u64;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => return Ok(total),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(StreamError::Read(e)),
        };
        let chunk = buf.get(..n).unwrap_or_default();
        writer.write_all(chunk).map_err(StreamError::Write)?;
        total += n as u64;
    }
}

/// Copy the leaf at `src` in `source` to `dst` in `dest`.
///
/// The source is opened before the destination is created, so a leaf that
/// cannot be opened leaves nothing behind.  A copy that fails part-way
/// discards the partial destination file; if even that fails, a warning is
/// logged.  With `dry_run` the leaf is read in full but nothing is written.
pub(crate) fn copy_leaf(
    source: &dyn ResourceTree,
    dest: &dyn DestinationTree,
    log: &dyn Log,
    src: &Path,
    dst: &Path,
    buffer_size: usize,
    dry_run: bool,
) -> Result<Copied, CopyFailure> {
    let mut reader = source.open(src)?;

    if dry_run {
        let bytes = copy_stream(&mut reader, &mut io::sink(), buffer_size)
            .map_err(|e| e.at(src, dst))?;
        return Ok(Copied { bytes });
    }

    let mut writer = dest.create_or_truncate(dst)?;
    let result = copy_stream(&mut reader, &mut writer, buffer_size)
        .and_then(|bytes| writer.flush().map(|()| bytes).map_err(StreamError::Write));
    drop(writer);

    match result {
        Ok(bytes) => Ok(Copied { bytes }),
        Err(e) => {
            if let Err(leftover) = dest.discard(dst) {
                log.warn(&format!("{leftover}; partial file left behind"));
            }
            Err(e.at(src, dst).into())
        }
    }
}
