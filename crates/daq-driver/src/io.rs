//! Positioned I/O on XDMA device nodes and regular files.
//!
//! The XDMA character devices take the file position as the bus address, so
//! every transfer is an absolute seek followed by exactly one `read` or
//! `write`. Nothing here retries: a seek that lands elsewhere or a short
//! count is reported and the transaction is over.

use std::path::Path;

use rustix::fd::AsFd;
use rustix::fs::{seek, SeekFrom};
use rustix::io::{read, write};

use crate::error::{DaqError, Result};

/// Seek to `offset` and verify the kernel landed exactly there.
///
/// # Errors
///
/// Returns [`DaqError::SeekMismatch`] on a misplaced seek, or an I/O error.
pub fn seek_exact<Fd: AsFd>(fd: Fd, path: &Path, offset: u64) -> Result<()> {
    let actual = seek(fd, SeekFrom::Start(offset)).map_err(std::io::Error::from)?;
    if actual != offset {
        return Err(DaqError::SeekMismatch {
            path: path.to_path_buf(),
            expected: offset,
            actual,
        });
    }
    tracing::trace!("{}: positioned at {offset:#x}", path.display());
    Ok(())
}

/// One `read` that must fill `buf` completely.
///
/// # Errors
///
/// Returns [`DaqError::ShortTransfer`] if fewer bytes arrive.
pub fn read_exact_once<Fd: AsFd>(fd: Fd, path: &Path, buf: &mut [u8]) -> Result<()> {
    let expected = buf.len();
    let actual = read(fd, buf).map_err(std::io::Error::from)?;
    if actual != expected {
        return Err(DaqError::short("read", path, expected, actual));
    }
    tracing::trace!("{}: read {actual} bytes", path.display());
    Ok(())
}

/// One `write` that must consume `data` completely.
///
/// # Errors
///
/// Returns [`DaqError::ShortTransfer`] if fewer bytes are accepted.
pub fn write_exact_once<Fd: AsFd>(fd: Fd, path: &Path, data: &[u8]) -> Result<()> {
    let expected = data.len();
    let actual = write(fd, data).map_err(std::io::Error::from)?;
    if actual != expected {
        return Err(DaqError::short("write", path, expected, actual));
    }
    tracing::trace!("{}: wrote {actual} bytes", path.display());
    Ok(())
}
