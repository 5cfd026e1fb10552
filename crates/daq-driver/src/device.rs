//! Transaction-scoped handle on one XDMA device node or payload file.
//!
//! A [`DeviceNode`] lives for exactly one transaction: open, position,
//! transfer, close. Closing happens in `Drop`, so every failure path releases
//! the descriptor.

use std::fs::{File, OpenOptions};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use daq_card::bus::REGISTER_WIDTH_BYTES;
use rustix::fd::{AsFd, BorrowedFd};
use rustix::fs::Mode;

use crate::error::{DaqError, Result};
use crate::io;

/// How a node is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Read only (C2H nodes, register reads, payload input).
    Read,
    /// Write only (H2C nodes).
    Write,
    /// Read and write (register writes).
    ReadWrite,
    /// Read/write, create with mode 0666, keep existing content.
    Create,
    /// Write, create with mode 0666, truncate existing content.
    CreateTruncate,
}

impl Access {
    fn options(self) -> OpenOptions {
        let mut opts = OpenOptions::new();
        match self {
            Self::Read => {
                opts.read(true);
            }
            Self::Write => {
                opts.write(true);
            }
            Self::ReadWrite => {
                opts.read(true).write(true);
            }
            Self::Create => {
                opts.read(true).write(true).create(true).mode(create_mode());
            }
            Self::CreateTruncate => {
                opts.write(true)
                    .create(true)
                    .truncate(true)
                    .mode(create_mode());
            }
        }
        opts
    }
}

fn create_mode() -> u32 {
    let mode = Mode::RUSR | Mode::WUSR | Mode::RGRP | Mode::WGRP | Mode::ROTH | Mode::WOTH;
    mode.bits()
}

/// Open device node or payload file.
#[derive(Debug)]
pub struct DeviceNode {
    path: PathBuf,
    file: File,
}

impl DeviceNode {
    /// Open `path` with the given access.
    ///
    /// # Errors
    ///
    /// Returns [`DaqError::Open`] if the node cannot be opened.
    pub fn open(path: &Path, access: Access) -> Result<Self> {
        let file = access
            .options()
            .open(path)
            .map_err(|e| DaqError::open(path, e))?;
        tracing::debug!("opened {} ({access:?})", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    /// Path this node was opened from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Position at absolute `offset`.
    ///
    /// # Errors
    ///
    /// See [`io::seek_exact`].
    pub fn seek_to(&self, offset: u64) -> Result<()> {
        io::seek_exact(&self.file, &self.path, offset)
    }

    /// Fill `buf` with one read.
    ///
    /// # Errors
    ///
    /// See [`io::read_exact_once`].
    pub fn read_full(&self, buf: &mut [u8]) -> Result<()> {
        io::read_exact_once(&self.file, &self.path, buf)
    }

    /// Write all of `data` with one write.
    ///
    /// # Errors
    ///
    /// See [`io::write_exact_once`].
    pub fn write_full(&self, data: &[u8]) -> Result<()> {
        io::write_exact_once(&self.file, &self.path, data)
    }

    /// Read a little-endian 32-bit word at `offset`.
    ///
    /// # Errors
    ///
    /// Returns error on a misplaced seek or a read of other than 4 bytes.
    pub fn read_word_at(&self, offset: u64) -> Result<u32> {
        self.seek_to(offset)?;
        let mut word = [0u8; REGISTER_WIDTH_BYTES];
        self.read_full(&mut word)?;
        Ok(u32::from_le_bytes(word))
    }

    /// Write a little-endian 32-bit word at `offset`.
    ///
    /// # Errors
    ///
    /// Returns error on a misplaced seek or a write of other than 4 bytes.
    pub fn write_word_at(&self, offset: u64, value: u32) -> Result<()> {
        self.seek_to(offset)?;
        self.write_full(&value.to_le_bytes())
    }
}

impl AsFd for DeviceNode {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.file.as_fd()
    }
}

impl Drop for DeviceNode {
    fn drop(&mut self) {
        tracing::trace!("closing {}", self.path.display());
    }
}
