//! Single-word AXI-Lite register access through the XDMA user node.
//!
//! Each call is one transaction: open the user node, seek to the register's
//! offset, move exactly four bytes, close. Nothing is retried; whether a
//! register access is safe to repeat is the caller's decision.

use std::path::Path;

use daq_card::RegisterId;

use crate::address::AddressResolver;
use crate::config::ConfigView;
use crate::device::{Access, DeviceNode};
use crate::error::{DaqError, Result};

/// AXI-Lite register channel.
#[derive(Debug, Clone, Copy)]
pub struct RegisterIoChannel<'a> {
    node: &'a Path,
    resolver: AddressResolver<'a>,
}

impl<'a> RegisterIoChannel<'a> {
    /// Channel on the user node named by `view`.
    #[must_use]
    pub fn new(view: ConfigView<'a>) -> Self {
        Self {
            node: view.nodes.user.as_path(),
            resolver: AddressResolver::new(view),
        }
    }

    /// Read register `id`.
    ///
    /// # Errors
    ///
    /// Returns error if the node cannot be opened, the seek misses or the
    /// read is not exactly 4 bytes.
    pub fn read(&self, id: RegisterId) -> Result<u32> {
        let offset = self.resolver.resolve_register(id)?;
        let value = self.read_at(offset)?;
        tracing::debug!("{id} @ {offset:#x} -> {value:#010x}");
        Ok(value)
    }

    /// Write `value` to register `id`.
    ///
    /// # Errors
    ///
    /// Returns [`DaqError::ReadOnlyRegister`] for NGF and ERR before any I/O,
    /// otherwise the same failures as [`Self::read`].
    pub fn write(&self, id: RegisterId, value: u32) -> Result<()> {
        if id.is_read_only() {
            return Err(DaqError::ReadOnlyRegister { register: id });
        }
        let offset = self.resolver.resolve_register(id)?;
        self.write_at(offset, value)?;
        tracing::debug!("{id} @ {offset:#x} <- {value:#010x}");
        Ok(())
    }

    /// Read the word at `base + offset` on the user node.
    ///
    /// # Errors
    ///
    /// Same as [`Self::read`], plus overflow of `base + offset`.
    pub fn read_raw(&self, base: u64, offset: u64) -> Result<u32> {
        let address = raw_address(base, offset)?;
        let value = self.read_at(address)?;
        tracing::debug!("lite {address:#x} -> {value:#010x}");
        Ok(value)
    }

    /// Write `value` at `base + offset` on the user node.
    ///
    /// # Errors
    ///
    /// Same as [`Self::read_raw`].
    pub fn write_raw(&self, base: u64, offset: u64, value: u32) -> Result<()> {
        let address = raw_address(base, offset)?;
        self.write_at(address, value)?;
        tracing::debug!("lite {address:#x} <- {value:#010x}");
        Ok(())
    }

    fn read_at(&self, offset: u64) -> Result<u32> {
        DeviceNode::open(self.node, Access::Read)?.read_word_at(offset)
    }

    fn write_at(&self, offset: u64, value: u32) -> Result<()> {
        DeviceNode::open(self.node, Access::ReadWrite)?.write_word_at(offset, value)
    }
}

fn raw_address(base: u64, offset: u64) -> Result<u64> {
    base.checked_add(offset).ok_or_else(|| DaqError::InvalidNumber {
        text: format!("{base:#x} + {offset:#x}"),
    })
}
