//! Bulk AXI-Full transfers through the XDMA C2H/H2C nodes.
//!
//! A transfer is validated completely before any node is opened:
//!
//! 1. byte count non-zero and within `max_transfer_bytes`;
//! 2. `ddr_offset + byte_count` within DDR capacity;
//! 3. channel index within the direction's node list.
//!
//! Then one node is opened, positioned at `ddr_base + ddr_offset`, and moved
//! exactly `byte_count` bytes in one call. The node closes on every path.

use std::path::Path;

use daq_card::Direction;

use crate::address::AddressResolver;
use crate::buffer::AlignedDmaBuffer;
use crate::config::{ConfigView, DeviceNodeSet};
use crate::device::{Access, DeviceNode};
use crate::error::{DaqError, Result};

/// One DMA request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DmaTransfer {
    /// Transfer direction.
    pub direction: Direction,
    /// Offset into card DDR.
    pub ddr_offset: u64,
    /// Bytes to move.
    pub byte_count: u64,
    /// Index into the direction's node list.
    pub channel: usize,
}

impl DmaTransfer {
    /// DDR → host request.
    #[must_use]
    pub const fn card_to_host(ddr_offset: u64, byte_count: u64, channel: usize) -> Self {
        Self {
            direction: Direction::CardToHost,
            ddr_offset,
            byte_count,
            channel,
        }
    }

    /// Host → DDR request.
    #[must_use]
    pub const fn host_to_card(ddr_offset: u64, byte_count: u64, channel: usize) -> Self {
        Self {
            direction: Direction::HostToCard,
            ddr_offset,
            byte_count,
            channel,
        }
    }

    /// Request from a numeric direction selector (0 = card→host, 1 = host→card).
    ///
    /// # Errors
    ///
    /// Returns [`DaqError::InvalidDirection`] for any other selector.
    pub fn from_selector(
        selector: u8,
        ddr_offset: u64,
        byte_count: u64,
        channel: usize,
    ) -> Result<Self> {
        let direction = Direction::try_from(selector)
            .map_err(|value| DaqError::InvalidDirection { value })?;
        Ok(Self {
            direction,
            ddr_offset,
            byte_count,
            channel,
        })
    }

    fn len(&self) -> Result<usize> {
        usize::try_from(self.byte_count).map_err(|_| DaqError::TransferTooLarge {
            bytes: self.byte_count,
            max: usize::MAX as u64,
        })
    }
}

/// AXI-Full transfer channel.
#[derive(Debug, Clone, Copy)]
pub struct BlockTransferChannel<'a> {
    view: ConfigView<'a>,
    resolver: AddressResolver<'a>,
}

impl<'a> BlockTransferChannel<'a> {
    /// Channel over a complete configuration.
    #[must_use]
    pub const fn new(view: ConfigView<'a>) -> Self {
        Self {
            view,
            resolver: AddressResolver::new(view),
        }
    }

    /// Check a request against the transfer ceiling and DDR capacity.
    ///
    /// # Errors
    ///
    /// Returns [`DaqError::ZeroLength`], [`DaqError::TransferTooLarge`] or
    /// [`DaqError::DdrOutOfBounds`].
    pub fn validate(&self, transfer: &DmaTransfer) -> Result<()> {
        let bytes = transfer.byte_count;
        if bytes == 0 {
            return Err(DaqError::ZeroLength {
                operation: "DMA transfer",
            });
        }
        let max = self.view.nodes.max_transfer_bytes;
        if bytes > max {
            return Err(DaqError::TransferTooLarge { bytes, max });
        }
        let capacity = self.view.ddr.capacity_bytes();
        let out_of_bounds = DaqError::DdrOutOfBounds {
            offset: transfer.ddr_offset,
            bytes,
            capacity,
        };
        match transfer.ddr_offset.checked_add(bytes) {
            Some(end) if end <= capacity => Ok(()),
            _ => Err(out_of_bounds),
        }
    }

    /// Node for `direction` and `channel`.
    ///
    /// # Errors
    ///
    /// Returns [`DaqError::InvalidChannel`] naming the valid range.
    pub fn node(&self, direction: Direction, channel: usize) -> Result<&'a Path> {
        let set: &'a DeviceNodeSet = self.view.nodes;
        let nodes = match direction {
            Direction::CardToHost => &set.c2h,
            Direction::HostToCard => &set.h2c,
        };
        let path = nodes
            .get(channel)
            .map(std::path::PathBuf::as_path)
            .ok_or(DaqError::InvalidChannel {
                direction,
                channel,
                available: nodes.len(),
            })?;
        tracing::debug!("{}[{channel}] -> {}", direction.node_family(), path.display());
        Ok(path)
    }

    /// Validate, pick the node, and return it with the resolved file offset.
    fn prepare(&self, transfer: &DmaTransfer) -> Result<(&'a Path, u64)> {
        self.validate(transfer)?;
        let node = self.node(transfer.direction, transfer.channel)?;
        let offset = self.resolver.resolve_ddr(transfer.ddr_offset)?;
        Ok((node, offset))
    }

    /// Run `transfer` against `buffer`.
    ///
    /// Card→host reallocates `buffer` to exactly `byte_count` bytes. On a
    /// short read the buffer stays allocated for inspection. Host→card
    /// writes the first `byte_count` bytes of an already-filled buffer.
    ///
    /// # Errors
    ///
    /// Any validation, open, seek or short-I/O failure.
    pub fn transfer(&self, transfer: &DmaTransfer, buffer: &mut AlignedDmaBuffer) -> Result<()> {
        match transfer.direction {
            Direction::CardToHost => self.read_into(transfer, buffer),
            Direction::HostToCard => self.write_from(transfer, buffer),
        }
    }

    /// Card→host into `buffer`.
    ///
    /// # Errors
    ///
    /// See [`Self::transfer`]. A direction other than card→host is refused.
    pub fn read_into(&self, transfer: &DmaTransfer, buffer: &mut AlignedDmaBuffer) -> Result<()> {
        expect_direction(transfer, Direction::CardToHost)?;
        let (path, offset) = self.prepare(transfer)?;
        let len = transfer.len()?;

        let node = DeviceNode::open(path, Access::Read)?;
        node.seek_to(offset)?;
        buffer.allocate(len)?;
        node.read_full(buffer.as_bytes_mut())?;

        tracing::info!(
            "DMA {} {len} bytes from DDR {:#x} via {}",
            transfer.direction,
            transfer.ddr_offset,
            path.display()
        );
        Ok(())
    }

    /// Host→card from `buffer`.
    ///
    /// # Errors
    ///
    /// See [`Self::transfer`]. Also fails with [`DaqError::EmptyBuffer`] or
    /// [`DaqError::ViewOutOfBounds`] if `buffer` holds fewer than
    /// `byte_count` bytes.
    pub fn write_from(&self, transfer: &DmaTransfer, buffer: &AlignedDmaBuffer) -> Result<()> {
        expect_direction(transfer, Direction::HostToCard)?;
        let (path, offset) = self.prepare(transfer)?;
        let len = transfer.len()?;
        if buffer.is_empty() {
            return Err(DaqError::EmptyBuffer);
        }
        if len > buffer.len() {
            return Err(DaqError::ViewOutOfBounds {
                requested: len,
                available: buffer.len(),
            });
        }

        let node = DeviceNode::open(path, Access::Write)?;
        node.seek_to(offset)?;
        node.write_full(&buffer.as_bytes()[..len])?;

        tracing::info!(
            "DMA {} {len} bytes to DDR {:#x} via {}",
            transfer.direction,
            transfer.ddr_offset,
            path.display()
        );
        Ok(())
    }

    /// Card→host straight into `file` at `file_offset`.
    ///
    /// The output is created with mode 0666 and truncated. Data passes
    /// through an aligned scratch block that is freed before returning.
    ///
    /// # Errors
    ///
    /// Any validation, open, seek or short-I/O failure on either side.
    pub fn stream_to_file(
        &self,
        transfer: &DmaTransfer,
        file: impl AsRef<Path>,
        file_offset: u64,
    ) -> Result<()> {
        let mut scratch = AlignedDmaBuffer::new();
        self.read_into(transfer, &mut scratch)?;

        let out = DeviceNode::open(file.as_ref(), Access::CreateTruncate)?;
        out.seek_to(file_offset)?;
        out.write_full(scratch.as_bytes())?;
        tracing::debug!(
            "streamed {} bytes to {} at {file_offset:#x}",
            scratch.len(),
            file.as_ref().display()
        );
        Ok(())
    }

    /// Host→card straight from `file` at `file_offset`.
    ///
    /// # Errors
    ///
    /// Any validation, open, seek or short-I/O failure on either side. The
    /// request is validated before the file is touched.
    pub fn stream_from_file(
        &self,
        transfer: &DmaTransfer,
        file: impl AsRef<Path>,
        file_offset: u64,
    ) -> Result<()> {
        expect_direction(transfer, Direction::HostToCard)?;
        self.prepare(transfer)?;

        let mut scratch = AlignedDmaBuffer::new();
        scratch.fill_from_file(file.as_ref(), file_offset, transfer.len()?)?;
        self.write_from(transfer, &scratch)?;
        tracing::debug!(
            "streamed {} bytes from {} at {file_offset:#x}",
            scratch.len(),
            file.as_ref().display()
        );
        Ok(())
    }
}

fn expect_direction(transfer: &DmaTransfer, wanted: Direction) -> Result<()> {
    if transfer.direction == wanted {
        Ok(())
    } else {
        Err(DaqError::InvalidDirection {
            value: transfer.direction as u8,
        })
    }
}
