//! Public register and DMA API over one configuration record.

use std::path::Path;

use daq_card::RegisterId;

use crate::address::AddressResolver;
use crate::buffer::AlignedDmaBuffer;
use crate::config::FpgaConfig;
use crate::error::Result;
use crate::register::RegisterIoChannel;
use crate::transfer::{BlockTransferChannel, DmaTransfer};

/// Register and DMA facade.
///
/// Holds the immutable configuration and nothing else. Every call checks
/// completeness, builds the channel it needs, and runs one transaction.
/// Errors are passed through unchanged.
#[derive(Debug, Clone)]
pub struct FpgaController {
    config: FpgaConfig,
}

impl FpgaController {
    /// Controller over `config`.
    #[must_use]
    pub const fn new(config: FpgaConfig) -> Self {
        Self { config }
    }

    /// Controller over a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        FpgaConfig::from_json_file(path).map(Self::new)
    }

    /// The configuration record.
    #[must_use]
    pub const fn config(&self) -> &FpgaConfig {
        &self.config
    }

    /// Resolver over the configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is incomplete.
    pub fn resolver(&self) -> Result<AddressResolver<'_>> {
        AddressResolver::from_config(&self.config)
    }

    fn registers(&self) -> Result<RegisterIoChannel<'_>> {
        Ok(RegisterIoChannel::new(self.config.require()?))
    }

    fn dma(&self) -> Result<BlockTransferChannel<'_>> {
        Ok(BlockTransferChannel::new(self.config.require()?))
    }

    /// Read register `id`.
    ///
    /// # Errors
    ///
    /// See [`RegisterIoChannel::read`].
    pub fn read_register(&self, id: RegisterId) -> Result<u32> {
        self.registers()?.read(id)
    }

    /// Write register `id`.
    ///
    /// # Errors
    ///
    /// See [`RegisterIoChannel::write`].
    pub fn write_register(&self, id: RegisterId, value: u32) -> Result<()> {
        self.registers()?.write(id, value)
    }

    /// Read the AXI-Lite word at `base + offset`.
    ///
    /// # Errors
    ///
    /// See [`RegisterIoChannel::read_raw`].
    pub fn read_lite(&self, base: u64, offset: u64) -> Result<u32> {
        self.registers()?.read_raw(base, offset)
    }

    /// Write the AXI-Lite word at `base + offset`.
    ///
    /// # Errors
    ///
    /// See [`RegisterIoChannel::write_raw`].
    pub fn write_lite(&self, base: u64, offset: u64, value: u32) -> Result<()> {
        self.registers()?.write_raw(base, offset, value)
    }

    /// Run `transfer` against `buffer`.
    ///
    /// # Errors
    ///
    /// See [`BlockTransferChannel::transfer`].
    pub fn transfer(&self, transfer: &DmaTransfer, buffer: &mut AlignedDmaBuffer) -> Result<()> {
        self.dma()?.transfer(transfer, buffer)
    }

    /// Read `bytes` of DDR at `ddr_offset` through C2H `channel`.
    ///
    /// # Errors
    ///
    /// See [`BlockTransferChannel::read_into`].
    pub fn read_ddr(&self, ddr_offset: u64, bytes: u64, channel: usize) -> Result<AlignedDmaBuffer> {
        let mut buffer = AlignedDmaBuffer::new();
        self.dma()?
            .read_into(&DmaTransfer::card_to_host(ddr_offset, bytes, channel), &mut buffer)?;
        Ok(buffer)
    }

    /// Write all of `buffer` to DDR at `ddr_offset` through H2C `channel`.
    ///
    /// # Errors
    ///
    /// See [`BlockTransferChannel::write_from`].
    pub fn write_ddr(&self, ddr_offset: u64, buffer: &AlignedDmaBuffer, channel: usize) -> Result<()> {
        let transfer = DmaTransfer::host_to_card(ddr_offset, buffer.len() as u64, channel);
        self.dma()?.write_from(&transfer, buffer)
    }

    /// Copy `bytes` of DDR at `ddr_offset` into `file` at `file_offset`.
    ///
    /// # Errors
    ///
    /// See [`BlockTransferChannel::stream_to_file`].
    pub fn stream_ddr_to_file(
        &self,
        ddr_offset: u64,
        bytes: u64,
        channel: usize,
        file: impl AsRef<Path>,
        file_offset: u64,
    ) -> Result<()> {
        self.dma()?.stream_to_file(
            &DmaTransfer::card_to_host(ddr_offset, bytes, channel),
            file,
            file_offset,
        )
    }

    /// Copy `bytes` from `file` at `file_offset` into DDR at `ddr_offset`.
    ///
    /// # Errors
    ///
    /// See [`BlockTransferChannel::stream_from_file`].
    pub fn stream_file_to_ddr(
        &self,
        file: impl AsRef<Path>,
        file_offset: u64,
        ddr_offset: u64,
        bytes: u64,
        channel: usize,
    ) -> Result<()> {
        self.dma()?.stream_from_file(
            &DmaTransfer::host_to_card(ddr_offset, bytes, channel),
            file,
            file_offset,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DaqError;
    use crate::testing::sample_config;

    #[test]
    fn incomplete_config_fails_at_first_use() {
        let ctl = FpgaController::new(FpgaConfig::default());
        assert!(matches!(
            ctl.read_register(RegisterId::Sci),
            Err(DaqError::ConfigIncomplete { .. })
        ));
        assert!(matches!(
            ctl.read_ddr(0, 16, 0),
            Err(DaqError::ConfigIncomplete { .. })
        ));
    }

    #[test]
    fn ddr_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let h2c = dir.path().join("xdma0_h2c_0");
        std::fs::write(&h2c, b"").unwrap();
        let ctl = FpgaController::new(sample_config(dir.path()));

        let mut buf = AlignedDmaBuffer::new();
        buf.from_slice(&[0x0000_FFF0u32, 1, 2, 3]).unwrap();
        ctl.write_ddr(0x40, &buf, 0).unwrap();

        std::fs::copy(&h2c, dir.path().join("xdma0_c2h_0")).unwrap();
        let back = ctl.read_ddr(0x40, 16, 0).unwrap();
        assert_eq!(back.to_vec_all::<u32>().unwrap(), vec![0x0000_FFF0, 1, 2, 3]);
    }
}
