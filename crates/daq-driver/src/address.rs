//! Logical address to device-file offset mapping.
//!
//! The XDMA user node starts at the AXI-Lite window and each C2H/H2C node at
//! the AXI-Full window, so the bus bases are never added:
//!
//! ```text
//! register  →  sub-controller base + register offset      (user node)
//! DDR       →  DDR base + caller offset                   (c2h / h2c node)
//! ```

use daq_card::{RegisterBlock, RegisterId};

use crate::config::{ConfigView, FpgaConfig};
use crate::error::{DaqError, Result};

/// Pure offset calculator over a complete configuration.
#[derive(Debug, Clone, Copy)]
pub struct AddressResolver<'a> {
    view: ConfigView<'a>,
}

impl<'a> AddressResolver<'a> {
    /// Resolver over an already-checked view.
    #[must_use]
    pub const fn new(view: ConfigView<'a>) -> Self {
        Self { view }
    }

    /// Resolver over `config`.
    ///
    /// # Errors
    ///
    /// Returns [`DaqError::ConfigIncomplete`] if any section is missing.
    pub fn from_config(config: &'a FpgaConfig) -> Result<Self> {
        config.require().map(Self::new)
    }

    /// Base of the sub-controller holding `block`.
    #[must_use]
    pub const fn block_base(&self, block: RegisterBlock) -> u64 {
        match block {
            RegisterBlock::Adc => self.view.bus.adc_base,
            RegisterBlock::Dma => self.view.bus.dma_base,
        }
    }

    /// Device-file offset of register `id` on the user node.
    ///
    /// # Errors
    ///
    /// Returns [`DaqError::InvalidNumber`] if base plus offset overflows.
    pub fn resolve_register(&self, id: RegisterId) -> Result<u64> {
        let base = self.block_base(id.block());
        let offset = self.view.register_offset(id);
        base.checked_add(offset).ok_or_else(|| DaqError::InvalidNumber {
            text: format!("{base:#x} + {offset:#x}"),
        })
    }

    /// Device-file offset of a register named by its numeric selector.
    ///
    /// # Errors
    ///
    /// Returns [`DaqError::UnknownRegister`] for selectors past the table.
    pub fn resolve_selector(&self, selector: u8) -> Result<u64> {
        self.resolve_register(RegisterId::try_from(selector)?)
    }

    /// Device-file offset of a register named by string.
    ///
    /// # Errors
    ///
    /// Returns [`DaqError::UnknownRegister`] for unrecognised names.
    pub fn resolve_name(&self, name: &str) -> Result<u64> {
        self.resolve_register(name.parse()?)
    }

    /// Device-file offset of DDR `offset` on a DMA node. No bounds check.
    ///
    /// # Errors
    ///
    /// Returns [`DaqError::InvalidNumber`] if the sum overflows.
    pub fn resolve_ddr(&self, offset: u64) -> Result<u64> {
        let base = self.view.bus.ddr_base;
        base.checked_add(offset).ok_or_else(|| DaqError::InvalidNumber {
            text: format!("{base:#x} + {offset:#x}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_config;

    #[test]
    fn every_register_is_base_plus_offset() {
        let cfg = sample_config("/nonexistent");
        let view = cfg.require().unwrap();
        let resolver = AddressResolver::new(view);
        for id in RegisterId::ALL {
            let expected = match id.block() {
                RegisterBlock::Adc => view.bus.adc_base,
                RegisterBlock::Dma => view.bus.dma_base,
            } + view.register_offset(id);
            assert_eq!(resolver.resolve_register(id).unwrap(), expected, "{id}");
        }
    }

    #[test]
    fn names_and_selectors() {
        let cfg = sample_config("/nonexistent");
        let resolver = AddressResolver::from_config(&cfg).unwrap();
        assert_eq!(
            resolver.resolve_name("S2MM_DMASR").unwrap(),
            resolver.resolve_register(RegisterId::Dmasr).unwrap()
        );
        assert_eq!(
            resolver.resolve_selector(3).unwrap(),
            resolver.resolve_register(RegisterId::Str).unwrap()
        );
        assert!(matches!(
            resolver.resolve_selector(16),
            Err(DaqError::UnknownRegister { .. })
        ));
        assert!(matches!(
            resolver.resolve_name("MM2S_DMACR"),
            Err(DaqError::UnknownRegister { .. })
        ));
    }

    #[test]
    fn ddr_adds_base_only() {
        let cfg = sample_config("/nonexistent");
        let resolver = AddressResolver::from_config(&cfg).unwrap();
        let base = cfg.bus.unwrap().ddr_base;
        assert_eq!(resolver.resolve_ddr(0).unwrap(), base);
        assert_eq!(resolver.resolve_ddr(0x100).unwrap(), base + 0x100);
        assert!(resolver.resolve_ddr(u64::MAX).is_err());
    }

    #[test]
    fn incomplete_config_fails() {
        let cfg = FpgaConfig::default();
        assert!(matches!(
            AddressResolver::from_config(&cfg),
            Err(DaqError::ConfigIncomplete { .. })
        ));
    }
}
