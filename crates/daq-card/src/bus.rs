//! DMA bridge layout and transfer limits.
//!
//! The card sits behind a Xilinx XDMA PCIe bridge. The kernel driver exposes
//! the two AXI masters of the bridge as character devices:
//!
//! ```text
//! Node              Bus        Access                      Unit
//! ───────────────── ────────── ─────────────────────────── ──────────────
//! xdma0_user        AXI-Lite   pread/pwrite at reg offset  4-byte word
//! xdma0_h2c_N       AXI-Full   pwrite at DDR offset        aligned block
//! xdma0_c2h_N       AXI-Full   pread at DDR offset         aligned block
//! xdma0_control     bridge     XDMA IP registers           4-byte word
//! xdma0_events_N    -          user interrupt wait         -
//! ```
//!
//! The file position of each node is the bus address relative to the start of
//! the window the node maps; it is the only addressing mechanism available.

use std::fmt;

/// Alignment (and over-allocation) unit required by the DMA engine.
pub const DMA_ALIGNMENT: usize = 4096;

/// Largest single read/write the Linux VFS accepts on 32- and 64-bit hosts.
pub const LINUX_DMA_MAX_TRANSFER_BYTES: u64 = 0x7fff_f000;

/// Width of every AXI-Lite register access.
pub const REGISTER_WIDTH_BYTES: usize = 4;

/// Bytes per megabyte as used for DDR capacity.
pub const MEGABYTE: u64 = 1024 * 1024;

/// DDR capacity in bytes for a capacity given in megabytes.
#[must_use]
pub const fn ddr_capacity_bytes(megabytes: u64) -> u64 {
    megabytes.saturating_mul(MEGABYTE)
}

/// DMA transfer direction.
///
/// Discriminants match the numeric selectors of existing tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Direction {
    /// Card-to-host: read DDR through a C2H node.
    CardToHost = 0,
    /// Host-to-card: write DDR through an H2C node.
    HostToCard = 1,
}

impl Direction {
    /// Short node-family name (`c2h` / `h2c`).
    #[must_use]
    pub const fn node_family(self) -> &'static str {
        match self {
            Self::CardToHost => "c2h",
            Self::HostToCard => "h2c",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CardToHost => write!(f, "card-to-host"),
            Self::HostToCard => write!(f, "host-to-card"),
        }
    }
}

impl TryFrom<u8> for Direction {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::CardToHost),
            1 => Ok(Self::HostToCard),
            other => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alignment_is_a_page() {
        assert!(DMA_ALIGNMENT.is_power_of_two());
        assert_eq!(DMA_ALIGNMENT, 4096);
    }

    #[test]
    fn ceiling_is_page_aligned() {
        assert_eq!(LINUX_DMA_MAX_TRANSFER_BYTES % DMA_ALIGNMENT as u64, 0);
    }

    #[test]
    fn capacity_in_bytes() {
        assert_eq!(ddr_capacity_bytes(16), 16 * 1024 * 1024);
        assert_eq!(ddr_capacity_bytes(u64::MAX), u64::MAX);
    }

    #[test]
    fn direction_selectors() {
        assert_eq!(Direction::try_from(0), Ok(Direction::CardToHost));
        assert_eq!(Direction::try_from(1), Ok(Direction::HostToCard));
        assert_eq!(Direction::try_from(2), Err(2));
        assert_eq!(Direction::HostToCard.node_family(), "h2c");
    }
}
