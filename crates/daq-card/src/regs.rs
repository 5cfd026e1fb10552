//! AXI-Lite register set of the acquisition card.
//!
//! Two sub-controllers sit behind the AXI-Lite window:
//!
//! ```text
//! AXI-Lite window
//! ├── ADC controller   SCI SP SF STR NGF ERR
//! └── AXI DMA (S2MM)   DMACR DMASR SG_CTL CURDESC[_MSB] TAILDESC[_MSB] DA[_MSB] LENGTH
//! ```
//!
//! The DMA register names follow Xilinx PG021 (AXI DMA, S2MM channel only;
//! MM2S is not instantiated on the card). Each register is 32 bits wide.
//!
//! Offsets are not fixed by the bitstream build and are read from the
//! configuration record, so this module carries identity and access flags
//! only.

use std::fmt;
use std::str::FromStr;

/// Sub-controller a register belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterBlock {
    /// ADC sampling controller.
    Adc,
    /// AXI DMA controller (S2MM channel).
    Dma,
}

impl fmt::Display for RegisterBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Adc => write!(f, "adc"),
            Self::Dma => write!(f, "dma"),
        }
    }
}

/// Register identifier.
///
/// The discriminants are the numeric register selectors used by existing
/// tooling (`0..=5` ADC, `6..=15` DMA).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RegisterId {
    // ── ADC controller ───────────────────────────────────────────────────────
    /// Sampling clock increment.
    Sci = 0,
    /// Sampling points per frame.
    Sp = 1,
    /// Sampling frames.
    Sf = 2,
    /// Sampling trigger and ready.
    Str = 3,
    /// Number of generated frames (read-only).
    Ngf = 4,
    /// ADC error flags (read-only).
    Err = 5,

    // ── AXI DMA, S2MM channel ────────────────────────────────────────────────
    /// S2MM DMA control register.
    Dmacr = 6,
    /// S2MM DMA status register.
    Dmasr = 7,
    /// Scatter/gather user and cache control.
    SgCtl = 8,
    /// Current descriptor pointer, lower 32 bits.
    Curdesc = 9,
    /// Current descriptor pointer, upper 32 bits.
    CurdescMsb = 10,
    /// Tail descriptor pointer, lower 32 bits.
    Taildesc = 11,
    /// Tail descriptor pointer, upper 32 bits.
    TaildescMsb = 12,
    /// Destination address, lower 32 bits.
    Da = 13,
    /// Destination address, upper 32 bits.
    DaMsb = 14,
    /// Buffer length in bytes.
    Length = 15,
}

impl RegisterId {
    /// Every register, in selector order.
    pub const ALL: [Self; 16] = [
        Self::Sci,
        Self::Sp,
        Self::Sf,
        Self::Str,
        Self::Ngf,
        Self::Err,
        Self::Dmacr,
        Self::Dmasr,
        Self::SgCtl,
        Self::Curdesc,
        Self::CurdescMsb,
        Self::Taildesc,
        Self::TaildescMsb,
        Self::Da,
        Self::DaMsb,
        Self::Length,
    ];

    /// Sub-controller this register lives in.
    #[must_use]
    pub const fn block(self) -> RegisterBlock {
        match self {
            Self::Sci | Self::Sp | Self::Sf | Self::Str | Self::Ngf | Self::Err => {
                RegisterBlock::Adc
            }
            Self::Dmacr
            | Self::Dmasr
            | Self::SgCtl
            | Self::Curdesc
            | Self::CurdescMsb
            | Self::Taildesc
            | Self::TaildescMsb
            | Self::Da
            | Self::DaMsb
            | Self::Length => RegisterBlock::Dma,
        }
    }

    /// `true` for registers the host must never write.
    #[must_use]
    pub const fn is_read_only(self) -> bool {
        matches!(self, Self::Ngf | Self::Err)
    }

    /// Canonical register name as it appears in configuration files.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sci => "SCI",
            Self::Sp => "SP",
            Self::Sf => "SF",
            Self::Str => "STR",
            Self::Ngf => "NGF",
            Self::Err => "ERR",
            Self::Dmacr => "S2MM_DMACR",
            Self::Dmasr => "S2MM_DMASR",
            Self::SgCtl => "SG_CTL",
            Self::Curdesc => "S2MM_CURDESC",
            Self::CurdescMsb => "S2MM_CURDESC_MSB",
            Self::Taildesc => "S2MM_TAILDESC",
            Self::TaildescMsb => "S2MM_TAILDESC_MSB",
            Self::Da => "S2MM_DA",
            Self::DaMsb => "S2MM_DA_MSB",
            Self::Length => "S2MM_LENGTH",
        }
    }

    /// Numeric selector.
    #[must_use]
    pub const fn selector(self) -> u8 {
        self as u8
    }

    /// Registers of one sub-controller, in selector order.
    pub fn in_block(block: RegisterBlock) -> impl Iterator<Item = Self> {
        Self::ALL.into_iter().filter(move |r| r.block() == block)
    }
}

impl fmt::Display for RegisterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A register name or selector that matches no [`RegisterId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRegister(pub String);

impl fmt::Display for UnknownRegister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown register: {}", self.0)
    }
}

impl std::error::Error for UnknownRegister {}

impl TryFrom<u8> for RegisterId {
    type Error = UnknownRegister;

    fn try_from(selector: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(usize::from(selector))
            .copied()
            .ok_or_else(|| UnknownRegister(selector.to_string()))
    }
}

impl FromStr for RegisterId {
    type Err = UnknownRegister;

    /// Accepts the canonical name (`S2MM_DMACR`), the name without the
    /// channel prefix (`DMACR`), case-insensitively.
    fn from_str(s: &str) -> Result<Self, UnknownRegister> {
        let wanted = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|r| {
                let name = r.name();
                name == wanted || name.strip_prefix("S2MM_") == Some(wanted.as_str())
            })
            .ok_or_else(|| UnknownRegister(s.to_string()))
    }
}

// ── DMA status register bits (PG021) ────────────────────────────────────────

/// S2MM_DMASR bit definitions.
pub mod dmasr {
    /// Channel halted.
    pub const HALTED: u32 = 1 << 0;
    /// Channel idle.
    pub const IDLE: u32 = 1 << 1;
    /// Scatter/gather engine included in the build.
    pub const SG_INCLUDED: u32 = 1 << 3;
    /// DMA internal error.
    pub const DMA_INT_ERR: u32 = 1 << 4;
    /// DMA slave error.
    pub const DMA_SLV_ERR: u32 = 1 << 5;
    /// DMA decode error.
    pub const DMA_DEC_ERR: u32 = 1 << 6;
    /// SG internal error.
    pub const SG_INT_ERR: u32 = 1 << 8;
    /// SG slave error.
    pub const SG_SLV_ERR: u32 = 1 << 9;
    /// SG decode error.
    pub const SG_DEC_ERR: u32 = 1 << 10;
    /// Interrupt on complete.
    pub const IOC_IRQ: u32 = 1 << 12;
    /// Delay interrupt.
    pub const DLY_IRQ: u32 = 1 << 13;
    /// Error interrupt.
    pub const ERR_IRQ: u32 = 1 << 14;

    /// Any of the six error bits.
    pub const ANY_ERROR: u32 =
        DMA_INT_ERR | DMA_SLV_ERR | DMA_DEC_ERR | SG_INT_ERR | SG_SLV_ERR | SG_DEC_ERR;

    /// Names of the flags set in a status word, lowest bit first.
    #[must_use]
    pub fn flags(status: u32) -> Vec<&'static str> {
        [
            (HALTED, "halted"),
            (IDLE, "idle"),
            (SG_INCLUDED, "sg-included"),
            (DMA_INT_ERR, "dma-internal-error"),
            (DMA_SLV_ERR, "dma-slave-error"),
            (DMA_DEC_ERR, "dma-decode-error"),
            (SG_INT_ERR, "sg-internal-error"),
            (SG_SLV_ERR, "sg-slave-error"),
            (SG_DEC_ERR, "sg-decode-error"),
            (IOC_IRQ, "ioc-irq"),
            (DLY_IRQ, "delay-irq"),
            (ERR_IRQ, "error-irq"),
        ]
        .into_iter()
        .filter(|(bit, _)| status & bit != 0)
        .map(|(_, name)| name)
        .collect()
    }
}
