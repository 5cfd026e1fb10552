//! ADC sample frame wire format.
//!
//! The ADC controller streams frames into card DDR as 32-bit little-endian
//! words:
//!
//! ```text
//! word  0        HEADER   0x0000_FFF0
//! words 1..=16   SAMPLE   [sample:16][crc_high:8][crc_low:8]
//! word  17       TAILER   0x0000_FF0F
//! ```
//!
//! `crc_high` protects the high byte of the sample, `crc_low` the low byte;
//! see [`crate::crc`].
//!
//! Sixteen logical channels exist (two banks of eight, `A1..A8` and
//! `B1..B8`). Which slot carries which channel is a per-deployment mapping.

use std::fmt;

/// Frame start marker.
pub const HEADER_MARKER: u32 = 0x0000_FFF0;

/// Frame end marker.
pub const TAILER_MARKER: u32 = 0x0000_FF0F;

/// Sample slots per frame.
pub const SAMPLES_PER_FRAME: usize = 16;

/// Words per frame: header, samples, tailer.
pub const FRAME_WORDS: usize = SAMPLES_PER_FRAME + 2;

/// Bytes per frame word.
pub const WORD_BYTES: usize = 4;

/// Bytes per frame.
pub const FRAME_BYTES: usize = FRAME_WORDS * WORD_BYTES;

/// Word distance from header to tailer.
pub const TAILER_DISTANCE: usize = FRAME_WORDS - 1;

/// Native sample width of the ADC.
pub const SAMPLE_WIDTH_BITS: u32 = 16;

/// One decoded sample slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SampleWord {
    /// Raw two's-complement sample.
    pub sample: u16,
    /// CRC byte covering the sample's high byte.
    pub crc_high: u8,
    /// CRC byte covering the sample's low byte.
    pub crc_low: u8,
}

impl SampleWord {
    /// Split a frame word into its fields.
    #[must_use]
    pub const fn from_word(word: u32) -> Self {
        Self {
            sample: (word >> 16) as u16,
            crc_high: (word >> 8) as u8,
            crc_low: word as u8,
        }
    }

    /// Pack the fields back into a frame word.
    #[must_use]
    pub const fn to_word(self) -> u32 {
        ((self.sample as u32) << 16) | ((self.crc_high as u32) << 8) | self.crc_low as u32
    }

    /// High byte of the sample.
    #[must_use]
    pub const fn sample_high(self) -> u8 {
        (self.sample >> 8) as u8
    }

    /// Low byte of the sample.
    #[must_use]
    pub const fn sample_low(self) -> u8 {
        self.sample as u8
    }
}

/// Logical ADC channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum AdcChannel {
    A1 = 0,
    A2,
    A3,
    A4,
    A5,
    A6,
    A7,
    A8,
    B1,
    B2,
    B3,
    B4,
    B5,
    B6,
    B7,
    B8,
}

impl AdcChannel {
    /// All channels in index order.
    pub const ALL: [Self; SAMPLES_PER_FRAME] = [
        Self::A1,
        Self::A2,
        Self::A3,
        Self::A4,
        Self::A5,
        Self::A6,
        Self::A7,
        Self::A8,
        Self::B1,
        Self::B2,
        Self::B3,
        Self::B4,
        Self::B5,
        Self::B6,
        Self::B7,
        Self::B8,
    ];

    /// Channel index in `0..16`.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Channel for an index, `None` outside `0..16`.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < SAMPLES_PER_FRAME {
            Some(Self::ALL[index])
        } else {
            None
        }
    }
}

impl fmt::Display for AdcChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let i = self.index();
        let bank = if i < 8 { 'A' } else { 'B' };
        write!(f, "{bank}{}", i % 8 + 1)
    }
}
