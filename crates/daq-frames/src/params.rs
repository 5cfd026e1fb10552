//! ADC parameters the decoder needs: scaling, slot mapping, CRC policy.

use std::fmt;
use std::str::FromStr;

use daq_card::crc::crc8;
use daq_card::frame::{FRAME_BYTES, SAMPLES_PER_FRAME, SAMPLE_WIDTH_BITS};
use daq_card::{AdcChannel, SampleWord};
use daq_driver::{AdcFeatures, FpgaConfig};

use crate::error::{FrameError, Result};

/// How the two CRC bytes of a sample word are checked.
///
/// The default compares each CRC byte with the CRC table entry of the
/// matching sample byte (`PerByte { init: 0 }`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrcCheck {
    /// `crc_high == crc8(init, [sample_high])` and
    /// `crc_low == crc8(init, [sample_low])`.
    PerByte {
        /// CRC register start value.
        init: u8,
    },
    /// Accept every sample.
    Disabled,
}

impl Default for CrcCheck {
    fn default() -> Self {
        Self::PerByte { init: 0 }
    }
}

impl CrcCheck {
    /// `true` if `word`'s CRC bytes match its sample.
    #[must_use]
    pub fn verify(self, word: SampleWord) -> bool {
        match self {
            Self::PerByte { init } => {
                crc8(init, &[word.sample_high()]) == word.crc_high
                    && crc8(init, &[word.sample_low()]) == word.crc_low
            }
            Self::Disabled => true,
        }
    }

    /// Sample word carrying `sample` with CRC bytes this policy accepts.
    #[must_use]
    pub fn seal(self, sample: u16) -> SampleWord {
        let init = match self {
            Self::PerByte { init } => init,
            Self::Disabled => 0,
        };
        let [high, low] = sample.to_be_bytes();
        SampleWord {
            sample,
            crc_high: crc8(init, &[high]),
            crc_low: crc8(init, &[low]),
        }
    }
}

/// Storage slot of each logical channel within a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelMap {
    slots: [usize; SAMPLES_PER_FRAME],
}

impl Default for ChannelMap {
    fn default() -> Self {
        Self::identity()
    }
}

impl ChannelMap {
    /// Channel `i` stored in slot `i`.
    #[must_use]
    pub const fn identity() -> Self {
        let mut slots = [0; SAMPLES_PER_FRAME];
        let mut i = 0;
        while i < SAMPLES_PER_FRAME {
            slots[i] = i;
            i += 1;
        }
        Self { slots }
    }

    /// Map where `slots[channel index]` is that channel's storage slot.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::InvalidChannelMap`] unless `slots` is a
    /// permutation of `0..16`.
    pub fn new(slots: [usize; SAMPLES_PER_FRAME]) -> Result<Self> {
        let mut seen = [false; SAMPLES_PER_FRAME];
        for (channel, &slot) in slots.iter().enumerate() {
            let Some(flag) = seen.get_mut(slot) else {
                return Err(FrameError::invalid_channel_map(format!(
                    "slot {slot} for channel {channel} is outside 0..{SAMPLES_PER_FRAME}"
                )));
            };
            if *flag {
                return Err(FrameError::invalid_channel_map(format!(
                    "slot {slot} assigned twice"
                )));
            }
            *flag = true;
        }
        Ok(Self { slots })
    }

    /// Storage slot of `channel`.
    #[must_use]
    pub const fn slot(&self, channel: AdcChannel) -> usize {
        self.slots[channel.index()]
    }
}

impl FromStr for ChannelMap {
    type Err = FrameError;

    /// Sixteen comma-separated slot numbers, `A1` first.
    fn from_str(s: &str) -> Result<Self> {
        let parsed: Vec<usize> = s
            .split(',')
            .map(|t| {
                t.trim()
                    .parse()
                    .map_err(|_| FrameError::invalid_channel_map(format!("not a slot: {t:?}")))
            })
            .collect::<Result<_>>()?;
        let slots: [usize; SAMPLES_PER_FRAME] = parsed.try_into().map_err(|v: Vec<usize>| {
            FrameError::invalid_channel_map(format!(
                "expected {SAMPLES_PER_FRAME} slots, got {}",
                v.len()
            ))
        })?;
        Self::new(slots)
    }
}

impl fmt::Display for ChannelMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, slot) in self.slots.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{slot}")?;
        }
        Ok(())
    }
}

/// Everything the decoder needs to turn a capture into volts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdcParams {
    /// Half of the input span in volts.
    pub voltage_range_radius: f64,
    /// Significant bits of each sample.
    pub sample_width_bits: u32,
    /// Slot mapping.
    pub channel_map: ChannelMap,
    /// CRC policy.
    pub crc: CrcCheck,
}

impl AdcParams {
    /// Parameters from the `hardware-features.adc` section of `config`.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::ParamsMissing`] if the section was not loaded,
    /// or [`FrameError::InvalidParams`] if it describes another frame format.
    pub fn from_config(config: &FpgaConfig) -> Result<Self> {
        let adc = config.hardware.adc.as_ref().ok_or(FrameError::ParamsMissing)?;
        Self::from_features(adc)
    }

    /// Parameters from loaded ADC features.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::InvalidParams`] unless the features describe
    /// 16 channels, 72-byte frames and a sample width of 1 to 16 bits.
    pub fn from_features(adc: &AdcFeatures) -> Result<Self> {
        if adc.channels as usize != SAMPLES_PER_FRAME {
            return Err(FrameError::invalid_params(format!(
                "{} channels, decoder handles {SAMPLES_PER_FRAME}",
                adc.channels
            )));
        }
        if adc.frame_length_bytes != FRAME_BYTES {
            return Err(FrameError::invalid_params(format!(
                "frame length {} bytes, decoder handles {FRAME_BYTES}",
                adc.frame_length_bytes
            )));
        }
        Self::new(adc.voltage_range_radius_v, adc.data_width_bits)
    }

    /// Parameters with the identity map and default CRC policy.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::InvalidParams`] for a non-positive radius or a
    /// width outside `1..=16`.
    pub fn new(voltage_range_radius: f64, sample_width_bits: u32) -> Result<Self> {
        if !(voltage_range_radius.is_finite() && voltage_range_radius > 0.0) {
            return Err(FrameError::invalid_params(format!(
                "voltage range radius {voltage_range_radius}"
            )));
        }
        if !(1..=SAMPLE_WIDTH_BITS).contains(&sample_width_bits) {
            return Err(FrameError::invalid_params(format!(
                "sample width {sample_width_bits} bits"
            )));
        }
        Ok(Self {
            voltage_range_radius,
            sample_width_bits,
            channel_map: ChannelMap::identity(),
            crc: CrcCheck::default(),
        })
    }

    /// Replace the channel map.
    #[must_use]
    pub const fn with_channel_map(mut self, map: ChannelMap) -> Self {
        self.channel_map = map;
        self
    }

    /// Replace the CRC policy.
    #[must_use]
    pub const fn with_crc(mut self, crc: CrcCheck) -> Self {
        self.crc = crc;
        self
    }

    /// Value written for a sample that failed its CRC.
    #[must_use]
    pub const fn full_scale(&self) -> f64 {
        self.voltage_range_radius
    }

    /// Two's-complement value of the low `sample_width_bits` of `raw`.
    #[must_use]
    pub fn signed(&self, raw: u16) -> i32 {
        let shift = 32 - self.sample_width_bits;
        (i32::from(raw) << shift) >> shift
    }

    /// `signed * radius / 2^(width-1)`.
    #[must_use]
    pub fn to_voltage(&self, raw: u16) -> f64 {
        let scale = f64::from(1u32 << (self.sample_width_bits - 1));
        f64::from(self.signed(raw)) * self.voltage_range_radius / scale
    }
}
