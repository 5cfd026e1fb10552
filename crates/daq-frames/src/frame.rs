//! One accepted frame: sixteen sample slots between header and tailer.

use daq_card::frame::{HEADER_MARKER, SAMPLES_PER_FRAME, TAILER_MARKER};
use daq_card::{AdcChannel, SampleWord};

use crate::params::AdcParams;

/// Sample slots of one frame, in storage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AdcFrame {
    slots: [SampleWord; SAMPLES_PER_FRAME],
}

impl AdcFrame {
    /// Frame from the sixteen words between header and tailer.
    #[must_use]
    pub fn from_words(words: &[u32; SAMPLES_PER_FRAME]) -> Self {
        Self {
            slots: words.map(SampleWord::from_word),
        }
    }

    /// Frame from already-split slots.
    #[must_use]
    pub const fn from_slots(slots: [SampleWord; SAMPLES_PER_FRAME]) -> Self {
        Self { slots }
    }

    /// Slot `k` in storage order.
    #[must_use]
    pub const fn slot(&self, k: usize) -> Option<SampleWord> {
        if k < SAMPLES_PER_FRAME {
            Some(self.slots[k])
        } else {
            None
        }
    }

    /// Sample word carrying `channel` under `params`' channel map.
    #[must_use]
    pub const fn word(&self, channel: AdcChannel, params: &AdcParams) -> SampleWord {
        self.slots[params.channel_map.slot(channel)]
    }

    /// Voltage of `channel`, or `None` if its CRC check fails.
    #[must_use]
    pub fn voltage(&self, channel: AdcChannel, params: &AdcParams) -> Option<f64> {
        let word = self.word(channel, params);
        params
            .crc
            .verify(word)
            .then(|| params.to_voltage(word.sample))
    }

    /// Full wire image: header, the sixteen slots, tailer.
    #[must_use]
    pub fn to_words(&self) -> Vec<u32> {
        let mut words = Vec::with_capacity(SAMPLES_PER_FRAME + 2);
        words.push(HEADER_MARKER);
        words.extend(self.slots.iter().map(|w| w.to_word()));
        words.push(TAILER_MARKER);
        words
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::CrcCheck;
    use daq_card::frame::FRAME_WORDS;

    #[test]
    fn voltage_follows_channel_map() {
        let crc = CrcCheck::default();
        let mut slots = [crc.seal(0); SAMPLES_PER_FRAME];
        slots[15] = crc.seal(0x4000);
        let frame = AdcFrame::from_slots(slots);

        let mut map = [0usize; SAMPLES_PER_FRAME];
        for (i, s) in map.iter_mut().enumerate() {
            *s = SAMPLES_PER_FRAME - 1 - i;
        }
        let params = AdcParams::new(10.0, 16)
            .unwrap()
            .with_channel_map(crate::params::ChannelMap::new(map).unwrap());

        assert_eq!(frame.voltage(AdcChannel::A1, &params), Some(5.0));
        assert_eq!(frame.voltage(AdcChannel::B8, &params), Some(0.0));
    }

    #[test]
    fn bad_crc_yields_none() {
        let mut slot = CrcCheck::default().seal(0x0100);
        slot.crc_high ^= 0xFF;
        let mut slots = [CrcCheck::default().seal(0); SAMPLES_PER_FRAME];
        slots[2] = slot;
        let frame = AdcFrame::from_slots(slots);
        let params = AdcParams::new(10.0, 16).unwrap();
        assert_eq!(frame.voltage(AdcChannel::A3, &params), None);
        assert!(frame.voltage(AdcChannel::A2, &params).is_some());
    }

    #[test]
    fn wire_image() {
        let frame = AdcFrame::default();
        let words = frame.to_words();
        assert_eq!(words.len(), FRAME_WORDS);
        assert_eq!(words[0], HEADER_MARKER);
        assert_eq!(words[FRAME_WORDS - 1], TAILER_MARKER);
        let inner: [u32; SAMPLES_PER_FRAME] = words[1..=SAMPLES_PER_FRAME].try_into().unwrap();
        assert_eq!(AdcFrame::from_words(&inner), frame);
    }
}
