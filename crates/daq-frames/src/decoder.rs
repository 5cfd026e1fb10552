//! Marker-resynchronising frame decoder.
//!
//! The capture is read as little-endian 32-bit words. The scan looks for the
//! header marker; a candidate at word `h` is a frame only if word `h + 17` is
//! the tailer. Accepted frames advance the scan by 18 words, rejected
//! candidates by one, so dropped or corrupted words cost at most the frames
//! they touch.
//!
//! A sample whose CRC fails is replaced by the full-scale voltage in its own
//! channel/frame cell. Decoding as a whole fails only when no frame at all is
//! recovered.

use daq_card::frame::{
    FRAME_WORDS, HEADER_MARKER, SAMPLES_PER_FRAME, TAILER_DISTANCE, TAILER_MARKER, WORD_BYTES,
};
use daq_card::AdcChannel;
use daq_driver::{AlignedDmaBuffer, ErrorKind};

use crate::error::{FrameError, Result};
use crate::frame::AdcFrame;
use crate::params::AdcParams;

/// Per-channel voltages of every recovered frame plus scan statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedCapture {
    channels: Vec<Vec<f64>>,
    /// Frames recovered.
    pub frames: usize,
    /// Channel/frame cells replaced by the full-scale sentinel.
    pub crc_rejected: usize,
    /// Header markers with no tailer 17 words later.
    pub rejected_headers: usize,
    /// Bytes past the last whole word.
    pub trailing_bytes: usize,
}

impl DecodedCapture {
    /// Voltages of `channel`, one per frame.
    #[must_use]
    pub fn channel(&self, channel: AdcChannel) -> &[f64] {
        &self.channels[channel.index()]
    }

    /// All channels, `A1` first.
    #[must_use]
    pub fn channels(&self) -> &[Vec<f64>] {
        &self.channels
    }

    /// Channel-major voltages, `A1` first.
    #[must_use]
    pub fn into_channels(self) -> Vec<Vec<f64>> {
        self.channels
    }

    /// Recovered data-integrity events, if any.
    #[must_use]
    pub const fn integrity_events(&self) -> Option<(ErrorKind, usize)> {
        if self.crc_rejected > 0 {
            Some((ErrorKind::DataIntegrity, self.crc_rejected))
        } else {
            None
        }
    }
}

/// Capture decoder for one set of ADC parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameDecoder {
    params: AdcParams,
}

impl FrameDecoder {
    /// Decoder using `params`.
    #[must_use]
    pub const fn new(params: AdcParams) -> Self {
        Self { params }
    }

    /// Parameters in use.
    #[must_use]
    pub const fn params(&self) -> &AdcParams {
        &self.params
    }

    /// Decode a filled capture buffer.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::EmptyBuffer`] for an unallocated buffer and
    /// [`FrameError::NoFrames`] if no frame is recovered.
    pub fn decode(&self, buffer: &AlignedDmaBuffer) -> Result<DecodedCapture> {
        if buffer.is_empty() {
            return Err(FrameError::EmptyBuffer);
        }
        self.decode_bytes(buffer.as_bytes())
    }

    /// Decode raw little-endian capture bytes.
    ///
    /// # Errors
    ///
    /// Same as [`Self::decode`].
    pub fn decode_bytes(&self, bytes: &[u8]) -> Result<DecodedCapture> {
        if bytes.is_empty() {
            return Err(FrameError::EmptyBuffer);
        }
        let chunks = bytes.chunks_exact(WORD_BYTES);
        let trailing_bytes = chunks.remainder().len();
        let words: Vec<u32> = chunks
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        let mut capture = self.decode_words(&words)?;
        capture.trailing_bytes = trailing_bytes;
        Ok(capture)
    }

    /// Decode a word sequence.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::NoFrames`] if no frame is recovered.
    pub fn decode_words(&self, words: &[u32]) -> Result<DecodedCapture> {
        let mut channels = vec![Vec::new(); SAMPLES_PER_FRAME];
        let mut frames = 0;
        let mut crc_rejected = 0;
        let mut rejected_headers = 0;

        let mut h = 0;
        while h < words.len() {
            if words[h] != HEADER_MARKER {
                h += 1;
                continue;
            }
            if words.get(h + TAILER_DISTANCE) != Some(&TAILER_MARKER) {
                tracing::trace!("header candidate at word {h} has no tailer");
                rejected_headers += 1;
                h += 1;
                continue;
            }

            let mut slots = [0u32; SAMPLES_PER_FRAME];
            slots.copy_from_slice(&words[h + 1..h + TAILER_DISTANCE]);
            let frame = AdcFrame::from_words(&slots);

            for channel in AdcChannel::ALL {
                let volts = frame.voltage(channel, &self.params).unwrap_or_else(|| {
                    crc_rejected += 1;
                    self.params.full_scale()
                });
                channels[channel.index()].push(volts);
            }
            frames += 1;
            h += FRAME_WORDS;
        }

        if frames == 0 {
            return Err(FrameError::NoFrames {
                words: words.len(),
                rejected_headers,
            });
        }
        if crc_rejected > 0 || rejected_headers > 0 {
            tracing::warn!(
                "decoded {frames} frames: {crc_rejected} samples failed CRC, \
                 {rejected_headers} header candidates rejected"
            );
        } else {
            tracing::debug!("decoded {frames} frames");
        }

        Ok(DecodedCapture {
            channels,
            frames,
            crc_rejected,
            rejected_headers,
            trailing_bytes: 0,
        })
    }
}
