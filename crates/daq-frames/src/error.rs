//! Error types for frame decoding

use daq_driver::DaqError;
use thiserror::Error;

/// Result type alias for frame decoding
pub type Result<T> = std::result::Result<T, FrameError>;

/// Errors that can occur while decoding a capture
#[derive(Debug, Error)]
pub enum FrameError {
    /// Capture buffer is unallocated or empty
    #[error("Capture buffer is empty")]
    EmptyBuffer,

    /// ADC hardware features were never loaded
    #[error("ADC hardware features not loaded (hardware-features.adc)")]
    ParamsMissing,

    /// ADC parameters do not describe the supported frame format
    #[error("Invalid ADC parameters: {reason}")]
    InvalidParams {
        /// Reason for rejection
        reason: String,
    },

    /// Channel map is not a permutation of the frame slots
    #[error("Invalid channel map: {reason}")]
    InvalidChannelMap {
        /// Reason for rejection
        reason: String,
    },

    /// No header/tailer pair was found anywhere in the capture
    #[error("No frames recovered from {words} words ({rejected_headers} header candidates rejected)")]
    NoFrames {
        /// Words scanned
        words: usize,
        /// Header markers without a matching tailer
        rejected_headers: usize,
    },

    /// Transport error while reading a capture
    #[error(transparent)]
    Transport(#[from] DaqError),
}

impl FrameError {
    /// Create an invalid-parameters error
    pub fn invalid_params(reason: impl Into<String>) -> Self {
        Self::InvalidParams {
            reason: reason.into(),
        }
    }

    /// Create an invalid-channel-map error
    pub fn invalid_channel_map(reason: impl Into<String>) -> Self {
        Self::InvalidChannelMap {
            reason: reason.into(),
        }
    }
}
