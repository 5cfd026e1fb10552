//! Error types for card transport operations

use std::path::PathBuf;

use daq_card::{Direction, RegisterId, UnknownRegister};
use thiserror::Error;

/// Result type alias for transport operations
pub type Result<T> = std::result::Result<T, DaqError>;

/// Failure class of an error.
///
/// Every class except [`ErrorKind::DataIntegrity`] is fatal to the call that
/// raised it. Data-integrity events are recovered locally by the decoder and
/// only ever appear as counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing or incomplete configuration, unknown register, bad channel.
    Configuration,
    /// Open/seek/read/write failed or moved an unexpected byte count.
    Io,
    /// DDR window, transfer ceiling or buffer view exceeded.
    Bounds,
    /// Sample CRC mismatch.
    DataIntegrity,
}

/// Errors raised by the transport engine
#[derive(Debug, Error)]
pub enum DaqError {
    /// A configuration section needed by the call was never loaded
    #[error("Configuration incomplete: missing {section}")]
    ConfigIncomplete {
        /// Section name as it appears in the configuration document
        section: &'static str,
    },

    /// The configuration document could not be read or parsed
    #[error("Configuration invalid: {reason}")]
    ConfigInvalid {
        /// Reason for failure
        reason: String,
    },

    /// A numeric configuration or command-line value did not parse
    #[error("Invalid number: {text:?}")]
    InvalidNumber {
        /// Offending text
        text: String,
    },

    /// Register name or selector not in the register table
    #[error("Unknown register: {name}")]
    UnknownRegister {
        /// Name or selector as given
        name: String,
    },

    /// Write attempted on a read-only register
    #[error("Register {register} is read-only")]
    ReadOnlyRegister {
        /// Register that was targeted
        register: RegisterId,
    },

    /// Numeric direction selector outside `0..=1`
    #[error("Invalid DMA direction selector {value} (required: 0 or 1)")]
    InvalidDirection {
        /// Selector as given
        value: u8,
    },

    /// DMA channel index past the end of the direction's node list
    #[error("Invalid DMA channel (required: < {available}), current = {channel} ({direction})")]
    InvalidChannel {
        /// Transfer direction
        direction: Direction,
        /// Requested channel
        channel: usize,
        /// Number of configured channels for the direction
        available: usize,
    },

    /// Zero-length allocation or transfer
    #[error("Zero-length {operation}")]
    ZeroLength {
        /// Operation that was given zero bytes
        operation: &'static str,
    },

    /// `ddr_offset + byte_count` exceeds DDR capacity
    #[error("DDR access out of bounds: offset {offset:#x} + {bytes} bytes > capacity {capacity} bytes")]
    DdrOutOfBounds {
        /// DDR offset of the transfer
        offset: u64,
        /// Transfer length
        bytes: u64,
        /// DDR capacity in bytes
        capacity: u64,
    },

    /// Single transfer larger than the configured maximum
    #[error("Transfer of {bytes} bytes exceeds maximum of {max} bytes")]
    TransferTooLarge {
        /// Requested length
        bytes: u64,
        /// Configured maximum
        max: u64,
    },

    /// Typed view or transfer larger than the buffer
    #[error("Buffer view of {requested} bytes exceeds buffer length {available}")]
    ViewOutOfBounds {
        /// Bytes requested
        requested: usize,
        /// Bytes held by the buffer
        available: usize,
    },

    /// Operation needs an allocated buffer
    #[error("Buffer is not allocated")]
    EmptyBuffer,

    /// Platform allocator refused the aligned block
    #[error("Failed to allocate {bytes} bytes aligned to {align}")]
    Allocation {
        /// Bytes requested (including alignment slack)
        bytes: usize,
        /// Requested alignment
        align: usize,
    },

    /// Device node or file could not be opened
    #[error("Cannot open {}: {source}", path.display())]
    Open {
        /// Path that was opened
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Seek failed or landed off target
    #[error("Seek on {} to {expected:#x} landed at {actual:#x}", path.display())]
    SeekMismatch {
        /// Device node or file
        path: PathBuf,
        /// Requested absolute offset
        expected: u64,
        /// Offset reported by the kernel
        actual: u64,
    },

    /// Read or write moved fewer bytes than requested
    #[error("Short {operation} on {}: {actual} of {expected} bytes", path.display())]
    ShortTransfer {
        /// `"read"` or `"write"`
        operation: &'static str,
        /// Device node or file
        path: PathBuf,
        /// Bytes requested
        expected: usize,
        /// Bytes moved
        actual: usize,
    },

    /// I/O error during device communication
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error
        #[from]
        source: std::io::Error,
    },
}

impl DaqError {
    /// Failure class of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::ConfigIncomplete { .. }
            | Self::ConfigInvalid { .. }
            | Self::InvalidNumber { .. }
            | Self::UnknownRegister { .. }
            | Self::ReadOnlyRegister { .. }
            | Self::InvalidDirection { .. }
            | Self::InvalidChannel { .. } => ErrorKind::Configuration,
            Self::ZeroLength { .. }
            | Self::DdrOutOfBounds { .. }
            | Self::TransferTooLarge { .. }
            | Self::ViewOutOfBounds { .. }
            | Self::EmptyBuffer => ErrorKind::Bounds,
            Self::Allocation { .. }
            | Self::Open { .. }
            | Self::SeekMismatch { .. }
            | Self::ShortTransfer { .. }
            | Self::Io { .. } => ErrorKind::Io,
        }
    }

    /// Create a configuration-incomplete error
    pub const fn incomplete(section: &'static str) -> Self {
        Self::ConfigIncomplete { section }
    }

    /// Create a configuration-invalid error
    pub fn config_invalid(reason: impl Into<String>) -> Self {
        Self::ConfigInvalid {
            reason: reason.into(),
        }
    }

    /// Create an open error
    pub fn open(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Open {
            path: path.into(),
            source,
        }
    }

    /// Create a short-transfer error
    pub fn short(
        operation: &'static str,
        path: impl Into<PathBuf>,
        expected: usize,
        actual: usize,
    ) -> Self {
        Self::ShortTransfer {
            operation,
            path: path.into(),
            expected,
            actual,
        }
    }
}

impl From<UnknownRegister> for DaqError {
    fn from(err: UnknownRegister) -> Self {
        Self::UnknownRegister { name: err.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_message_names_valid_range() {
        let err = DaqError::InvalidChannel {
            direction: Direction::CardToHost,
            channel: 3,
            available: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("required: < 2"), "{msg}");
        assert!(msg.contains("current = 3"), "{msg}");
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn kinds() {
        assert_eq!(DaqError::EmptyBuffer.kind(), ErrorKind::Bounds);
        assert_eq!(
            DaqError::short("read", "/dev/xdma0_c2h_0", 8, 4).kind(),
            ErrorKind::Io
        );
        assert_eq!(
            DaqError::from(UnknownRegister("FOO".into())).kind(),
            ErrorKind::Configuration
        );
        assert_eq!(
            DaqError::from(std::io::Error::other("boom")).kind(),
            ErrorKind::Io
        );
    }
}
