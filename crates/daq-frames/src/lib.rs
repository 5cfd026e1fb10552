#![deny(unsafe_code)]

//! ADC capture decoder
//!
//! Turns the raw bytes of a DDR capture into per-channel voltages.
//!
//! # Format
//!
//! A capture is a stream of little-endian 32-bit words holding 72-byte frames:
//!
//! - **Header** (1 word): `0x0000FFF0`
//! - **Samples** (16 words): `sample[31:16] | crc_high[15:8] | crc_low[7:0]`
//! - **Tailer** (1 word): `0x0000FF0F`
//!
//! Each CRC byte is CRC-8/CDMA2000 over the matching sample byte. Frames are
//! found by marker, not by position, so a capture may start mid-frame.
//!
//! # Example
//!
//! ```no_run
//! use daq_driver::FpgaController;
//! use daq_frames::{AdcParams, FrameDecoder};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let ctl = FpgaController::from_json_file("fpga.json")?;
//! let params = AdcParams::from_config(ctl.config())?;
//! let capture = ctl.read_ddr(0, 72 * 1024, 0)?;
//!
//! let decoded = FrameDecoder::new(params).decode(&capture)?;
//! println!("{} frames, {} bad samples", decoded.frames, decoded.crc_rejected);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod decoder;
mod error;
pub mod frame;
pub mod params;

pub use decoder::{DecodedCapture, FrameDecoder};
pub use error::{FrameError, Result};
pub use frame::AdcFrame;
pub use params::{AdcParams, ChannelMap, CrcCheck};

/// Commonly used types.
pub mod prelude {
    pub use crate::{AdcParams, ChannelMap, CrcCheck, DecodedCapture, FrameDecoder, FrameError};
    pub use daq_card::AdcChannel;
}
