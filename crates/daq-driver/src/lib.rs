//! Host-side transport for the XDMA acquisition card.
//!
//! Talks to the card through the character devices of the Xilinx XDMA
//! kernel driver. No kernel buffers, interrupts or descriptor rings are
//! managed here; the device files are treated as byte-addressable with
//! positioned read/write.
//!
//! # Layers
//!
//! ```text
//! FpgaController            public register / DMA API
//!   ├── RegisterIoChannel   AXI-Lite, 4-byte transactions on the user node
//!   ├── BlockTransferChannel AXI-Full, bounded transfers on c2h/h2c nodes
//!   └── AddressResolver     register / DDR offset → device-file offset
//! AlignedDmaBuffer          4096-aligned transfer unit
//! FpgaConfig                immutable, complete-or-absent record
//! ```
//!
//! # Quick start
//!
//! ```no_run
//! use daq_card::RegisterId;
//! use daq_driver::FpgaController;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let ctl = FpgaController::from_json_file("fpga.json")?;
//! ctl.write_register(RegisterId::Sp, 1024)?;
//! let frames = ctl.read_register(RegisterId::Ngf)?;
//! let capture = ctl.read_ddr(0, u64::from(frames) * 72, 0)?;
//! println!("{} bytes captured", capture.len());
//! # Ok(())
//! # }
//! ```
//!
//! All I/O is synchronous and blocking. Every call opens, uses and closes its
//! own device node, so independent transfers may run on separate threads.

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]

pub mod address;
pub mod buffer;
pub mod config;
pub mod controller;
pub mod device;
mod error;
pub mod io;
pub mod register;
#[cfg(test)]
mod testing;
pub mod transfer;

pub use address::AddressResolver;
pub use buffer::AlignedDmaBuffer;
pub use config::{
    parse_number, AdcFeatures, AdcRegisterMap, BusAddressMap, ConfigView, DdrFeatures,
    DeviceNodeSet, DmaRegisterMap, FpgaConfig, HardwareFeatures,
};
pub use controller::FpgaController;
pub use error::{DaqError, ErrorKind, Result};
pub use register::RegisterIoChannel;
pub use transfer::{BlockTransferChannel, DmaTransfer};

/// Commonly used types.
pub mod prelude {
    pub use crate::{
        AlignedDmaBuffer, DaqError, DmaTransfer, ErrorKind, FpgaConfig, FpgaController, Result,
    };
    pub use daq_card::{Direction, RegisterId};
}
