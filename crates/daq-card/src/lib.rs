//! Card model for the XDMA acquisition board.
//!
//! This crate has **no dependencies** and **no hardware access**. It is a
//! pure description of the card as the host sees it: the AXI-Lite register
//! set of the ADC and AXI DMA sub-controllers, the DMA bridge limits, and the
//! wire format of the ADC sample frames the card writes into DDR.
//!
//! Register *offsets* are deployment-specific and come from the configuration
//! record loaded by `daq-driver`; this crate only names the registers and
//! records which of them are read-only.
//!
//! # Crate organisation
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`regs`] | Closed register enumeration, sub-controller blocks, DMASR bits |
//! | [`bus`] | DMA alignment, transfer ceiling, transfer direction |
//! | [`frame`] | Header/tailer markers, sample word layout, ADC channels |
//! | [`crc`] | CRC-8/CDMA2000 lookup table, built at compile time |

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod bus;
pub mod crc;
pub mod frame;
pub mod regs;

pub use bus::Direction;
pub use frame::{AdcChannel, SampleWord};
pub use regs::{RegisterBlock, RegisterId, UnknownRegister};
