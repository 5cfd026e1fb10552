//! Card configuration record and its JSON loader.
//!
//! The record is immutable once built. Each section is optional: a section
//! whose fields were missing or malformed in the document loads as `None`, and
//! the transport engine reports it as [`DaqError::ConfigIncomplete`] at first
//! use rather than at load time.
//!
//! # Document layout
//!
//! ```json
//! {
//!   "address-map": {
//!     "axi-lite": {
//!       "bus-address-offset": "0x0000_0000",
//!       "adc": { "address-offset": "0x0001_0000",
//!                "registers-address-offset": { "SCI-address-offset": "0x00", ... } },
//!       "dma": { "address-offset": "0x0002_0000",
//!                "registers-address-offset": { "S2MM_DMACR-address-offset": "0x30", ... } }
//!     },
//!     "axi-full": { "bus-address-offset": "0x0", "ddr": { "address-offset": "0x8000_0000" } }
//!   },
//!   "hardware-features": {
//!     "adc": { "data-width-bits": "16", "channels": "16", "max-sampling-frequency-hz": "500000",
//!              "voltage-range-radius-v": "10", "frame-length-bytes": "72" },
//!     "ddr": { "memory-capacity-megabytes": "1024", "data-width-bits": "64" }
//!   },
//!   "xdma-driver": {
//!     "device-files": { "xdma-control": "/dev/xdma0_control", "xdma-user": "/dev/xdma0_user",
//!                       "xdma-h2c": ["/dev/xdma0_h2c_0"], "xdma-c2h": ["/dev/xdma0_c2h_0"],
//!                       "xdma-events": ["/dev/xdma0_events_0"] },
//!     "max-transfer-size-bytes": "2147479552"
//!   }
//! }
//! ```
//!
//! Every number is a string. Addresses and offsets are hex with a `0x`
//! prefix and optional `_` separators; counts and sizes are decimal.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use daq_card::bus::LINUX_DMA_MAX_TRANSFER_BYTES;
use daq_card::RegisterId;
use serde::Deserialize;

use crate::error::{DaqError, Result};

// ── Typed record ─────────────────────────────────────────────────────────────

/// Bus bases of the two AXI windows and the sub-controllers inside them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusAddressMap {
    /// AXI-Lite window base on the card bus.
    pub axi_lite_base: u64,
    /// ADC controller offset within AXI-Lite.
    pub adc_base: u64,
    /// AXI DMA controller offset within AXI-Lite.
    pub dma_base: u64,
    /// AXI-Full window base on the card bus.
    pub axi_full_base: u64,
    /// DDR offset within AXI-Full.
    pub ddr_base: u64,
}

/// Register offsets of the ADC controller, relative to its base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct AdcRegisterMap {
    pub sci: u64,
    pub sp: u64,
    pub sf: u64,
    pub str: u64,
    pub ngf: u64,
    pub err: u64,
}

/// Register offsets of the AXI DMA controller, relative to its base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct DmaRegisterMap {
    pub dmacr: u64,
    pub dmasr: u64,
    pub sg_ctl: u64,
    pub curdesc: u64,
    pub curdesc_msb: u64,
    pub taildesc: u64,
    pub taildesc_msb: u64,
    pub da: u64,
    pub da_msb: u64,
    pub length: u64,
}

/// Card DDR.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DdrFeatures {
    /// Capacity in megabytes (2^20 bytes).
    pub capacity_megabytes: u64,
    /// Data bus width.
    pub data_width_bits: u32,
}

impl DdrFeatures {
    /// Capacity in bytes.
    #[must_use]
    pub const fn capacity_bytes(&self) -> u64 {
        daq_card::bus::ddr_capacity_bytes(self.capacity_megabytes)
    }
}

/// ADC front end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdcFeatures {
    /// Sample width.
    pub data_width_bits: u32,
    /// Logical channel count.
    pub channels: u32,
    /// Upper sampling rate.
    pub max_sampling_frequency_hz: u64,
    /// Half of the input span; full scale is `±radius` volts.
    pub voltage_range_radius_v: f64,
    /// Bytes per frame as written into DDR.
    pub frame_length_bytes: usize,
}

/// Hardware limits.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HardwareFeatures {
    /// DDR section.
    pub ddr: Option<DdrFeatures>,
    /// ADC section.
    pub adc: Option<AdcFeatures>,
}

/// XDMA character devices exposed by the kernel driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceNodeSet {
    /// Bridge control registers.
    pub control: PathBuf,
    /// AXI-Lite passthrough.
    pub user: PathBuf,
    /// Host-to-card DMA channels, by index.
    pub h2c: Vec<PathBuf>,
    /// Card-to-host DMA channels, by index.
    pub c2h: Vec<PathBuf>,
    /// User interrupt event nodes.
    pub events: Vec<PathBuf>,
    /// Largest single transfer, never above the platform ceiling.
    pub max_transfer_bytes: u64,
}

impl DeviceNodeSet {
    /// Build a node set, clamping `max_transfer_bytes` to the platform ceiling.
    #[must_use]
    pub fn new(
        control: impl Into<PathBuf>,
        user: impl Into<PathBuf>,
        h2c: Vec<PathBuf>,
        c2h: Vec<PathBuf>,
        events: Vec<PathBuf>,
        max_transfer_bytes: u64,
    ) -> Self {
        Self {
            control: control.into(),
            user: user.into(),
            h2c,
            c2h,
            events,
            max_transfer_bytes: clamp_transfer_size(max_transfer_bytes),
        }
    }
}

/// Clamp a configured transfer size to [`LINUX_DMA_MAX_TRANSFER_BYTES`].
#[must_use]
pub fn clamp_transfer_size(bytes: u64) -> u64 {
    if bytes > LINUX_DMA_MAX_TRANSFER_BYTES {
        tracing::debug!(
            "max transfer size {bytes} clamped to {LINUX_DMA_MAX_TRANSFER_BYTES:#x}"
        );
        LINUX_DMA_MAX_TRANSFER_BYTES
    } else {
        bytes
    }
}

/// Complete-or-absent configuration record.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FpgaConfig {
    /// `address-map` bus bases.
    pub bus: Option<BusAddressMap>,
    /// `address-map.axi-lite.adc.registers-address-offset`.
    pub adc_registers: Option<AdcRegisterMap>,
    /// `address-map.axi-lite.dma.registers-address-offset`.
    pub dma_registers: Option<DmaRegisterMap>,
    /// `hardware-features`.
    pub hardware: HardwareFeatures,
    /// `xdma-driver`.
    pub nodes: Option<DeviceNodeSet>,
}

/// Borrowed view of a configuration with every section present.
#[derive(Debug, Clone, Copy)]
pub struct ConfigView<'a> {
    /// Bus bases.
    pub bus: &'a BusAddressMap,
    /// ADC register offsets.
    pub adc_registers: &'a AdcRegisterMap,
    /// DMA register offsets.
    pub dma_registers: &'a DmaRegisterMap,
    /// DDR limits.
    pub ddr: &'a DdrFeatures,
    /// ADC front end.
    pub adc: &'a AdcFeatures,
    /// Device nodes.
    pub nodes: &'a DeviceNodeSet,
}

impl FpgaConfig {
    /// Borrow every section, or name the first one missing.
    ///
    /// # Errors
    ///
    /// Returns [`DaqError::ConfigIncomplete`] if any section is absent.
    pub fn require(&self) -> Result<ConfigView<'_>> {
        Ok(ConfigView {
            bus: self
                .bus
                .as_ref()
                .ok_or(DaqError::incomplete("address-map"))?,
            adc_registers: self
                .adc_registers
                .as_ref()
                .ok_or(DaqError::incomplete("address-map.axi-lite.adc.registers-address-offset"))?,
            dma_registers: self
                .dma_registers
                .as_ref()
                .ok_or(DaqError::incomplete("address-map.axi-lite.dma.registers-address-offset"))?,
            ddr: self
                .hardware
                .ddr
                .as_ref()
                .ok_or(DaqError::incomplete("hardware-features.ddr"))?,
            adc: self
                .hardware
                .adc
                .as_ref()
                .ok_or(DaqError::incomplete("hardware-features.adc"))?,
            nodes: self
                .nodes
                .as_ref()
                .ok_or(DaqError::incomplete("xdma-driver"))?,
        })
    }

    /// Load a configuration document from disk.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or is not valid JSON. Missing
    /// or malformed sections are not errors here.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| DaqError::open(path, e))?;
        tracing::debug!("Loading configuration from {}", path.display());
        Self::from_json_str(&text)
    }

    /// Parse a configuration document.
    ///
    /// # Errors
    ///
    /// Returns error if `text` is not valid JSON of the expected shape.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let doc: RawDocument = serde_json::from_str(text)
            .map_err(|e| DaqError::config_invalid(format!("JSON parse error: {e}")))?;
        Ok(doc.into_config())
    }
}

impl ConfigView<'_> {
    /// Offset of `id` relative to its sub-controller base.
    #[must_use]
    pub const fn register_offset(&self, id: RegisterId) -> u64 {
        let adc = self.adc_registers;
        let dma = self.dma_registers;
        match id {
            RegisterId::Sci => adc.sci,
            RegisterId::Sp => adc.sp,
            RegisterId::Sf => adc.sf,
            RegisterId::Str => adc.str,
            RegisterId::Ngf => adc.ngf,
            RegisterId::Err => adc.err,
            RegisterId::Dmacr => dma.dmacr,
            RegisterId::Dmasr => dma.dmasr,
            RegisterId::SgCtl => dma.sg_ctl,
            RegisterId::Curdesc => dma.curdesc,
            RegisterId::CurdescMsb => dma.curdesc_msb,
            RegisterId::Taildesc => dma.taildesc,
            RegisterId::TaildescMsb => dma.taildesc_msb,
            RegisterId::Da => dma.da,
            RegisterId::DaMsb => dma.da_msb,
            RegisterId::Length => dma.length,
        }
    }
}

// ── Number parsing ───────────────────────────────────────────────────────────

/// Parse a `0x`-prefixed hex string, allowing `_` separators.
///
/// # Errors
///
/// Returns [`DaqError::InvalidNumber`] without the prefix or on any non-hex
/// digit.
pub fn parse_hex(text: &str) -> Result<u64> {
    let invalid = || DaqError::InvalidNumber {
        text: text.to_string(),
    };
    let digits = text
        .trim()
        .strip_prefix("0x")
        .or_else(|| text.trim().strip_prefix("0X"))
        .ok_or_else(invalid)?;
    let digits: String = digits.chars().filter(|&c| c != '_').collect();
    if digits.is_empty() {
        return Err(invalid());
    }
    u64::from_str_radix(&digits, 16).map_err(|_| invalid())
}

/// Parse an unsigned decimal string.
///
/// # Errors
///
/// Returns [`DaqError::InvalidNumber`] on anything but ASCII digits.
pub fn parse_decimal(text: &str) -> Result<u64> {
    let t = text.trim();
    if t.is_empty() || !t.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DaqError::InvalidNumber {
            text: text.to_string(),
        });
    }
    t.parse().map_err(|_| DaqError::InvalidNumber {
        text: text.to_string(),
    })
}

/// Parse either a `0x` hex string or a decimal string.
///
/// # Errors
///
/// Returns [`DaqError::InvalidNumber`] if neither form matches.
pub fn parse_number(text: &str) -> Result<u64> {
    let t = text.trim();
    if t.starts_with("0x") || t.starts_with("0X") {
        parse_hex(t)
    } else {
        parse_decimal(t)
    }
}

// ── Document shape ───────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
struct RawDocument {
    address_map: Option<RawAddressMap>,
    hardware_features: Option<RawHardware>,
    xdma_driver: Option<RawXdmaDriver>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
struct RawAddressMap {
    axi_lite: Option<RawAxiLite>,
    axi_full: Option<RawAxiFull>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
struct RawAxiLite {
    bus_address_offset: Option<String>,
    adc: Option<RawController>,
    dma: Option<RawController>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
struct RawController {
    address_offset: Option<String>,
    registers_address_offset: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
struct RawAxiFull {
    bus_address_offset: Option<String>,
    ddr: Option<RawDdrWindow>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
struct RawDdrWindow {
    address_offset: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
struct RawHardware {
    adc: Option<RawAdc>,
    ddr: Option<RawDdr>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
struct RawAdc {
    data_width_bits: Option<String>,
    channels: Option<String>,
    max_sampling_frequency_hz: Option<String>,
    voltage_range_radius_v: Option<String>,
    frame_length_bytes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
struct RawDdr {
    memory_capacity_megabytes: Option<String>,
    data_width_bits: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
struct RawXdmaDriver {
    device_files: Option<RawDeviceFiles>,
    max_transfer_size_bytes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
struct RawDeviceFiles {
    xdma_control: Option<String>,
    xdma_user: Option<String>,
    xdma_h2c: Option<Vec<String>>,
    xdma_c2h: Option<Vec<String>>,
    xdma_events: Option<Vec<String>>,
}

/// Field lookup that logs what is missing and yields `None`.
fn field<'a>(value: Option<&'a String>, name: &str) -> Option<&'a str> {
    if value.is_none() {
        tracing::warn!("configuration field {name} missing");
    }
    value.map(String::as_str)
}

fn hex_field(value: Option<&String>, name: &str) -> Option<u64> {
    let text = field(value, name)?;
    parse_hex(text)
        .map_err(|e| tracing::warn!("configuration field {name}: {e}"))
        .ok()
}

fn int_field(value: Option<&String>, name: &str) -> Option<u64> {
    let text = field(value, name)?;
    parse_decimal(text)
        .map_err(|e| tracing::warn!("configuration field {name}: {e}"))
        .ok()
}

fn narrow<T: TryFrom<u64>>(value: u64, name: &str) -> Option<T> {
    T::try_from(value)
        .map_err(|_| tracing::warn!("configuration field {name}: {value} out of range"))
        .ok()
}

impl RawDocument {
    fn into_config(self) -> FpgaConfig {
        let map = self.address_map.unwrap_or_default();
        let lite = map.axi_lite.unwrap_or_default();
        let full = map.axi_full.unwrap_or_default();
        let adc_ctl = lite.adc.unwrap_or_default();
        let dma_ctl = lite.dma.unwrap_or_default();

        let bus = parse_bus(lite.bus_address_offset.as_ref(), &adc_ctl, &dma_ctl, &full);
        let adc_registers = parse_adc_registers(adc_ctl.registers_address_offset.as_ref());
        let dma_registers = parse_dma_registers(dma_ctl.registers_address_offset.as_ref());

        let hw = self.hardware_features.unwrap_or_default();
        let hardware = HardwareFeatures {
            ddr: hw.ddr.as_ref().and_then(parse_ddr),
            adc: hw.adc.as_ref().and_then(parse_adc),
        };

        let nodes = self.xdma_driver.as_ref().and_then(parse_nodes);

        let config = FpgaConfig {
            bus,
            adc_registers,
            dma_registers,
            hardware,
            nodes,
        };
        tracing::debug!(
            "configuration loaded: bus={} adc_regs={} dma_regs={} ddr={} adc={} nodes={}",
            config.bus.is_some(),
            config.adc_registers.is_some(),
            config.dma_registers.is_some(),
            config.hardware.ddr.is_some(),
            config.hardware.adc.is_some(),
            config.nodes.is_some()
        );
        config
    }
}

fn parse_bus(
    lite_base: Option<&String>,
    adc: &RawController,
    dma: &RawController,
    full: &RawAxiFull,
) -> Option<BusAddressMap> {
    let ddr = full.ddr.as_ref();
    Some(BusAddressMap {
        axi_lite_base: hex_field(lite_base, "axi-lite.bus-address-offset")?,
        adc_base: hex_field(adc.address_offset.as_ref(), "axi-lite.adc.address-offset")?,
        dma_base: hex_field(dma.address_offset.as_ref(), "axi-lite.dma.address-offset")?,
        axi_full_base: hex_field(
            full.bus_address_offset.as_ref(),
            "axi-full.bus-address-offset",
        )?,
        ddr_base: hex_field(
            ddr.and_then(|d| d.address_offset.as_ref()),
            "axi-full.ddr.address-offset",
        )?,
    })
}

fn register_field(table: &BTreeMap<String, String>, id: RegisterId) -> Option<u64> {
    let key = format!("{}-address-offset", id.name());
    hex_field(table.get(&key), &key)
}

fn parse_adc_registers(table: Option<&BTreeMap<String, String>>) -> Option<AdcRegisterMap> {
    let Some(t) = table else {
        tracing::warn!("configuration field axi-lite.adc.registers-address-offset missing");
        return None;
    };
    Some(AdcRegisterMap {
        sci: register_field(t, RegisterId::Sci)?,
        sp: register_field(t, RegisterId::Sp)?,
        sf: register_field(t, RegisterId::Sf)?,
        str: register_field(t, RegisterId::Str)?,
        ngf: register_field(t, RegisterId::Ngf)?,
        err: register_field(t, RegisterId::Err)?,
    })
}

fn parse_dma_registers(table: Option<&BTreeMap<String, String>>) -> Option<DmaRegisterMap> {
    let Some(t) = table else {
        tracing::warn!("configuration field axi-lite.dma.registers-address-offset missing");
        return None;
    };
    Some(DmaRegisterMap {
        dmacr: register_field(t, RegisterId::Dmacr)?,
        dmasr: register_field(t, RegisterId::Dmasr)?,
        sg_ctl: register_field(t, RegisterId::SgCtl)?,
        curdesc: register_field(t, RegisterId::Curdesc)?,
        curdesc_msb: register_field(t, RegisterId::CurdescMsb)?,
        taildesc: register_field(t, RegisterId::Taildesc)?,
        taildesc_msb: register_field(t, RegisterId::TaildescMsb)?,
        da: register_field(t, RegisterId::Da)?,
        da_msb: register_field(t, RegisterId::DaMsb)?,
        length: register_field(t, RegisterId::Length)?,
    })
}

fn parse_ddr(raw: &RawDdr) -> Option<DdrFeatures> {
    let width = int_field(raw.data_width_bits.as_ref(), "ddr.data-width-bits")?;
    Some(DdrFeatures {
        capacity_megabytes: int_field(
            raw.memory_capacity_megabytes.as_ref(),
            "ddr.memory-capacity-megabytes",
        )?,
        data_width_bits: narrow(width, "ddr.data-width-bits")?,
    })
}

fn parse_adc(raw: &RawAdc) -> Option<AdcFeatures> {
    let width = int_field(raw.data_width_bits.as_ref(), "adc.data-width-bits")?;
    let channels = int_field(raw.channels.as_ref(), "adc.channels")?;
    let frame = int_field(raw.frame_length_bytes.as_ref(), "adc.frame-length-bytes")?;
    let radius_text = field(raw.voltage_range_radius_v.as_ref(), "adc.voltage-range-radius-v")?;
    let radius = radius_text
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|r| r.is_finite() && *r > 0.0);
    let Some(voltage_range_radius_v) = radius else {
        tracing::warn!("configuration field adc.voltage-range-radius-v: invalid {radius_text:?}");
        return None;
    };
    Some(AdcFeatures {
        data_width_bits: narrow(width, "adc.data-width-bits")?,
        channels: narrow(channels, "adc.channels")?,
        max_sampling_frequency_hz: int_field(
            raw.max_sampling_frequency_hz.as_ref(),
            "adc.max-sampling-frequency-hz",
        )?,
        voltage_range_radius_v,
        frame_length_bytes: narrow(frame, "adc.frame-length-bytes")?,
    })
}

fn parse_nodes(raw: &RawXdmaDriver) -> Option<DeviceNodeSet> {
    let Some(files) = raw.device_files.as_ref() else {
        tracing::warn!("configuration field xdma-driver.device-files missing");
        return None;
    };
    let list = |v: &Option<Vec<String>>, name: &str| -> Option<Vec<PathBuf>> {
        match v {
            Some(paths) => Some(paths.iter().map(PathBuf::from).collect()),
            None => {
                tracing::warn!("configuration field device-files.{name} missing");
                None
            }
        }
    };
    let max = int_field(
        raw.max_transfer_size_bytes.as_ref(),
        "xdma-driver.max-transfer-size-bytes",
    )?;
    Some(DeviceNodeSet::new(
        field(files.xdma_control.as_ref(), "device-files.xdma-control")?,
        field(files.xdma_user.as_ref(), "device-files.xdma-user")?,
        list(&files.xdma_h2c, "xdma-h2c")?,
        list(&files.xdma_c2h, "xdma-c2h")?,
        list(&files.xdma_events, "xdma-events")?,
        max,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = r#"{
      "address-map": {
        "axi-lite": {
          "bus-address-offset": "0x0000_0000",
          "adc": {
            "address-offset": "0x0001_0000",
            "registers-address-offset": {
              "SCI-address-offset": "0x00", "SP-address-offset": "0x04",
              "SF-address-offset": "0x08", "STR-address-offset": "0x0C",
              "NGF-address-offset": "0x10", "ERR-address-offset": "0x14"
            }
          },
          "dma": {
            "address-offset": "0x0002_0000",
            "registers-address-offset": {
              "S2MM_DMACR-address-offset": "0x30", "S2MM_DMASR-address-offset": "0x34",
              "SG_CTL-address-offset": "0x2C",
              "S2MM_CURDESC-address-offset": "0x38", "S2MM_CURDESC_MSB-address-offset": "0x3C",
              "S2MM_TAILDESC-address-offset": "0x40", "S2MM_TAILDESC_MSB-address-offset": "0x44",
              "S2MM_DA-address-offset": "0x48", "S2MM_DA_MSB-address-offset": "0x4C",
              "S2MM_LENGTH-address-offset": "0x58"
            }
          }
        },
        "axi-full": { "bus-address-offset": "0x0", "ddr": { "address-offset": "0x8000_0000" } }
      },
      "hardware-features": {
        "adc": { "data-width-bits": "16", "channels": "16", "max-sampling-frequency-hz": "500000",
                 "voltage-range-radius-v": "10", "frame-length-bytes": "72" },
        "ddr": { "memory-capacity-megabytes": "1024", "data-width-bits": "64" }
      },
      "xdma-driver": {
        "device-files": {
          "xdma-control": "/dev/xdma0_control", "xdma-user": "/dev/xdma0_user",
          "xdma-h2c": ["/dev/xdma0_h2c_0", "/dev/xdma0_h2c_1"],
          "xdma-c2h": ["/dev/xdma0_c2h_0", "/dev/xdma0_c2h_1"],
          "xdma-events": ["/dev/xdma0_events_0"]
        },
        "max-transfer-size-bytes": "4294967296"
      }
    }"#;

    #[test]
    fn full_document_is_complete() {
        let cfg = FpgaConfig::from_json_str(DOCUMENT).unwrap();
        let view = cfg.require().unwrap();
        assert_eq!(view.bus.adc_base, 0x1_0000);
        assert_eq!(view.bus.dma_base, 0x2_0000);
        assert_eq!(view.bus.ddr_base, 0x8000_0000);
        assert_eq!(view.register_offset(RegisterId::Str), 0x0C);
        assert_eq!(view.register_offset(RegisterId::Length), 0x58);
        assert_eq!(view.ddr.capacity_bytes(), 1024 * 1024 * 1024);
        assert_eq!(view.adc.frame_length_bytes, 72);
        assert!((view.adc.voltage_range_radius_v - 10.0).abs() < f64::EPSILON);
        assert_eq!(view.nodes.c2h.len(), 2);
        assert_eq!(view.nodes.user, PathBuf::from("/dev/xdma0_user"));
    }

    #[test]
    fn oversized_transfer_limit_is_clamped() {
        let cfg = FpgaConfig::from_json_str(DOCUMENT).unwrap();
        assert_eq!(
            cfg.nodes.unwrap().max_transfer_bytes,
            LINUX_DMA_MAX_TRANSFER_BYTES
        );
    }

    #[test]
    fn malformed_field_drops_only_its_section() {
        let doc = DOCUMENT.replace(r#""SP-address-offset": "0x04""#, r#""SP-address-offset": "4""#);
        let cfg = FpgaConfig::from_json_str(&doc).unwrap();
        assert!(cfg.adc_registers.is_none());
        assert!(cfg.dma_registers.is_some());
        assert!(cfg.bus.is_some());
        match cfg.require() {
            Err(DaqError::ConfigIncomplete { section }) => {
                assert!(section.contains("adc.registers"), "{section}");
            }
            other => panic!("expected incomplete, got {other:?}"),
        }
    }

    #[test]
    fn empty_document_loads_but_is_incomplete() {
        let cfg = FpgaConfig::from_json_str("{}").unwrap();
        assert_eq!(cfg, FpgaConfig::default());
        assert!(matches!(
            cfg.require(),
            Err(DaqError::ConfigIncomplete { section: "address-map" })
        ));
    }

    #[test]
    fn invalid_json_is_rejected() {
        assert!(FpgaConfig::from_json_str("{ not json").is_err());
    }

    #[test]
    fn numbers() {
        assert_eq!(parse_hex("0x1_0000").unwrap(), 0x1_0000);
        assert_eq!(parse_hex("0XfF").unwrap(), 0xFF);
        assert!(parse_hex("1000").is_err());
        assert!(parse_hex("0x").is_err());
        assert!(parse_hex("0xZZ").is_err());
        assert_eq!(parse_decimal("72").unwrap(), 72);
        assert!(parse_decimal("-1").is_err());
        assert!(parse_decimal("").is_err());
        assert_eq!(parse_number("0x10").unwrap(), 16);
        assert_eq!(parse_number("10").unwrap(), 10);
    }
}
