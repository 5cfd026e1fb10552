//! Configuration fixture shared by unit tests.

use std::path::{Path, PathBuf};

use crate::config::{
    AdcFeatures, AdcRegisterMap, BusAddressMap, DdrFeatures, DeviceNodeSet, DmaRegisterMap,
    FpgaConfig, HardwareFeatures,
};

/// 16 MB card with two DMA channels per direction; nodes live under `dir`.
pub fn sample_config(dir: impl AsRef<Path>) -> FpgaConfig {
    let dir = dir.as_ref();
    let node = |name: &str| -> PathBuf { dir.join(name) };
    FpgaConfig {
        bus: Some(BusAddressMap {
            axi_lite_base: 0x4000_0000,
            adc_base: 0x1000,
            dma_base: 0x2000,
            axi_full_base: 0x8000_0000,
            ddr_base: 0x1000,
        }),
        adc_registers: Some(AdcRegisterMap {
            sci: 0x00,
            sp: 0x04,
            sf: 0x08,
            str: 0x0C,
            ngf: 0x10,
            err: 0x14,
        }),
        dma_registers: Some(DmaRegisterMap {
            dmacr: 0x30,
            dmasr: 0x34,
            sg_ctl: 0x2C,
            curdesc: 0x38,
            curdesc_msb: 0x3C,
            taildesc: 0x40,
            taildesc_msb: 0x44,
            da: 0x48,
            da_msb: 0x4C,
            length: 0x58,
        }),
        hardware: HardwareFeatures {
            ddr: Some(DdrFeatures {
                capacity_megabytes: 16,
                data_width_bits: 64,
            }),
            adc: Some(AdcFeatures {
                data_width_bits: 16,
                channels: 16,
                max_sampling_frequency_hz: 500_000,
                voltage_range_radius_v: 10.0,
                frame_length_bytes: 72,
            }),
        },
        nodes: Some(DeviceNodeSet::new(
            node("xdma0_control"),
            node("xdma0_user"),
            vec![node("xdma0_h2c_0"), node("xdma0_h2c_1")],
            vec![node("xdma0_c2h_0"), node("xdma0_c2h_1")],
            vec![node("xdma0_events_0")],
            8 * 1024 * 1024,
        )),
    }
}
