//! Scratch card: a temp directory whose regular files stand in for the XDMA
//! device nodes, plus the JSON document describing it.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use daq_driver::FpgaConfig;

/// DDR offset of the AXI-Full window on the scratch card.
pub const DDR_BASE: u64 = 0x2000;

pub struct ScratchCard {
    pub dir: tempfile::TempDir,
}

impl ScratchCard {
    pub fn new() -> Self {
        let card = Self {
            dir: tempfile::tempdir().expect("tempdir"),
        };
        std::fs::write(card.node("xdma0_user"), vec![0u8; 0x4000]).expect("user node");
        std::fs::write(card.node("xdma0_h2c_0"), b"").expect("h2c node");
        card
    }

    pub fn node(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Make the C2H node read back whatever H2C last wrote.
    pub fn loop_back(&self) {
        std::fs::copy(self.node("xdma0_h2c_0"), self.node("xdma0_c2h_0")).expect("loop back");
    }

    pub fn json(&self, capacity_megabytes: u64) -> String {
        let n = |name: &str| self.node(name).display().to_string();
        format!(
            r#"{{
  "address-map": {{
    "axi-lite": {{
      "bus-address-offset": "0x4000_0000",
      "adc": {{
        "address-offset": "0x1000",
        "registers-address-offset": {{
          "SCI-address-offset": "0x00", "SP-address-offset": "0x04",
          "SF-address-offset": "0x08", "STR-address-offset": "0x0C",
          "NGF-address-offset": "0x10", "ERR-address-offset": "0x14"
        }}
      }},
      "dma": {{
        "address-offset": "0x2000",
        "registers-address-offset": {{
          "S2MM_DMACR-address-offset": "0x30", "S2MM_DMASR-address-offset": "0x34",
          "SG_CTL-address-offset": "0x2C",
          "S2MM_CURDESC-address-offset": "0x38", "S2MM_CURDESC_MSB-address-offset": "0x3C",
          "S2MM_TAILDESC-address-offset": "0x40", "S2MM_TAILDESC_MSB-address-offset": "0x44",
          "S2MM_DA-address-offset": "0x48", "S2MM_DA_MSB-address-offset": "0x4C",
          "S2MM_LENGTH-address-offset": "0x58"
        }}
      }}
    }},
    "axi-full": {{ "bus-address-offset": "0x8000_0000", "ddr": {{ "address-offset": "{DDR_BASE:#x}" }} }}
  }},
  "hardware-features": {{
    "adc": {{ "data-width-bits": "16", "channels": "16", "max-sampling-frequency-hz": "500000",
             "voltage-range-radius-v": "10", "frame-length-bytes": "72" }},
    "ddr": {{ "memory-capacity-megabytes": "{capacity_megabytes}", "data-width-bits": "64" }}
  }},
  "xdma-driver": {{
    "device-files": {{
      "xdma-control": "{control}", "xdma-user": "{user}",
      "xdma-h2c": ["{h2c}"], "xdma-c2h": ["{c2h}"], "xdma-events": []
    }},
    "max-transfer-size-bytes": "2147479552"
  }}
}}"#,
            control = n("xdma0_control"),
            user = n("xdma0_user"),
            h2c = n("xdma0_h2c_0"),
            c2h = n("xdma0_c2h_0"),
        )
    }

    pub fn config(&self, capacity_megabytes: u64) -> FpgaConfig {
        FpgaConfig::from_json_str(&self.json(capacity_megabytes)).expect("config")
    }
}
