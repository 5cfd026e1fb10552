//! `daq`: register probe and DMA transfer tool for the XDMA acquisition card.
//!
//! ```text
//! USAGE:
//!   daq -c fpga.json info                          Print the loaded configuration
//!   daq -c fpga.json lite-read <base> <offset>     Raw AXI-Lite read
//!   daq -c fpga.json lite-write <base> <offset> <value>
//!   daq -c fpga.json reg-read <name|selector>      Named register read
//!   daq -c fpga.json reg-write <name|selector> <value>
//!   daq -c fpga.json full-read <ddr-offset> <bytes> <file>
//!   daq -c fpga.json full-write <file> <ddr-offset> <bytes>
//!   daq -c fpga.json decode <capture>              Per-channel voltage summary
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use daq_card::regs::dmasr;
use daq_card::{AdcChannel, RegisterBlock, RegisterId};
use daq_driver::{AlignedDmaBuffer, FpgaConfig, FpgaController};
use daq_frames::{AdcParams, ChannelMap, CrcCheck, FrameDecoder};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "daq", about = "XDMA acquisition card register and DMA tool", version)]
struct Cli {
    /// Card configuration (JSON).
    #[arg(short, long, default_value = "fpga.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Print the loaded configuration.
    Info,
    /// Read one 32-bit word at `base + offset` on the AXI-Lite bus.
    LiteRead {
        /// Sub-controller base (hex with 0x, or decimal).
        #[arg(value_parser = parse_u64)]
        base: u64,
        /// Register offset.
        #[arg(value_parser = parse_u64)]
        offset: u64,
    },
    /// Write one 32-bit word at `base + offset`, then read it back.
    LiteWrite {
        /// Sub-controller base.
        #[arg(value_parser = parse_u64)]
        base: u64,
        /// Register offset.
        #[arg(value_parser = parse_u64)]
        offset: u64,
        /// Value to write.
        #[arg(value_parser = parse_u32)]
        value: u32,
    },
    /// Read a named register (e.g. NGF, DMASR, or selector 0-15).
    RegRead {
        /// Register name or numeric selector.
        #[arg(value_parser = parse_register)]
        register: RegisterId,
    },
    /// Write a named register.
    RegWrite {
        /// Register name or numeric selector.
        #[arg(value_parser = parse_register)]
        register: RegisterId,
        /// Value to write.
        #[arg(value_parser = parse_u32)]
        value: u32,
    },
    /// Copy card DDR into a file.
    FullRead {
        /// Offset into DDR.
        #[arg(value_parser = parse_u64)]
        ddr_offset: u64,
        /// Bytes to copy.
        #[arg(value_parser = parse_u64)]
        bytes: u64,
        /// Output file (created, truncated).
        output: PathBuf,
        /// Card-to-host channel.
        #[arg(long, default_value_t = 0)]
        channel: usize,
    },
    /// Copy a file into card DDR.
    FullWrite {
        /// Input file.
        input: PathBuf,
        /// Offset into DDR.
        #[arg(value_parser = parse_u64)]
        ddr_offset: u64,
        /// Bytes to copy.
        #[arg(value_parser = parse_u64)]
        bytes: u64,
        /// Offset into the input file.
        #[arg(long, default_value = "0", value_parser = parse_u64)]
        file_offset: u64,
        /// Host-to-card channel.
        #[arg(long, default_value_t = 0)]
        channel: usize,
    },
    /// Decode a capture file and print per-channel voltage summaries.
    Decode {
        /// Raw capture (as written by `full-read`).
        capture: PathBuf,
        /// Storage slot of each channel, A1 first (16 comma-separated values).
        #[arg(long)]
        channel_map: Option<ChannelMap>,
        /// Sample CRC policy.
        #[arg(long, value_enum, default_value_t = CrcMode::Table)]
        crc: CrcMode,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum CrcMode {
    /// Plain table lookup of each sample byte (init 0x00).
    Table,
    /// CRC-8/CDMA2000 proper (init 0xFF) of each sample byte.
    Cdma2000,
    /// Accept every sample.
    Off,
}

impl From<CrcMode> for CrcCheck {
    fn from(mode: CrcMode) -> Self {
        match mode {
            CrcMode::Table => Self::default(),
            CrcMode::Cdma2000 => Self::PerByte {
                init: daq_card::crc::CDMA2000_INIT,
            },
            CrcMode::Off => Self::Disabled,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let cli = Cli::parse();
    let config = FpgaConfig::from_json_file(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    let ctl = FpgaController::new(config);

    match cli.command {
        Cmd::Info => cmd_info(&ctl),
        Cmd::LiteRead { base, offset } => {
            let value = ctl.read_lite(base, offset)?;
            println!("[{base:#x} + {offset:#x}] = {value:#010x}");
            Ok(())
        }
        Cmd::LiteWrite {
            base,
            offset,
            value,
        } => {
            ctl.write_lite(base, offset, value)?;
            let back = ctl.read_lite(base, offset)?;
            println!("[{base:#x} + {offset:#x}] <- {value:#010x}, reads {back:#010x}");
            Ok(())
        }
        Cmd::RegRead { register } => cmd_reg_read(&ctl, register),
        Cmd::RegWrite { register, value } => {
            ctl.write_register(register, value)?;
            println!("{register} <- {value:#010x}");
            Ok(())
        }
        Cmd::FullRead {
            ddr_offset,
            bytes,
            output,
            channel,
        } => cmd_full_read(&ctl, ddr_offset, bytes, &output, channel),
        Cmd::FullWrite {
            input,
            ddr_offset,
            bytes,
            file_offset,
            channel,
        } => {
            ctl.stream_file_to_ddr(&input, file_offset, ddr_offset, bytes, channel)?;
            println!(
                "{bytes} bytes {} @ {file_offset:#x} -> DDR @ {ddr_offset:#x}",
                input.display()
            );
            Ok(())
        }
        Cmd::Decode {
            capture,
            channel_map,
            crc,
        } => cmd_decode(&ctl, &capture, channel_map, crc),
    }
}

fn parse_u64(text: &str) -> std::result::Result<u64, String> {
    daq_driver::parse_number(text).map_err(|e| e.to_string())
}

fn parse_u32(text: &str) -> std::result::Result<u32, String> {
    let value = parse_u64(text)?;
    u32::try_from(value).map_err(|_| format!("{text} does not fit in 32 bits"))
}

fn parse_register(text: &str) -> std::result::Result<RegisterId, String> {
    if let Ok(selector) = text.parse::<u8>() {
        return RegisterId::try_from(selector).map_err(|e| e.to_string());
    }
    text.parse().map_err(|e: daq_card::UnknownRegister| e.to_string())
}

fn cmd_info(ctl: &FpgaController) -> Result<()> {
    let config = ctl.config();

    match &config.bus {
        Some(bus) => {
            println!("AXI-Lite base : {:#x}", bus.axi_lite_base);
            println!("  ADC         : {:#x}", bus.adc_base);
            println!("  DMA         : {:#x}", bus.dma_base);
            println!("AXI-Full base : {:#x}", bus.axi_full_base);
            println!("  DDR         : {:#x}", bus.ddr_base);
        }
        None => println!("Address map   : not loaded"),
    }

    if let Ok(resolver) = ctl.resolver() {
        println!();
        for block in [RegisterBlock::Adc, RegisterBlock::Dma] {
            println!("{block} registers:");
            for id in RegisterId::in_block(block) {
                let offset = resolver.resolve_register(id)?;
                let ro = if id.is_read_only() { "  (read-only)" } else { "" };
                println!("  {:<18} {:>2}  {offset:#06x}{ro}", id.name(), id.selector());
            }
        }
    } else {
        println!("Register maps : incomplete");
    }

    println!();
    match &config.hardware.ddr {
        Some(ddr) => println!(
            "DDR           : {} MB, {}-bit",
            ddr.capacity_megabytes, ddr.data_width_bits
        ),
        None => println!("DDR           : not loaded"),
    }
    match &config.hardware.adc {
        Some(adc) => println!(
            "ADC           : {} ch, {}-bit, ±{} V, {} Hz max, {} B/frame",
            adc.channels,
            adc.data_width_bits,
            adc.voltage_range_radius_v,
            adc.max_sampling_frequency_hz,
            adc.frame_length_bytes
        ),
        None => println!("ADC           : not loaded"),
    }

    println!();
    match &config.nodes {
        Some(nodes) => {
            println!("control       : {}", nodes.control.display());
            println!("user          : {}", nodes.user.display());
            for (i, p) in nodes.h2c.iter().enumerate() {
                println!("h2c[{i}]        : {}", p.display());
            }
            for (i, p) in nodes.c2h.iter().enumerate() {
                println!("c2h[{i}]        : {}", p.display());
            }
            for (i, p) in nodes.events.iter().enumerate() {
                println!("events[{i}]     : {}", p.display());
            }
            println!("max transfer  : {} bytes", nodes.max_transfer_bytes);
        }
        None => println!("Device nodes  : not loaded"),
    }

    Ok(())
}

fn cmd_reg_read(ctl: &FpgaController, register: RegisterId) -> Result<()> {
    let value = ctl.read_register(register)?;
    println!("{register} = {value:#010x} ({value})");

    if register == RegisterId::Dmasr {
        let flags = dmasr::flags(value);
        if !flags.is_empty() {
            println!("  {}", flags.join(" "));
        }
        if value & dmasr::ANY_ERROR != 0 {
            tracing::warn!("DMA status reports an error: {value:#010x}");
        }
    }
    Ok(())
}

fn cmd_full_read(
    ctl: &FpgaController,
    ddr_offset: u64,
    bytes: u64,
    output: &Path,
    channel: usize,
) -> Result<()> {
    ctl.stream_ddr_to_file(ddr_offset, bytes, channel, output, 0)?;
    println!("DDR @ {ddr_offset:#x} -> {} ({bytes} bytes)", output.display());
    Ok(())
}

fn cmd_decode(
    ctl: &FpgaController,
    capture: &Path,
    channel_map: Option<ChannelMap>,
    crc: CrcMode,
) -> Result<()> {
    let mut params = AdcParams::from_config(ctl.config())?.with_crc(crc.into());
    if let Some(map) = channel_map {
        params = params.with_channel_map(map);
    }

    let len = std::fs::metadata(capture)
        .with_context(|| format!("reading {}", capture.display()))?
        .len();
    let len = usize::try_from(len).context("capture does not fit in memory")?;
    let mut buffer = AlignedDmaBuffer::new();
    buffer.fill_from_file(capture, 0, len)?;

    let decoded = FrameDecoder::new(params).decode(&buffer)?;
    println!(
        "{} frames, {} CRC-rejected samples, {} rejected headers, {} trailing bytes",
        decoded.frames, decoded.crc_rejected, decoded.rejected_headers, decoded.trailing_bytes
    );
    println!();
    println!("{:<4} {:>10} {:>10} {:>10}", "ch", "min V", "max V", "mean V");
    for channel in AdcChannel::ALL {
        let volts = decoded.channel(channel);
        let min = volts.iter().copied().fold(f64::INFINITY, f64::min);
        let max = volts.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        #[allow(clippy::cast_precision_loss)]
        let mean = volts.iter().sum::<f64>() / volts.len() as f64;
        println!("{:<4} {min:>10.4} {max:>10.4} {mean:>10.4}", channel.to_string());
    }
    Ok(())
}
