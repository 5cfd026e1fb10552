//! Transport tests against a scratch card made of regular files.

mod common;

use common::{ScratchCard, DDR_BASE};
use daq_card::bus::DMA_ALIGNMENT;
use daq_card::{RegisterBlock, RegisterId};
use daq_driver::{
    AddressResolver, AlignedDmaBuffer, DaqError, DmaTransfer, ErrorKind, FpgaController,
};

fn pattern(n: usize) -> Vec<u8> {
    (0..n).map(|i| (i.wrapping_mul(31) ^ (i >> 8)) as u8).collect()
}

#[test]
fn file_round_trip_preserves_bytes() {
    let card = ScratchCard::new();
    let path = card.node("payload.bin");

    for n in [1usize, 4095, 4096, 4097, 1_048_576] {
        let data = pattern(n);
        let mut out = AlignedDmaBuffer::new();
        out.from_slice(&data).unwrap();
        out.drain_to_file(&path, 512, n).unwrap();

        let mut back = AlignedDmaBuffer::new();
        back.fill_from_file(&path, 512, n).unwrap();
        assert_eq!(back.as_ptr() as usize % DMA_ALIGNMENT, 0);
        assert_eq!(back.capacity(), n + DMA_ALIGNMENT);
        assert_eq!(back.as_bytes(), data.as_slice(), "n = {n}");
    }
}

#[test]
fn loaded_config_resolves_every_register() {
    let card = ScratchCard::new();
    let cfg = card.config(16);
    let view = cfg.require().unwrap();
    let resolver = AddressResolver::new(view);

    for id in RegisterId::ALL {
        let base = match id.block() {
            RegisterBlock::Adc => 0x1000,
            RegisterBlock::Dma => 0x2000,
        };
        assert_eq!(
            resolver.resolve_register(id).unwrap(),
            base + view.register_offset(id)
        );
    }
    assert_eq!(resolver.resolve_ddr(0x10).unwrap(), DDR_BASE + 0x10);
}

#[test]
fn sixteen_megabyte_bounds() {
    let card = ScratchCard::new();
    let ctl = FpgaController::new(card.config(16));

    // Offset 0, 1 KiB: passes validation and reaches the H2C node.
    let mut buf = AlignedDmaBuffer::new();
    buf.from_slice(&[0x5Au8; 1024]).unwrap();
    ctl.write_ddr(0, &buf, 0).unwrap();

    // At capacity: rejected before any node is touched.
    std::fs::remove_file(card.node("xdma0_h2c_0")).unwrap();
    for bytes in [1u64, 4, 1024] {
        let err = ctl
            .transfer(
                &DmaTransfer::host_to_card(16 * 1024 * 1024, bytes, 0),
                &mut buf,
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Bounds);
    }
    assert!(!card.node("xdma0_h2c_0").exists());
    assert!(!card.node("xdma0_c2h_0").exists());
}

#[test]
fn ddr_loop_back_through_controller() {
    let card = ScratchCard::new();
    let ctl = FpgaController::new(card.config(16));

    let data = pattern(4097);
    let mut buf = AlignedDmaBuffer::new();
    buf.from_slice(&data).unwrap();
    ctl.write_ddr(0x100, &buf, 0).unwrap();
    card.loop_back();

    let back = ctl.read_ddr(0x100, 4097, 0).unwrap();
    assert_eq!(back.as_bytes(), data.as_slice());

    let image = std::fs::read(card.node("xdma0_c2h_0")).unwrap();
    let start = usize::try_from(DDR_BASE).unwrap() + 0x100;
    assert_eq!(&image[start..start + 4097], data.as_slice());
}

#[test]
fn file_streaming_through_controller() {
    let card = ScratchCard::new();
    let ctl = FpgaController::new(card.config(16));

    let data = pattern(10_000);
    let input = card.node("in.bin");
    std::fs::write(&input, &data).unwrap();
    ctl.stream_file_to_ddr(&input, 0, 0, 10_000, 0).unwrap();
    card.loop_back();

    let output = card.node("out.bin");
    ctl.stream_ddr_to_file(0, 10_000, 0, &output, 0).unwrap();
    assert_eq!(std::fs::read(&output).unwrap(), data);
}

#[test]
fn single_channel_card_rejects_channel_one() {
    let card = ScratchCard::new();
    let ctl = FpgaController::new(card.config(16));
    let err = ctl.read_ddr(0, 64, 1).unwrap_err();
    assert!(matches!(
        err,
        DaqError::InvalidChannel {
            channel: 1,
            available: 1,
            ..
        }
    ));
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn register_probe() {
    let card = ScratchCard::new();
    let ctl = FpgaController::new(card.config(16));

    ctl.write_register(RegisterId::Dmacr, 0x0001_1003).unwrap();
    assert_eq!(ctl.read_register(RegisterId::Dmacr).unwrap(), 0x0001_1003);
    assert_eq!(ctl.read_lite(0x2000, 0x30).unwrap(), 0x0001_1003);

    ctl.write_lite(0x1000, 0x10, 7).unwrap();
    assert_eq!(ctl.read_register(RegisterId::Ngf).unwrap(), 7);
    assert!(matches!(
        ctl.write_register(RegisterId::Ngf, 0),
        Err(DaqError::ReadOnlyRegister { .. })
    ));
}

#[test]
#[ignore] // Requires hardware
fn hardware_register_read() {
    let ctl = FpgaController::from_json_file("fpga.json").expect("config");
    let status = ctl.read_register(RegisterId::Dmasr).expect("DMASR");
    println!("S2MM_DMASR = {status:#010x} {:?}", daq_card::regs::dmasr::flags(status));
}
