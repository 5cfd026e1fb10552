//! Captures written to disk, loaded through an AlignedDmaBuffer, decoded.

use daq_card::frame::{HEADER_MARKER, SAMPLES_PER_FRAME};
use daq_card::SampleWord;
use daq_driver::{AlignedDmaBuffer, FpgaConfig};
use daq_frames::prelude::*;
use daq_frames::AdcFrame;

const ADC_ONLY: &str = r#"{
  "hardware-features": {
    "adc": { "data-width-bits": "16", "channels": "16", "max-sampling-frequency-hz": "500000",
             "voltage-range-radius-v": "5", "frame-length-bytes": "72" }
  }
}"#;

/// Frame `n` holds `n * 100 + slot` in every slot.
fn frame(n: u16, crc: CrcCheck) -> Vec<u32> {
    let mut slots = [SampleWord::default(); SAMPLES_PER_FRAME];
    for (k, s) in slots.iter_mut().enumerate() {
        *s = crc.seal(n * 100 + k as u16);
    }
    AdcFrame::from_slots(slots).to_words()
}

fn write_capture(words: &[u32]) -> tempfile::NamedTempFile {
    let file = tempfile::NamedTempFile::new().unwrap();
    let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();
    std::fs::write(file.path(), bytes).unwrap();
    file
}

fn params() -> AdcParams {
    AdcParams::from_config(&FpgaConfig::from_json_str(ADC_ONLY).unwrap()).unwrap()
}

#[test]
fn params_from_configuration() {
    let p = params();
    assert!((p.full_scale() - 5.0).abs() < f64::EPSILON);
    assert_eq!(p.sample_width_bits, 16);
    assert_eq!(p.crc, CrcCheck::default());
}

#[test]
fn capture_starting_mid_frame() {
    let crc = CrcCheck::default();
    // Tail end of a frame that began before the capture window.
    let mut words = vec![0x1234_5678, 0x0000_FF0F];
    for n in 0..8 {
        words.extend(frame(n, crc));
    }
    let file = write_capture(&words);

    let mut buffer = AlignedDmaBuffer::new();
    buffer
        .fill_from_file(file.path(), 0, words.len() * 4)
        .unwrap();
    let decoded = FrameDecoder::new(params()).decode(&buffer).unwrap();

    assert_eq!(decoded.frames, 8);
    assert_eq!(decoded.crc_rejected, 0);
    assert_eq!(decoded.rejected_headers, 0);
    let a1 = decoded.channel(AdcChannel::A1);
    for (n, v) in a1.iter().enumerate() {
        let expected = f64::from(n as u16 * 100) * 5.0 / 32768.0;
        assert!((v - expected).abs() < 1e-12);
    }
}

#[test]
fn swapped_banks_and_lost_words() {
    let crc = CrcCheck::default();
    let mut words = frame(1, crc);
    // A dropped word leaves a header whose tailer is one word early.
    let mut damaged = frame(2, crc);
    damaged.remove(4);
    words.extend(damaged);
    words.extend(frame(3, crc));
    words.push(HEADER_MARKER);
    let file = write_capture(&words);

    let mut buffer = AlignedDmaBuffer::new();
    buffer
        .fill_from_file(file.path(), 0, words.len() * 4)
        .unwrap();

    let map: ChannelMap = "8,9,10,11,12,13,14,15,0,1,2,3,4,5,6,7".parse().unwrap();
    let decoder = FrameDecoder::new(params().with_channel_map(map));
    let decoded = decoder.decode(&buffer).unwrap();

    assert_eq!(decoded.frames, 2);
    assert_eq!(decoded.rejected_headers, 2);
    let b1 = decoded.channel(AdcChannel::B1);
    assert!((b1[0] - 100.0 * 5.0 / 32768.0).abs() < 1e-12);
    assert!((b1[1] - 300.0 * 5.0 / 32768.0).abs() < 1e-12);
    let a1 = decoded.channel(AdcChannel::A1);
    assert!((a1[0] - 108.0 * 5.0 / 32768.0).abs() < 1e-12);
}

#[test]
fn crc_mode_mismatch_flags_every_cell() {
    let words = frame(1, CrcCheck::PerByte { init: 0xFF });
    let decoded = FrameDecoder::new(params()).decode_words(&words).unwrap();
    assert_eq!(decoded.frames, 1);
    assert_eq!(decoded.crc_rejected, SAMPLES_PER_FRAME);
    assert!(decoded
        .channels()
        .iter()
        .all(|c| (c[0] - 5.0).abs() < f64::EPSILON));
}

#[test]
fn garbage_capture_is_an_error() {
    let words = vec![0xDEAD_BEEFu32; 64];
    let file = write_capture(&words);
    let mut buffer = AlignedDmaBuffer::new();
    buffer.fill_from_file(file.path(), 0, 256).unwrap();
    assert!(matches!(
        FrameDecoder::new(params()).decode(&buffer),
        Err(FrameError::NoFrames { words: 64, .. })
    ));
}
