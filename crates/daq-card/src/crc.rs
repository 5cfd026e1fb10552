//! CRC-8 over the CDMA2000 polynomial, as used by the ADC controller.
//!
//! Parameters: width 8, polynomial `0x9B`, no reflection, no final xor.
//! With init `0xFF` this is CRC-8/CDMA2000 (check value `0xDA` for
//! `"123456789"`).
//!
//! The controller appends one CRC byte per sample byte, and that byte is the
//! table entry of the sample byte, i.e. `crc8(0, &[byte])`. The 256-entry
//! table is generated at compile time.

/// Generator polynomial including the implicit x^8 term.
pub const POLY: u16 = 0x19B;

/// Initial register value of the CDMA2000 variant.
pub const CDMA2000_INIT: u8 = 0xFF;

/// Lookup table indexed by `crc ^ byte`.
pub static CRC8_TABLE: [u8; 256] = build_table();

const fn build_table() -> [u8; 256] {
    let poly = (POLY & 0xFF) as u8;
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u8;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ poly
            } else {
                crc << 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

/// CRC over `data`, starting from `init`.
#[must_use]
pub fn crc8(init: u8, data: &[u8]) -> u8 {
    data.iter()
        .fold(init, |crc, &byte| CRC8_TABLE[usize::from(crc ^ byte)])
}

/// CRC-8/CDMA2000 of `data`.
#[must_use]
pub fn checksum(data: &[u8]) -> u8 {
    crc8(CDMA2000_INIT, data)
}
