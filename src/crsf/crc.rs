//! # CRC8-DVB-S2
//!
//! Frame checksum used by CRSF. Covers the type byte and payload.
//!
//! **Polynomial**: 0xD5, **initial value**: 0x00, no reflection, no final XOR.

const CRC8_POLY: u8 = 0xD5;

const CRC8_TABLE: [u8; 256] = build_table();

const fn build_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;

    while i < 256 {
        let mut crc = i as u8;
        let mut bit = 0;

        while bit < 8 {
            crc = if crc & 0x80 != 0 { (crc << 1) ^ CRC8_POLY } else { crc << 1 };
            bit += 1;
        }

        table[i] = crc;
        i += 1;
    }

    table
}

/// Feed one byte into a running checksum
#[inline]
pub fn crc8_update(crc: u8, byte: u8) -> u8 {
    CRC8_TABLE[(crc ^ byte) as usize]
}

/// Checksum a whole byte slice
///
/// # Examples
///
/// ```
/// use lq_monitor::crsf::crc::crc8_dvb_s2;
///
/// assert_eq!(crc8_dvb_s2(b"123456789"), 0xBC);
/// ```
pub fn crc8_dvb_s2(data: &[u8]) -> u8 {
    data.iter().fold(0, |crc, &byte| crc8_update(crc, byte))
}
