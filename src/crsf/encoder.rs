//! # CRSF Packet Encoder
//!
//! Builds complete CRSF frames. The monitor only reads frames; encoding is
//! used to produce test streams and replay captured link statistics.

use super::crc::crc8_dvb_s2;
use super::protocol::*;
use crate::error::Result;

/// Encode a payload into a complete CRSF frame
///
/// # Returns
///
/// * `Result<Vec<u8>>` - Sync + length + type + payload + crc
///
/// # Errors
///
/// Returns error if the payload exceeds CRSF_MAX_PAYLOAD_SIZE
///
/// # Examples
///
/// ```
/// use lq_monitor::crsf::encoder::encode_frame;
/// use lq_monitor::crsf::protocol::CRSF_FRAMETYPE_LINK_STATISTICS;
///
/// let frame = encode_frame(CRSF_FRAMETYPE_LINK_STATISTICS, &[0u8; 10])?;
/// assert_eq!(frame.len(), 14);
/// # Ok::<(), lq_monitor::error::LinkQualityError>(())
/// ```
pub fn encode_frame(frame_type: u8, payload: &[u8]) -> Result<Vec<u8>> {
    let frame = CrsfFrame::new(frame_type, payload.to_vec())?;

    let mut bytes = Vec::with_capacity(2 + frame.length() as usize);
    bytes.push(CRSF_SYNC_BYTE);
    bytes.push(frame.length());
    bytes.push(frame.frame_type);
    bytes.extend_from_slice(&frame.payload);

    // CRC over type + payload
    let crc = crc8_dvb_s2(&bytes[2..]);
    bytes.push(crc);

    Ok(bytes)
}

/// Encode Link Statistics into its 10-byte payload
pub fn encode_link_statistics_payload(stats: &LinkStatistics) -> [u8; CRSF_LINK_STATS_PAYLOAD_SIZE] {
    [
        stats.uplink_rssi_1,
        stats.uplink_rssi_2,
        stats.uplink_lq,
        stats.uplink_snr as u8,
        stats.active_antenna,
        stats.rf_mode,
        stats.uplink_tx_power,
        stats.downlink_rssi,
        stats.downlink_lq,
        stats.downlink_snr as u8,
    ]
}

/// Encode Link Statistics into a complete CRSF frame (14 bytes)
pub fn encode_link_statistics_frame(stats: &LinkStatistics) -> Vec<u8> {
    let payload = encode_link_statistics_payload(stats);
    let mut bytes = Vec::with_capacity(4 + payload.len());
    bytes.push(CRSF_SYNC_BYTE);
    bytes.push((payload.len() + 2) as u8);
    bytes.push(CRSF_FRAMETYPE_LINK_STATISTICS);
    bytes.extend_from_slice(&payload);
    bytes.push(crc8_dvb_s2(&bytes[2..]));
    bytes
}
