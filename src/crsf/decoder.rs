//! # CRSF Packet Decoder
//!
//! Validates complete CRSF frames and decodes Link Statistics telemetry.

use super::crc::crc8_dvb_s2;
use super::protocol::*;
use crate::error::{LinkQualityError, Result};

/// Decode a complete CRSF frame
///
/// # Arguments
///
/// * `frame` - Complete CRSF frame bytes (sync, length, type, payload, crc)
///
/// # Returns
///
/// * `Result<CrsfFrame>` - Decoded frame, or error if invalid
///
/// # Errors
///
/// Returns error if:
/// - Frame is too short
/// - Sync byte is incorrect
/// - Length field is out of range
/// - CRC check fails
pub fn decode_frame(frame: &[u8]) -> Result<CrsfFrame> {
    // sync(1) + length(1) + type(1) + crc(1)
    if frame.len() < 4 {
        return Err(LinkQualityError::CrsfProtocol(
            "Frame too short".to_string()
        ));
    }

    if frame[0] != CRSF_SYNC_BYTE {
        return Err(LinkQualityError::CrsfProtocol(
            format!("Invalid sync byte: 0x{:02X}", frame[0])
        ));
    }

    let length = frame[1];
    if !(CRSF_MIN_FRAME_LENGTH..=CRSF_MAX_FRAME_LENGTH).contains(&length) {
        return Err(LinkQualityError::CrsfProtocol(
            format!("Invalid length field: {}", length)
        ));
    }

    let length = length as usize;
    if frame.len() < 2 + length {
        return Err(LinkQualityError::CrsfProtocol(
            format!("Frame too short: expected {} bytes, got {}", 2 + length, frame.len())
        ));
    }

    // CRC covers type + payload
    let received_crc = frame[1 + length];
    let calculated_crc = crc8_dvb_s2(&frame[2..1 + length]);

    if calculated_crc != received_crc {
        return Err(LinkQualityError::CrsfProtocol(
            format!("CRC mismatch: expected 0x{:02X}, got 0x{:02X}", calculated_crc, received_crc)
        ));
    }

    CrsfFrame::new(frame[2], frame[3..1 + length].to_vec())
}

/// Decode Link Statistics telemetry packet
///
/// # Arguments
///
/// * `payload` - Link Statistics payload (10 bytes)
pub fn decode_link_statistics(payload: &[u8]) -> Result<LinkStatistics> {
    if payload.len() < CRSF_LINK_STATS_PAYLOAD_SIZE {
        return Err(LinkQualityError::CrsfProtocol(
            format!("Link stats payload too short: {} bytes", payload.len())
        ));
    }

    Ok(LinkStatistics {
        uplink_rssi_1: payload[0],
        uplink_rssi_2: payload[1],
        uplink_lq: payload[2],
        uplink_snr: payload[3] as i8,
        active_antenna: payload[4],
        rf_mode: payload[5],
        uplink_tx_power: payload[6],
        downlink_rssi: payload[7],
        downlink_lq: payload[8],
        downlink_snr: payload[9] as i8,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crsf::encoder::{encode_frame, encode_link_statistics_frame};

    fn sample_stats() -> LinkStatistics {
        LinkStatistics {
            uplink_rssi_1: 60,
            uplink_rssi_2: 62,
            uplink_lq: 100,
            uplink_snr: 8,
            active_antenna: 0,
            rf_mode: 2,
            uplink_tx_power: 2,
            downlink_rssi: 70,
            downlink_lq: 100,
            downlink_snr: 6,
        }
    }

    #[test]
    fn test_decode_frame_too_short() {
        let frame = [CRSF_SYNC_BYTE, 0x03];
        assert!(decode_frame(&frame).is_err());
    }

    #[test]
    fn test_decode_frame_invalid_sync() {
        let frame = [0xFF, 0x02, 0x14, 0x00];
        assert!(decode_frame(&frame).is_err());
    }

    #[test]
    fn test_decode_frame_invalid_length() {
        let frame = [CRSF_SYNC_BYTE, 0x01, 0x14, 0x00];
        assert!(decode_frame(&frame).is_err());

        let frame = [CRSF_SYNC_BYTE, 0x50, 0x14, 0x00];
        assert!(decode_frame(&frame).is_err());
    }

    #[test]
    fn test_decode_known_link_statistics_frame() {
        // CRC 0x04 over type + payload
        let frame = [0xC8, 0x0C, 0x14, 60, 62, 100, 8, 0, 2, 2, 70, 100, 6, 0x04];
        let decoded = decode_frame(&frame).unwrap();

        assert_eq!(decoded.frame_type, CRSF_FRAMETYPE_LINK_STATISTICS);
        assert_eq!(decode_link_statistics(&decoded.payload).unwrap(), sample_stats());
    }

    #[test]
    fn test_decode_frame_crc_error() {
        let mut frame = encode_link_statistics_frame(&sample_stats());
        let last = frame.len() - 1;
        frame[last] ^= 0xFF;

        let result = decode_frame(&frame);
        assert!(matches!(result, Err(LinkQualityError::CrsfProtocol(msg)) if msg.contains("CRC")));
    }

    #[test]
    fn test_decode_frame_ignores_trailing_bytes() {
        let mut frame = encode_frame(CRSF_FRAMETYPE_RC_CHANNELS_PACKED, &[0u8; 22]).unwrap();
        frame.extend_from_slice(&[0xAA, 0xBB]);

        let decoded = decode_frame(&frame).unwrap();
        assert_eq!(decoded.frame_type, CRSF_FRAMETYPE_RC_CHANNELS_PACKED);
        assert_eq!(decoded.payload.len(), 22);
    }

    #[test]
    fn test_decode_link_statistics_negative_snr() {
        let mut stats = sample_stats();
        stats.uplink_snr = -12;
        stats.downlink_snr = -3;

        let frame = decode_frame(&encode_link_statistics_frame(&stats)).unwrap();
        let decoded = decode_link_statistics(&frame.payload).unwrap();
        assert_eq!(decoded.uplink_snr, -12);
        assert_eq!(decoded.downlink_snr, -3);
    }

    #[test]
    fn test_decode_link_statistics_too_short() {
        let payload = vec![100u8; 5];
        assert!(decode_link_statistics(&payload).is_err());
    }
}
