//! # CRSF Protocol Constants and Types
//!
//! Protocol definitions for the CRSF frames the link quality monitor reads.

use serde::Serialize;

use crate::error::{LinkQualityError, Result};

/// CRSF frame sync byte (flight controller address, always 0xC8)
pub const CRSF_SYNC_BYTE: u8 = 0xC8;

/// RC Channels packet type
pub const CRSF_FRAMETYPE_RC_CHANNELS_PACKED: u8 = 0x16;

/// Link Statistics packet type
pub const CRSF_FRAMETYPE_LINK_STATISTICS: u8 = 0x14;

/// Maximum complete frame size on the wire
pub const CRSF_MAX_FRAME_SIZE: usize = 64;

/// Maximum CRSF payload size
/// Frame structure: sync(1) + length(1) + type(1) + payload(N) + crc(1)
pub const CRSF_MAX_PAYLOAD_SIZE: usize = CRSF_MAX_FRAME_SIZE - 4;

/// Smallest legal length field (type + crc, empty payload)
pub const CRSF_MIN_FRAME_LENGTH: u8 = 2;

/// Largest legal length field (type + max payload + crc)
pub const CRSF_MAX_FRAME_LENGTH: u8 = (CRSF_MAX_PAYLOAD_SIZE + 2) as u8;

/// Link Statistics payload size
pub const CRSF_LINK_STATS_PAYLOAD_SIZE: usize = 10;

/// Link statistics telemetry data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LinkStatistics {
    /// Uplink RSSI (antenna 1) in -dBm
    pub uplink_rssi_1: u8,

    /// Uplink RSSI (antenna 2) in -dBm (diversity)
    pub uplink_rssi_2: u8,

    /// Uplink link quality (0-100%)
    pub uplink_lq: u8,

    /// Uplink SNR in dB
    pub uplink_snr: i8,

    /// Active antenna (0 or 1)
    pub active_antenna: u8,

    /// RF mode / packet rate
    pub rf_mode: u8,

    /// Uplink TX power in mW (encoded)
    pub uplink_tx_power: u8,

    /// Downlink RSSI in -dBm
    pub downlink_rssi: u8,

    /// Downlink link quality (0-100%)
    pub downlink_lq: u8,

    /// Downlink SNR in dB
    pub downlink_snr: i8,
}

/// CRSF frame structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrsfFrame {
    /// Frame type
    pub frame_type: u8,

    /// Payload data
    pub payload: Vec<u8>,
}

impl CrsfFrame {
    /// Create a new CRSF frame
    ///
    /// # Errors
    ///
    /// Returns error if payload exceeds CRSF_MAX_PAYLOAD_SIZE (60 bytes)
    pub fn new(frame_type: u8, payload: Vec<u8>) -> Result<Self> {
        if payload.len() > CRSF_MAX_PAYLOAD_SIZE {
            return Err(LinkQualityError::CrsfProtocol(
                format!("Payload size {} exceeds maximum {}", payload.len(), CRSF_MAX_PAYLOAD_SIZE)
            ));
        }

        Ok(Self {
            frame_type,
            payload,
        })
    }

    /// Get frame length field (type + payload + crc)
    ///
    /// Cannot overflow since payload is validated to be ≤ 60 bytes
    pub fn length(&self) -> u8 {
        (1 + self.payload.len() + 1) as u8
    }

    /// Whether this frame carries link statistics
    pub fn is_link_statistics(&self) -> bool {
        self.frame_type == CRSF_FRAMETYPE_LINK_STATISTICS
    }
}
