//! # RSSI Source
//!
//! Where the receiver's signal metric comes from. The source decides how the
//! smoothed link quality is represented on the OSD.

use serde::{Deserialize, Serialize};

use super::link_quality::LINK_QUALITY_MAX_VALUE;
use crate::crsf::protocol::LinkStatistics;

/// Highest uplink link quality percentage reported by CRSF
pub const CRSF_UPLINK_LQ_MAX: u8 = 100;

/// Origin of the RSSI / link quality metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RssiSource {
    /// No RSSI source configured
    None,
    /// Analog RSSI pin
    Adc,
    /// RSSI carried on an RC channel
    RxChannel,
    /// RSSI reported by the receiver protocol
    RxProtocol,
    /// RSSI set over MSP
    Msp,
    /// RSSI derived from frame error counts
    FrameErrors,
    /// Native CRSF link quality
    RxProtocolCrsf,
}

impl RssiSource {
    /// Whether link quality is taken from CRSF link statistics frames
    pub fn is_crsf(self) -> bool {
        matches!(self, RssiSource::RxProtocolCrsf)
    }
}

/// Compose a CRSF link statistics frame into the native 0-300 scale
///
/// The RF mode selects the hundreds band and the uplink link quality
/// percentage fills it, so `rf_mode = 2, uplink_lq = 87` becomes `287`.
/// The result is capped at the top of the scale.
pub fn crsf_link_quality(stats: &LinkStatistics) -> u16 {
    let lq = u16::from(stats.uplink_lq.min(CRSF_UPLINK_LQ_MAX));
    let band = u16::from(stats.rf_mode) * u16::from(CRSF_UPLINK_LQ_MAX);

    band.saturating_add(lq).min(LINK_QUALITY_MAX_VALUE)
}
