//! Telemetry record written once per logging interval.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::crsf::protocol::LinkStatistics;
use crate::rx::link_quality::LinkQuality;
use crate::rx::source::RssiSource;
use crate::serial::reader::ReaderStats;

/// Snapshot of the link quality state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkQualityRecord {
    pub timestamp: DateTime<Utc>,
    pub rssi_source: RssiSource,
    /// Native 0-300 value
    pub link_quality: u16,
    /// Value as shown on the OSD
    pub osd_value: u16,
    pub frames: u64,
    pub rejected_frames: u64,
    /// Most recent CRSF link statistics, if any arrived
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_stats: Option<LinkStatistics>,
}

impl LinkQualityRecord {
    /// Capture the current state, stamped with the current time
    pub fn capture(
        lq: &LinkQuality,
        source: RssiSource,
        stats: ReaderStats,
        link_stats: Option<LinkStatistics>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            rssi_source: source,
            link_quality: lq.get(),
            osd_value: lq.osd_value(source),
            frames: stats.frames,
            rejected_frames: stats.rejected_frames,
            link_stats,
        }
    }
}
