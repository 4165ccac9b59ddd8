//! # Link Monitor
//!
//! Feeds the link quality sampler from received CRSF frames.
//!
//! How link quality is obtained depends on the RSSI source:
//!
//! - **CRSF**: every Link Statistics frame is composed into the 0-300 scale
//!   and published directly.
//! - **Anything else**: on each sample tick the sampler records full quality
//!   if at least one valid frame arrived since the previous tick, zero if not.
//!
//! A run of [`LINK_LOST_TICKS`] ticks without frames marks the link as lost.
//! Under CRSF the published value drops to zero; the first frame after that
//! restores the initial state.

use tracing::{debug, info, warn};

use crate::crsf::decoder::decode_link_statistics;
use crate::crsf::protocol::{CrsfFrame, LinkStatistics};
use crate::rx::link_quality::LinkQuality;
use crate::rx::source::{crsf_link_quality, RssiSource};

/// Consecutive frameless sample ticks before the link counts as lost
pub const LINK_LOST_TICKS: u32 = 25;

/// Link quality state driven by the receiver frame stream
#[derive(Debug, Clone)]
pub struct LinkMonitor {
    lq: LinkQuality,
    source: RssiSource,
    frame_since_tick: bool,
    missed_ticks: u32,
    link_lost: bool,
    last_link_stats: Option<LinkStatistics>,
}

impl LinkMonitor {
    /// Monitor for `source`, starting at maximum link quality
    pub fn new(source: RssiSource) -> Self {
        Self {
            lq: LinkQuality::new(),
            source,
            frame_since_tick: false,
            missed_ticks: 0,
            link_lost: false,
            last_link_stats: None,
        }
    }

    /// Handle one valid frame from the receiver
    pub fn on_frame(&mut self, frame: &CrsfFrame) {
        self.frame_since_tick = true;
        self.missed_ticks = 0;

        if self.link_lost {
            info!("Receiver link reacquired");
            self.link_lost = false;
            if self.source.is_crsf() {
                self.lq.reset();
            }
        }

        if !frame.is_link_statistics() {
            return;
        }

        match decode_link_statistics(&frame.payload) {
            Ok(stats) => {
                self.last_link_stats = Some(stats);
                if self.source.is_crsf() {
                    let value = crsf_link_quality(&stats);
                    self.lq.set_direct(value);
                    debug!(
                        "Link stats: LQ {}% rf_mode {} -> {}",
                        stats.uplink_lq, stats.rf_mode, value
                    );
                }
            }
            Err(e) => warn!("Ignoring link statistics frame: {}", e),
        }
    }

    /// Handle one sample period elapsing
    pub fn on_sample_tick(&mut self) {
        let received = std::mem::take(&mut self.frame_since_tick);

        if !self.source.is_crsf() {
            self.lq.record_frame(received);
        }

        if received {
            return;
        }

        self.missed_ticks = self.missed_ticks.saturating_add(1);
        if self.missed_ticks >= LINK_LOST_TICKS && !self.link_lost {
            warn!("Receiver link lost ({} sample periods without frames)", self.missed_ticks);
            self.link_lost = true;
            if self.source.is_crsf() {
                self.lq.set_direct(0);
            }
        }
    }

    /// Current smoothed link quality state
    pub fn link_quality(&self) -> &LinkQuality {
        &self.lq
    }

    /// Configured RSSI source
    pub fn source(&self) -> RssiSource {
        self.source
    }

    /// Whether the link is currently considered lost
    pub fn is_link_lost(&self) -> bool {
        self.link_lost
    }

    /// Most recent decoded link statistics
    pub fn last_link_stats(&self) -> Option<LinkStatistics> {
        self.last_link_stats
    }
}
