//! # Link Quality Sampler
//!
//! Rolling-window smoothing of raw receiver link quality readings.
//!
//! Raw readings arrive on a 0-300 scale. Each reading is written into a
//! fixed ring of [`LINK_QUALITY_SAMPLE_COUNT`] slots and the mean over the
//! whole ring is returned. The owner publishes that mean as the current
//! value with [`LinkQuality::set_direct`], or uses [`LinkQuality::record`]
//! which does both steps.
//!
//! ## Usage
//!
//! ```
//! use lq_monitor::rx::link_quality::LinkQuality;
//! use lq_monitor::rx::source::RssiSource;
//!
//! let mut lq = LinkQuality::new();
//! for _ in 0..8 {
//!     lq.record(300);
//!     lq.record(0);
//! }
//! assert_eq!(lq.get(), 150);
//! assert_eq!(lq.osd_value(RssiSource::RxChannel), 5);
//! assert_eq!(lq.osd_value(RssiSource::RxProtocolCrsf), 150);
//! ```

use super::source::RssiSource;

/// Number of raw readings in the smoothing window
pub const LINK_QUALITY_SAMPLE_COUNT: usize = 16;

/// Upper bound of the native link quality scale
pub const LINK_QUALITY_MAX_VALUE: u16 = 300;

/// Largest value shown by the compact (single digit) OSD representation
pub const LINK_QUALITY_OSD_DIGIT_MAX: u16 = 9;

/// Smoothed link quality state
///
/// Holds the sample ring, the write cursor, a running sum of the ring and
/// the currently published value. A fresh instance reports
/// [`LINK_QUALITY_MAX_VALUE`] until the first value is published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkQuality {
    samples: [u16; LINK_QUALITY_SAMPLE_COUNT],
    index: usize,
    sum: u32,
    current: u16,
}

impl Default for LinkQuality {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkQuality {
    /// Create a sampler with an empty window and the current value at max
    pub fn new() -> Self {
        Self {
            samples: [0; LINK_QUALITY_SAMPLE_COUNT],
            index: 0,
            sum: 0,
            current: LINK_QUALITY_MAX_VALUE,
        }
    }

    /// Insert a raw reading and return the window mean
    ///
    /// The reading is clamped to [`LINK_QUALITY_MAX_VALUE`] before it enters
    /// the ring. The mean is taken over every slot, so slots that were never
    /// written count as zero. The published value is left untouched.
    ///
    /// # Arguments
    ///
    /// * `raw` - Raw link quality reading (0-300)
    ///
    /// # Returns
    ///
    /// * `u16` - Truncated mean of the window (0-300)
    pub fn update_samples(&mut self, raw: u16) -> u16 {
        let value = raw.min(LINK_QUALITY_MAX_VALUE);

        self.sum -= u32::from(self.samples[self.index]);
        self.sum += u32::from(value);
        self.samples[self.index] = value;
        self.index = (self.index + 1) % LINK_QUALITY_SAMPLE_COUNT;

        (self.sum / LINK_QUALITY_SAMPLE_COUNT as u32) as u16
    }

    /// Overwrite the published value, bypassing the window
    ///
    /// Reads return this value until the next publish. Values above
    /// [`LINK_QUALITY_MAX_VALUE`] are clamped.
    pub fn set_direct(&mut self, value: u16) {
        self.current = value.min(LINK_QUALITY_MAX_VALUE);
    }

    /// Insert a raw reading and publish the resulting mean
    pub fn record(&mut self, raw: u16) -> u16 {
        let smoothed = self.update_samples(raw);
        self.set_direct(smoothed);
        smoothed
    }

    /// Record one frame period: full quality if a frame arrived, zero if not
    pub fn record_frame(&mut self, received: bool) -> u16 {
        self.record(if received { LINK_QUALITY_MAX_VALUE } else { 0 })
    }

    /// Published link quality on the native 0-300 scale
    pub fn get(&self) -> u16 {
        self.current
    }

    /// Published link quality in its OSD representation for `source`
    pub fn osd_value(&self, source: RssiSource) -> u16 {
        link_quality_osd(self.current, source)
    }

    /// Return to the freshly constructed state
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

/// Scale a native link quality value for on-screen display
///
/// CRSF reports its own high resolution metric, which is shown unchanged.
/// Every other source is compressed to a single digit (0-9) so the element
/// stays compact.
///
/// # Examples
///
/// ```
/// use lq_monitor::rx::link_quality::link_quality_osd;
/// use lq_monitor::rx::source::RssiSource;
///
/// assert_eq!(link_quality_osd(300, RssiSource::RxChannel), 9);
/// assert_eq!(link_quality_osd(150, RssiSource::RxChannel), 5);
/// assert_eq!(link_quality_osd(150, RssiSource::RxProtocolCrsf), 150);
/// ```
pub fn link_quality_osd(value: u16, source: RssiSource) -> u16 {
    let value = value.min(LINK_QUALITY_MAX_VALUE);

    match source {
        RssiSource::RxProtocolCrsf => value,
        _ => {
            // Full scale would read 10, which does not fit a single digit
            let decile = u32::from(value) * 10 / u32::from(LINK_QUALITY_MAX_VALUE);
            (decile as u16).min(LINK_QUALITY_OSD_DIGIT_MAX)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_SOURCES: [RssiSource; 7] = [
        RssiSource::None,
        RssiSource::Adc,
        RssiSource::RxChannel,
        RssiSource::RxProtocol,
        RssiSource::Msp,
        RssiSource::FrameErrors,
        RssiSource::RxProtocolCrsf,
    ];

    fn fill(lq: &mut LinkQuality, value: u16) {
        for _ in 0..LINK_QUALITY_SAMPLE_COUNT {
            let smoothed = lq.update_samples(value);
            lq.set_direct(smoothed);
        }
    }

    fn fill_alternating(lq: &mut LinkQuality) {
        for _ in 0..LINK_QUALITY_SAMPLE_COUNT {
            let smoothed = lq.update_samples(300);
            lq.set_direct(smoothed);
            let smoothed = lq.update_samples(0);
            lq.set_direct(smoothed);
        }
    }

    #[test]
    fn test_new_reports_max() {
        let lq = LinkQuality::new();
        assert_eq!(lq.get(), LINK_QUALITY_MAX_VALUE);
        assert_eq!(lq.osd_value(RssiSource::RxChannel), 9);
        assert_eq!(lq.osd_value(RssiSource::RxProtocolCrsf), 300);
    }

    #[test]
    fn test_alternating_samples_average_to_half() {
        let mut lq = LinkQuality::new();
        fill_alternating(&mut lq);

        assert_eq!(lq.get(), 150);
        assert_eq!(lq.osd_value(RssiSource::RxChannel), 5);
    }

    #[test]
    fn test_crsf_source_passes_value_through() {
        let mut lq = LinkQuality::new();
        fill_alternating(&mut lq);

        assert_eq!(lq.get(), 150);
        assert_eq!(lq.osd_value(RssiSource::RxProtocolCrsf), 150);
    }

    #[test]
    fn test_tx_off_reads_zero_for_every_source() {
        let mut lq = LinkQuality::new();
        fill_alternating(&mut lq);

        lq.set_direct(0);
        assert_eq!(lq.get(), 0);
        for source in ALL_SOURCES {
            assert_eq!(lq.osd_value(source), 0, "source {:?}", source);
        }
    }

    #[test]
    fn test_full_window_of_max() {
        let mut lq = LinkQuality::new();
        fill(&mut lq, 300);

        assert_eq!(lq.get(), 300);
        assert_eq!(lq.osd_value(RssiSource::RxChannel), 9);
        assert_eq!(lq.osd_value(RssiSource::RxProtocolCrsf), 300);
    }

    #[test]
    fn test_full_window_of_zero() {
        let mut lq = LinkQuality::new();
        fill(&mut lq, 300);
        fill(&mut lq, 0);

        assert_eq!(lq.get(), 0);
        assert_eq!(lq.osd_value(RssiSource::RxChannel), 0);
    }

    #[test]
    fn test_partial_window_counts_empty_slots_as_zero() {
        let mut lq = LinkQuality::new();
        // 300 / 16 = 18.75
        assert_eq!(lq.update_samples(300), 18);
        assert_eq!(lq.update_samples(300), 37);
    }

    #[test]
    fn test_update_samples_does_not_publish() {
        let mut lq = LinkQuality::new();
        fill(&mut lq, 0);
        lq.set_direct(120);

        lq.update_samples(0);
        assert_eq!(lq.get(), 120);
    }

    #[test]
    fn test_out_of_range_input_is_clamped() {
        let mut lq = LinkQuality::new();
        for _ in 0..LINK_QUALITY_SAMPLE_COUNT {
            lq.record(u16::MAX);
        }
        assert_eq!(lq.get(), LINK_QUALITY_MAX_VALUE);

        lq.set_direct(1000);
        assert_eq!(lq.get(), LINK_QUALITY_MAX_VALUE);
    }

    #[test]
    fn test_oldest_sample_is_replaced() {
        let mut lq = LinkQuality::new();
        fill(&mut lq, 0);

        // One slot of 160 in a window of zeros
        assert_eq!(lq.record(160), 10);
        // A full cycle later the 160 has been pushed out
        for _ in 0..LINK_QUALITY_SAMPLE_COUNT {
            lq.record(0);
        }
        assert_eq!(lq.get(), 0);
    }

    #[test]
    fn test_reads_are_idempotent() {
        let mut lq = LinkQuality::new();
        fill_alternating(&mut lq);

        let first = (lq.get(), lq.osd_value(RssiSource::RxChannel));
        for _ in 0..10 {
            assert_eq!((lq.get(), lq.osd_value(RssiSource::RxChannel)), first);
        }
    }

    #[test]
    fn test_record_frame() {
        let mut lq = LinkQuality::new();
        for _ in 0..LINK_QUALITY_SAMPLE_COUNT / 2 {
            lq.record_frame(true);
            lq.record_frame(false);
        }
        assert_eq!(lq.get(), 150);
    }

    #[test]
    fn test_reset() {
        let mut lq = LinkQuality::new();
        fill(&mut lq, 0);
        assert_eq!(lq.get(), 0);

        lq.reset();
        assert_eq!(lq, LinkQuality::new());
        assert_eq!(lq.get(), LINK_QUALITY_MAX_VALUE);
    }

    #[test]
    fn test_independent_instances() {
        let mut a = LinkQuality::new();
        let b = LinkQuality::new();
        fill(&mut a, 0);

        assert_eq!(a.get(), 0);
        assert_eq!(b.get(), LINK_QUALITY_MAX_VALUE);
    }

    #[test]
    fn test_osd_scale_boundaries() {
        assert_eq!(link_quality_osd(0, RssiSource::RxChannel), 0);
        assert_eq!(link_quality_osd(29, RssiSource::RxChannel), 0);
        assert_eq!(link_quality_osd(30, RssiSource::RxChannel), 1);
        assert_eq!(link_quality_osd(269, RssiSource::RxChannel), 8);
        assert_eq!(link_quality_osd(270, RssiSource::RxChannel), 9);
        assert_eq!(link_quality_osd(300, RssiSource::RxChannel), 9);
        assert_eq!(link_quality_osd(300, RssiSource::Adc), 9);
    }

    #[test]
    fn test_mean_stays_within_scale() {
        let mut lq = LinkQuality::new();
        for raw in (0..2000u16).step_by(37) {
            let smoothed = lq.record(raw);
            assert!(smoothed <= LINK_QUALITY_MAX_VALUE);
        }
    }
}
