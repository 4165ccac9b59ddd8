//! # Link Quality OSD Element
//!
//! Renders the link quality display value as a right-aligned 3-character
//! field. With an alarm threshold set, the field blinks at 5 Hz while the
//! link quality percentage is below it.

use std::time::Duration;

use super::DisplayPort;
use crate::config::OsdConfig;
use crate::rx::link_quality::{LinkQuality, LINK_QUALITY_MAX_VALUE};
use crate::rx::source::RssiSource;

/// Width of the rendered field
pub const LINK_QUALITY_FIELD_WIDTH: usize = 3;

/// Length of one blink phase (5 Hz toggle)
pub const BLINK_PHASE: Duration = Duration::from_millis(200);

/// Link quality element placement and alarm
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkQualityElement {
    pub x: u8,
    pub y: u8,
    /// Link quality percentage below which the element blinks (0 disables)
    pub alarm: u16,
}

impl From<&OsdConfig> for LinkQualityElement {
    fn from(config: &OsdConfig) -> Self {
        Self {
            x: config.x,
            y: config.y,
            alarm: config.alarm,
        }
    }
}

impl LinkQualityElement {
    /// Element at `(x, y)` with the alarm disabled
    pub fn new(x: u8, y: u8) -> Self {
        Self { x, y, alarm: 0 }
    }

    /// Whether `lq` is in the alarm range
    ///
    /// The threshold is a percentage of the native scale, so it means the
    /// same thing whichever representation the OSD shows.
    pub fn in_alarm(&self, lq: &LinkQuality) -> bool {
        link_quality_percent(lq.get()) < self.alarm
    }

    /// Draw the element for the current link quality
    ///
    /// `now` is the time since OSD start; it only matters while the link
    /// is in the alarm range, where the field is blanked in odd blink phases.
    ///
    /// # Returns
    ///
    /// * `u16` - The display value that was rendered
    pub fn render<D: DisplayPort + ?Sized>(
        &self,
        display: &mut D,
        lq: &LinkQuality,
        source: RssiSource,
        now: Duration,
    ) -> u16 {
        let value = lq.osd_value(source);

        if self.in_alarm(lq) && !blink_visible(now) {
            display.write_string(self.x, self.y, &" ".repeat(LINK_QUALITY_FIELD_WIDTH));
        } else {
            display.write_string(self.x, self.y, &format_field(value));
        }

        value
    }
}

/// Native 0-300 value as a 0-100 percentage
pub fn link_quality_percent(value: u16) -> u16 {
    let value = u32::from(value.min(LINK_QUALITY_MAX_VALUE));
    (value * 100 / u32::from(LINK_QUALITY_MAX_VALUE)) as u16
}

/// Right-align `value` in the 3-character field
pub fn format_field(value: u16) -> String {
    format!("{:>width$}", value, width = LINK_QUALITY_FIELD_WIDTH)
}

fn blink_visible(now: Duration) -> bool {
    (now.as_millis() / BLINK_PHASE.as_millis()) % 2 == 0
}
