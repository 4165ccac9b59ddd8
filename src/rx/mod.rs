//! # Receiver Link Quality
//!
//! Link quality tracking for the radio receiver.
//!
//! This module handles:
//! - Smoothing raw link quality readings over a rolling window
//! - Selecting the OSD representation from the RSSI source
//! - Turning CRSF link statistics into the native 0-300 scale

pub mod link_quality;
pub mod source;
