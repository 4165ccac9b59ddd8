//! # CRSF Protocol Module
//!
//! The parts of the Crossfire (CRSF) protocol needed to follow link quality.
//!
//! This module handles:
//! - Frame validation (sync byte, length, CRC8-DVB-S2)
//! - Link Statistics telemetry decoding
//! - Frame encoding for test streams and replay

pub mod protocol;
pub mod encoder;
pub mod decoder;
pub mod crc;
