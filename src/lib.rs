//! # LQ Monitor Library
//!
//! Receiver link quality sampling, smoothing and on-screen display.
//!
//! This library provides a rolling-window link quality filter, the CRSF
//! decoding that feeds it from a receiver, the OSD element that shows it and
//! JSONL telemetry logging of its history.

pub mod config;
pub mod error;
pub mod monitor;
pub mod crsf;
pub mod osd;
pub mod rx;
pub mod serial;
pub mod telemetry;
