//! # Telemetry Module
//!
//! Handles link quality logging to JSONL files with rotation.
//!
//! This module handles:
//! - Capturing link quality snapshots with timestamps
//! - Formatting as JSONL (JSON Lines)
//! - Managing file rotation (max N records per file)
//! - Retaining only last M files

pub mod logger;
pub mod record;
