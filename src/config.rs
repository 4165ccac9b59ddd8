//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::Deserialize;
use serde::de::Error;
use std::fs;
use std::path::Path;

use crate::error::{LinkQualityError, Result};
use crate::rx::source::RssiSource;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub serial: SerialConfig,
    pub link_quality: LinkQualityConfig,
    pub osd: OsdConfig,
    pub telemetry: TelemetryConfig,
}

/// Serial port configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SerialConfig {
    #[serde(default = "default_serial_port")]
    pub port: String,

    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Link quality sampling configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LinkQualityConfig {
    /// Where the link quality metric comes from
    #[serde(default = "default_rssi_source")]
    pub rssi_source: RssiSource,

    /// Period of frame-presence sampling (non-CRSF sources)
    #[serde(default = "default_sample_interval_ms")]
    pub sample_interval_ms: u64,
}

/// OSD link quality element configuration
#[derive(Debug, Deserialize, Clone)]
pub struct OsdConfig {
    /// Column of the element
    #[serde(default = "default_osd_x")]
    pub x: u8,

    /// Row of the element
    #[serde(default = "default_osd_y")]
    pub y: u8,

    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,

    /// Blink the element below this link quality percentage (0 disables)
    #[serde(default)]
    pub alarm: u16,
}

/// Telemetry configuration
#[derive(Debug, Deserialize, Clone)]
pub struct TelemetryConfig {
    #[serde(default = "default_telemetry_enabled")]
    pub enabled: bool,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default = "default_max_records_per_file")]
    pub max_records_per_file: usize,

    #[serde(default = "default_max_files_to_keep")]
    pub max_files_to_keep: usize,

    #[serde(default = "default_log_interval_ms")]
    pub log_interval_ms: u64,

    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_serial_port() -> String { "/dev/ttyACM0".to_string() }
fn default_baud_rate() -> u32 { 420000 }
fn default_timeout_ms() -> u64 { 100 }

fn default_rssi_source() -> RssiSource { RssiSource::RxProtocolCrsf }
fn default_sample_interval_ms() -> u64 { 20 }

fn default_osd_x() -> u8 { 8 }
fn default_osd_y() -> u8 { 1 }
fn default_refresh_interval_ms() -> u64 { 100 }

fn default_telemetry_enabled() -> bool { true }
fn default_log_dir() -> String { "./logs".to_string() }
fn default_max_records_per_file() -> usize { 10000 }
fn default_max_files_to_keep() -> usize { 10 }
fn default_log_interval_ms() -> u64 { 1000 }
fn default_log_format() -> String { "jsonl".to_string() }

/// Largest OSD column (PAL character grid is 30 wide)
const OSD_MAX_X: u8 = 29;
/// Largest OSD row (PAL character grid is 16 high)
const OSD_MAX_Y: u8 = 15;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use lq_monitor::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    fn validate(&self) -> Result<()> {
        if self.serial.port.is_empty() {
            return Err(invalid("serial port cannot be empty"));
        }

        if ![115200, 400000, 416666, 420000, 921600, 1870000].contains(&self.serial.baud_rate) {
            return Err(invalid("baud_rate must be one of: 115200, 400000, 416666, 420000, 921600, 1870000"));
        }

        if self.serial.timeout_ms == 0 || self.serial.timeout_ms > 10000 {
            return Err(invalid("timeout_ms must be between 1 and 10000"));
        }

        if self.link_quality.sample_interval_ms == 0 || self.link_quality.sample_interval_ms > 1000 {
            return Err(invalid("sample_interval_ms must be between 1 and 1000"));
        }

        if self.osd.x > OSD_MAX_X || self.osd.y > OSD_MAX_Y {
            return Err(invalid(format!(
                "osd position ({}, {}) is off screen (max {}, {})",
                self.osd.x, self.osd.y, OSD_MAX_X, OSD_MAX_Y
            )));
        }

        if self.osd.refresh_interval_ms == 0 || self.osd.refresh_interval_ms > 10000 {
            return Err(invalid("refresh_interval_ms must be between 1 and 10000"));
        }

        if self.osd.alarm > 100 {
            return Err(invalid("osd alarm must be a percentage between 0 and 100"));
        }

        if self.telemetry.enabled && self.telemetry.log_dir.is_empty() {
            return Err(invalid("telemetry log_dir cannot be empty when enabled"));
        }

        if self.telemetry.log_interval_ms == 0 || self.telemetry.log_interval_ms > 60000 {
            return Err(invalid("log_interval_ms must be between 1 and 60000"));
        }

        if self.telemetry.max_records_per_file == 0 {
            return Err(invalid("max_records_per_file must be greater than 0"));
        }

        if self.telemetry.max_files_to_keep == 0 {
            return Err(invalid("max_files_to_keep must be greater than 0"));
        }

        if self.telemetry.format != "jsonl" {
            return Err(invalid("log format must be 'jsonl' (only supported format)"));
        }

        Ok(())
    }
}

fn invalid(msg: impl std::fmt::Display) -> LinkQualityError {
    LinkQualityError::Config(toml::de::Error::custom(msg))
}
