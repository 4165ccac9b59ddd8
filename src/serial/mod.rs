//! # Serial Communication Module
//!
//! Handles the serial link from the CRSF receiver.
//!
//! This module handles:
//! - Opening the receiver serial port (420,000 baud, 8N1 by default)
//! - Falling back to common device paths when the configured one is missing
//! - Extracting CRSF frames from the incoming byte stream

pub mod reader;

use std::time::Duration;

use crate::config::SerialConfig;
use crate::crsf::protocol::CrsfFrame;
use crate::error::{LinkQualityError, Result};
use reader::{FrameReader, ReaderStats};
use tokio_serial::SerialPortBuilderExt;
use tracing::{debug, info, warn};

/// CRSF baud rate (420,000 baud)
pub const CRSF_BAUD_RATE: u32 = 420_000;

/// Fallback device paths to try after the configured one (in order of preference)
const FALLBACK_DEVICE_PATHS: &[&str] = &[
    "/dev/ttyACM0", // USB CDC devices
    "/dev/ttyUSB0", // USB-to-serial adapters
];

/// Receiver serial port handler
///
/// Owns the serial stream and the frame reader on top of it.
pub struct ReceiverSerial {
    reader: FrameReader<tokio_serial::SerialStream>,
    device_path: String,
}

impl std::fmt::Debug for ReceiverSerial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReceiverSerial")
            .field("device_path", &self.device_path)
            .field("stats", &self.reader.stats())
            .finish_non_exhaustive()
    }
}

impl ReceiverSerial {
    /// Open the receiver port described by `config`
    ///
    /// The configured port is tried first, then the fallback paths.
    ///
    /// # Errors
    ///
    /// Returns [`LinkQualityError::SerialPortNotFound`] if no candidate opens
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use lq_monitor::config::Config;
    /// use lq_monitor::serial::ReceiverSerial;
    ///
    /// fn main() -> anyhow::Result<()> {
    ///     let config = Config::load("config/default.toml")?;
    ///     let serial = ReceiverSerial::open(&config.serial)?;
    ///     println!("Listening on {}", serial.device_path());
    ///     Ok(())
    /// }
    /// ```
    pub fn open(config: &SerialConfig) -> Result<Self> {
        let paths = candidate_paths(&config.port);
        let timeout = Duration::from_millis(config.timeout_ms);
        Self::open_with_paths(&paths, config.baud_rate, timeout)
    }

    /// Open the first device in `paths` that accepts the port settings
    pub fn open_with_paths(paths: &[&str], baud_rate: u32, timeout: Duration) -> Result<Self> {
        for path in paths {
            debug!("Trying to open serial port: {}", path);

            match Self::open_port(path, baud_rate, timeout) {
                Ok(port) => {
                    info!("Opened receiver at {} ({} baud)", path, baud_rate);
                    return Ok(Self {
                        reader: FrameReader::new(port),
                        device_path: path.to_string(),
                    });
                }
                Err(e) => {
                    warn!("Failed to open {}: {}", path, e);
                }
            }
        }

        Err(LinkQualityError::SerialPortNotFound(paths.join(", ")))
    }

    fn open_port(path: &str, baud_rate: u32, timeout: Duration) -> Result<tokio_serial::SerialStream> {
        tokio_serial::new(path, baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .timeout(timeout)
            .open_native_async()
            .map_err(|e| LinkQualityError::Serial(format!("Failed to open {}: {}", path, e)))
    }

    /// Wait for the next valid CRSF frame from the receiver
    ///
    /// Returns `Ok(None)` if the device closed the stream.
    pub async fn next_frame(&mut self) -> Result<Option<CrsfFrame>> {
        self.reader.next_frame().await
    }

    /// Stream health counters
    pub fn stats(&self) -> ReaderStats {
        self.reader.stats()
    }

    /// Path of the opened device
    pub fn device_path(&self) -> &str {
        &self.device_path
    }
}

/// Configured port first, then the fallbacks, without duplicates
fn candidate_paths(configured: &str) -> Vec<&str> {
    let mut paths = vec![configured];
    paths.extend(FALLBACK_DEVICE_PATHS.iter().copied().filter(|p| *p != configured));
    paths
}
