//! # LQ Monitor
//!
//! Follows the link quality of a CRSF receiver, renders the OSD link quality
//! element and logs the history as JSONL telemetry.

use std::time::Duration;

use anyhow::{Context, Result};
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use lq_monitor::config::Config;
use lq_monitor::monitor::LinkMonitor;
use lq_monitor::osd::element::LinkQualityElement;
use lq_monitor::osd::TextDisplay;
use lq_monitor::serial::ReceiverSerial;
use lq_monitor::telemetry::logger::TelemetryLogger;
use lq_monitor::telemetry::record::LinkQualityRecord;

/// Configuration file used when no path is given on the command line
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Main entry point for the link quality monitor
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Set up logging with tracing subscriber
///    - Load configuration (first argument, or `config/default.toml`)
///    - Open the receiver serial port and the telemetry log
///
/// 2. **Main Loop**
///    - Feed every valid CRSF frame to the link monitor
///    - Sample frame presence every `sample_interval_ms`
///    - Render the OSD element every `refresh_interval_ms`
///    - Append a telemetry record every `log_interval_ms`
///    - Handle Ctrl+C for graceful shutdown
///
/// # Errors
///
/// Returns error if:
/// - Configuration cannot be loaded
/// - No receiver serial device can be opened
/// - Reading from the receiver fails
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into())
        )
        .init();

    info!("LQ Monitor v{} starting...", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load configuration from {}", config_path))?;
    info!("Loaded configuration from {}", config_path);

    let mut serial = ReceiverSerial::open(&config.serial)?;

    let mut telemetry = if config.telemetry.enabled {
        Some(TelemetryLogger::new(&config.telemetry)?)
    } else {
        info!("Telemetry logging disabled");
        None
    };

    let source = config.link_quality.rssi_source;
    let mut monitor = LinkMonitor::new(source);
    let element = LinkQualityElement::from(&config.osd);
    let mut osd = TextDisplay::new();

    let mut sample_tick = interval(Duration::from_millis(config.link_quality.sample_interval_ms));
    let mut osd_tick = interval(Duration::from_millis(config.osd.refresh_interval_ms));
    let mut log_tick = interval(Duration::from_millis(config.telemetry.log_interval_ms));
    for tick in [&mut sample_tick, &mut osd_tick, &mut log_tick] {
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    }

    let started = Instant::now();
    let mut last_osd_value = None;

    info!("Monitoring link quality from {} (source: {:?})", serial.device_path(), source);
    info!("Press Ctrl+C to exit");

    loop {
        tokio::select! {
            frame = serial.next_frame() => {
                match frame? {
                    Some(frame) => monitor.on_frame(&frame),
                    None => {
                        warn!("Receiver closed the serial stream");
                        break;
                    }
                }
            }

            _ = sample_tick.tick() => {
                monitor.on_sample_tick();
            }

            _ = osd_tick.tick() => {
                let value = element.render(&mut osd, monitor.link_quality(), source, started.elapsed());
                debug!("OSD row {}: [{}]", element.y, osd.row(element.y));

                if last_osd_value != Some(value) {
                    info!("Link quality {} (OSD {})", monitor.link_quality().get(), value);
                    last_osd_value = Some(value);
                }
            }

            _ = log_tick.tick(), if telemetry.is_some() => {
                let record = LinkQualityRecord::capture(
                    monitor.link_quality(),
                    source,
                    serial.stats(),
                    monitor.last_link_stats(),
                );
                if let Some(logger) = telemetry.as_mut() {
                    if let Err(e) = logger.log(&record) {
                        warn!("Failed to write telemetry record: {}", e);
                    }
                }
            }

            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                break;
            }
        }
    }

    let stats = serial.stats();
    info!(
        "Frames received: {}, rejected: {}, bytes skipped: {}",
        stats.frames, stats.rejected_frames, stats.skipped_bytes
    );

    Ok(())
}
