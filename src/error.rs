//! # Error Types
//!
//! Custom error types for the link quality monitor using `thiserror`.

use thiserror::Error;

/// Main error type for the link quality monitor
#[derive(Debug, Error)]
pub enum LinkQualityError {
    /// CRSF protocol errors
    #[error("CRSF protocol error: {0}")]
    CrsfProtocol(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serial port errors
    #[error("Serial error: {0}")]
    Serial(String),

    /// None of the candidate serial devices could be opened
    #[error("No receiver serial device found (tried: {0})")]
    SerialPortNotFound(String),

    /// Telemetry record serialization errors
    #[error("Telemetry error: {0}")]
    Telemetry(#[from] serde_json::Error),
}

/// Result type alias for the link quality monitor
pub type Result<T> = std::result::Result<T, LinkQualityError>;
