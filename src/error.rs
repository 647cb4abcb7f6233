//! Error types and result definitions

use thiserror::Error;

/// Result type alias for Thermowatch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Rejected detector configuration. Raised at construction time only.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    /// Window capacity must hold at least one value
    #[error("window capacity must be positive")]
    ZeroWindowCapacity,

    /// Calibration needs at least one reading
    #[error("calibration minimum must be positive")]
    ZeroCalibrationMinimum,

    /// The window could never fill up enough to finish calibrating
    #[error("calibration minimum {minimum} exceeds window capacity {capacity}")]
    CalibrationExceedsCapacity {
        /// Configured calibration minimum (M)
        minimum: usize,
        /// Configured window capacity (W)
        capacity: usize,
    },

    /// Thresholds must be finite and strictly positive
    #[error("{name} must be a positive finite number, got {value}")]
    InvalidThreshold {
        /// Name of the offending setting
        name: &'static str,
        /// The rejected value
        value: f64,
    },
}

/// A reading (or raw payload) that cannot be classified.
///
/// The detector state is left untouched whenever one of these is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MalformedReadingError {
    /// The payload is not a JSON object we understand
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// No temperature value present
    #[error("reading has no temperature value")]
    MissingValue,

    /// Temperature present but not a number
    #[error("temperature is not numeric: {0}")]
    NonNumericValue(String),

    /// NaN or infinite value
    #[error("temperature is not finite: {0}")]
    NonFiniteValue(f64),
}

/// Transport-level failures raised by reading sources and publishers.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Broker connection could not be established or was lost for good
    #[error("Connection error: {0}")]
    Connection(String),

    /// Subscribing to the topic failed
    #[error("Subscription error: {0}")]
    Subscription(String),

    /// Publishing a message failed
    #[error("Publish error: {0}")]
    Publish(String),

    /// Replay file could not be read
    #[error("Replay error: {0}")]
    Replay(#[from] std::io::Error),

    /// Async runtime could not be created
    #[error("Runtime error: {0}")]
    Runtime(String),
}

/// Main error type for Thermowatch
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Malformed reading
    #[error("Malformed reading: {0}")]
    MalformedReading(#[from] MalformedReadingError),

    /// Source or publisher error
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
