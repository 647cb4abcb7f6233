//! Default settings for the sensor deployment
//!
//! Binaries start from these and let command-line flags override them.

// MQTT broker
pub const BROKER_ADDRESS: &str = "localhost";
pub const BROKER_PORT: u16 = 1883;
pub const KEEP_ALIVE_INTERVAL_SECS: u64 = 60;

pub const TOPIC_NAME: &str = "factory/machine1/temperature";

// Simulation
pub const SENSOR_ID: &str = "sensor-01";
/// Seconds between published readings
pub const TRANSMISSION_RATE_SECS: f64 = 1.0;
pub const NORMAL_TEMP_MEAN: f64 = 25.0;
/// Half-width of the uniform band around `NORMAL_TEMP_MEAN`
pub const NORMAL_TEMP_SPREAD: f64 = 5.0;
pub const ANOMALY_TEMP_MIN: f64 = 90.0;
pub const ANOMALY_TEMP_MAX: f64 = 105.0;
pub const ANOMALY_CHANCE: f64 = 0.1;

// Detection
/// Fail-safe hard limit for alarms
pub const ANOMALY_THRESHOLD: f64 = 90.0;
pub const Z_SCORE_THRESHOLD: f64 = 3.0;
/// History window size for statistical learning
pub const WINDOW_SIZE: usize = 50;
/// Calibration samples needed before detection starts
pub const MIN_DATA_REQUIRED: usize = 20;
