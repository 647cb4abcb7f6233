use crate::config;
use crate::core::unix_timestamp;
use crate::parsing::payload::ReadingPayload;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::ops::RangeInclusive;

/// Settings for the simulated sensor.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatorConfig {
    pub sensor_id: String,
    /// Probability that a reading is drawn from the critical band
    pub anomaly_chance: f64,
    pub normal_range: RangeInclusive<f64>,
    pub anomaly_range: RangeInclusive<f64>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            sensor_id: config::SENSOR_ID.to_string(),
            anomaly_chance: config::ANOMALY_CHANCE,
            normal_range: (config::NORMAL_TEMP_MEAN - config::NORMAL_TEMP_SPREAD)
                ..=(config::NORMAL_TEMP_MEAN + config::NORMAL_TEMP_SPREAD),
            anomaly_range: config::ANOMALY_TEMP_MIN..=config::ANOMALY_TEMP_MAX,
        }
    }
}

/// Band a simulated reading was drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulatedStatus {
    Normal,
    Critical,
}

impl fmt::Display for SimulatedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulatedStatus::Normal => write!(f, "NORMAL"),
            SimulatedStatus::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Random temperature generator standing in for a real sensor.
pub struct SensorSimulator {
    config: SimulatorConfig,
    rng: StdRng,
}

impl SensorSimulator {
    pub fn new(config: SimulatorConfig) -> Self {
        Self {
            config,
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic generator, for reproducible runs.
    pub fn with_seed(config: SimulatorConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Draws the next temperature, rounded to two decimals.
    pub fn next_temperature(&mut self) -> (f64, SimulatedStatus) {
        let chance = if self.config.anomaly_chance.is_nan() {
            0.0
        } else {
            self.config.anomaly_chance.clamp(0.0, 1.0)
        };
        let (range, status) = if self.rng.gen_bool(chance) {
            (self.config.anomaly_range.clone(), SimulatedStatus::Critical)
        } else {
            (self.config.normal_range.clone(), SimulatedStatus::Normal)
        };
        let value = self.rng.gen_range(range);
        ((value * 100.0).round() / 100.0, status)
    }

    /// Next reading as a wire payload stamped with the current time.
    pub fn next_payload(&mut self) -> (ReadingPayload, SimulatedStatus) {
        let (temperature, status) = self.next_temperature();
        let payload = ReadingPayload {
            sensor_id: self.config.sensor_id.clone(),
            temperature,
            timestamp: unix_timestamp(),
        };
        (payload, status)
    }
}
