//! Streaming anomaly detector
//!
//! The detector runs in two phases. While calibrating it trusts every value
//! and simply fills its history window. Once `calibration_minimum` values have
//! been admitted it switches (once, for good) to active detection, where each
//! reading is checked against an absolute hard limit and a z-score against the
//! window. Only readings classified as normal are learned from.

use super::outcome::{AnomalyReason, ClassificationOutcome, Phase, SourceUnavailableEvent};
use super::window::HistoryWindow;
use crate::config;
use crate::core::Reading;
use crate::error::{ConfigurationError, MalformedReadingError};
use serde::Serialize;
use tracing::{debug, info};

/// Configuration thresholds for the detector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectorConfig {
    /// Maximum number of values kept in the history window (W)
    pub window_capacity: usize,
    /// Values required before detection starts (M, at most W)
    pub calibration_minimum: usize,
    /// Absolute ceiling: value >= threshold is always an anomaly
    pub hard_limit_threshold: f64,
    /// Z-score threshold for outlier detection: |z| > threshold
    pub z_threshold: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            window_capacity: config::WINDOW_SIZE,
            calibration_minimum: config::MIN_DATA_REQUIRED,
            hard_limit_threshold: config::ANOMALY_THRESHOLD,
            z_threshold: config::Z_SCORE_THRESHOLD,
        }
    }
}

impl DetectorConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.window_capacity == 0 {
            return Err(ConfigurationError::ZeroWindowCapacity);
        }
        if self.calibration_minimum == 0 {
            return Err(ConfigurationError::ZeroCalibrationMinimum);
        }
        if self.calibration_minimum > self.window_capacity {
            return Err(ConfigurationError::CalibrationExceedsCapacity {
                minimum: self.calibration_minimum,
                capacity: self.window_capacity,
            });
        }
        check_threshold("hard_limit_threshold", self.hard_limit_threshold)?;
        check_threshold("z_threshold", self.z_threshold)?;
        Ok(())
    }
}

fn check_threshold(name: &'static str, value: f64) -> Result<(), ConfigurationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigurationError::InvalidThreshold { name, value })
    }
}

/// Stateful single-sensor anomaly detector.
#[derive(Debug, Clone)]
pub struct AnomalyDetector {
    config: DetectorConfig,
    window: HistoryWindow,
    phase: Phase,
}

impl AnomalyDetector {
    /// Creates a calibrating detector, rejecting invalid configurations.
    pub fn new(config: DetectorConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;
        let window = HistoryWindow::new(config.window_capacity);
        Ok(Self {
            config,
            window,
            phase: Phase::Calibrating,
        })
    }

    /// Classifies one reading and updates the learning window.
    ///
    /// A non-finite value is rejected without touching any state.
    pub fn process(
        &mut self,
        reading: Reading,
    ) -> Result<ClassificationOutcome, MalformedReadingError> {
        if !reading.value.is_finite() {
            return Err(MalformedReadingError::NonFiniteValue(reading.value));
        }

        let outcome = match self.phase {
            Phase::Calibrating => self.calibrate(reading),
            Phase::Active => self.classify(reading),
        };
        Ok(outcome)
    }

    /// Reports that the sensor went offline. Window and phase are kept as-is
    /// so detection resumes where it left off when the sensor returns.
    pub fn notify_source_offline(&self) -> SourceUnavailableEvent {
        SourceUnavailableEvent {
            phase: self.phase,
            retained_values: self.window.len(),
        }
    }

    fn calibrate(&mut self, reading: Reading) -> ClassificationOutcome {
        self.window.admit(reading.value);

        let remaining = self.config.calibration_minimum.saturating_sub(self.window.len());
        if remaining == 0 {
            self.phase = Phase::Active;
            info!(
                window_len = self.window.len(),
                mean = self.window.mean(),
                std_dev = self.window.std_dev(),
                "Calibration complete, detection active"
            );
        }

        ClassificationOutcome::calibrating(reading.value, reading.timestamp, remaining)
    }

    fn classify(&mut self, reading: Reading) -> ClassificationOutcome {
        let value = reading.value;
        let is_hard_limit = value >= self.config.hard_limit_threshold;

        // Active phase always has at least `calibration_minimum` values.
        let score = self.window.stats().map_or(0.0, |stats| stats.z_score(value));
        let is_statistical = score.abs() > self.config.z_threshold;

        let is_anomaly = is_hard_limit || is_statistical;
        let reason = if is_hard_limit {
            AnomalyReason::HardLimit
        } else if is_statistical {
            AnomalyReason::Statistical
        } else {
            AnomalyReason::None
        };

        if is_anomaly {
            debug!(value, score, %reason, "Anomalous reading excluded from learning");
        } else {
            self.window.admit(value);
        }

        ClassificationOutcome {
            value,
            timestamp: reading.timestamp,
            is_anomaly,
            reason,
            score: Some(score),
            remaining_calibration: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn window(&self) -> &HistoryWindow {
        &self.window
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }
}
