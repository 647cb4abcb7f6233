use serde::Serialize;
use std::fmt;

/// Lifecycle phase of a detector instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Accumulating a baseline; every value is trusted
    Calibrating,
    /// Classifying readings against the learned baseline
    Active,
}

/// Why a reading was flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyReason {
    None,
    /// Value reached the absolute safety ceiling
    HardLimit,
    /// Value is too many standard deviations away from the baseline
    Statistical,
}

impl fmt::Display for AnomalyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnomalyReason::None => write!(f, "none"),
            AnomalyReason::HardLimit => write!(f, "hard limit"),
            AnomalyReason::Statistical => write!(f, "statistical"),
        }
    }
}

/// Result of processing one reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationOutcome {
    pub value: f64,
    pub timestamp: f64,
    pub is_anomaly: bool,
    pub reason: AnomalyReason,
    /// Z-score against the window; `None` while calibrating
    pub score: Option<f64>,
    /// Readings still needed before detection starts; `None` once active
    pub remaining_calibration: Option<usize>,
}

impl ClassificationOutcome {
    pub(crate) fn calibrating(value: f64, timestamp: f64, remaining: usize) -> Self {
        Self {
            value,
            timestamp,
            is_anomaly: false,
            reason: AnomalyReason::None,
            score: None,
            remaining_calibration: Some(remaining),
        }
    }

    /// True only for the reading that finished calibration.
    pub fn completes_calibration(&self) -> bool {
        self.remaining_calibration == Some(0)
    }
}

impl fmt::Display for ClassificationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.remaining_calibration, self.score) {
            (Some(remaining), _) => {
                write!(f, "{:.2} (calibrating, {} remaining)", self.value, remaining)
            }
            (None, Some(score)) if self.is_anomaly => {
                write!(f, "{:.2} ANOMALY [{}] (z-score: {:.2})", self.value, self.reason, score)
            }
            (None, Some(score)) => write!(f, "{:.2} normal (z-score: {:.2})", self.value, score),
            (None, None) => write!(f, "{:.2}", self.value),
        }
    }
}

/// Raised when the upstream sensor goes away. Carries the state the detector
/// is holding on to until the sensor returns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SourceUnavailableEvent {
    pub phase: Phase,
    pub retained_values: usize,
}
