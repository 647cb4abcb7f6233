//! Streaming anomaly detection core
//!
//! Owns the history window, the calibration/active phase machine and the
//! hybrid hard-limit + z-score classification policy. Nothing in here does
//! I/O; transports and sinks live in [`crate::sources`] and [`crate::monitor`].

pub mod anomaly_detector;
pub mod outcome;
pub mod shared;
pub mod window;

pub use anomaly_detector::{AnomalyDetector, DetectorConfig};
pub use outcome::{AnomalyReason, ClassificationOutcome, Phase, SourceUnavailableEvent};
pub use shared::SharedDetector;
pub use window::{HistoryWindow, WindowStats};
