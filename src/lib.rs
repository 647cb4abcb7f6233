//! # Thermowatch
//!
//! Thermowatch watches a single temperature sensor and flags anomalous
//! readings as they arrive.
//!
//! Detection is hybrid: an absolute hard limit that always raises an alarm,
//! and a z-score test against a rolling window of recent normal readings. The
//! detector first calibrates on an initial batch of readings, then switches to
//! active detection and learns only from readings it judged normal, so the
//! baseline never drifts towards the faults it is meant to catch.
//!
//! ## Features
//!
//! - Calibration phase followed by hybrid hard-limit / statistical detection
//! - Selective learning: anomalies never enter the baseline
//! - MQTT subscriber with last-will (sensor offline) handling
//! - Simulated sensor publisher and JSON-lines replay for offline runs
//!
//! ## Example
//!
//! ```rust
//! use thermowatch::core::Reading;
//! use thermowatch::detector::{AnomalyDetector, AnomalyReason, DetectorConfig};
//!
//! fn example() -> thermowatch::Result<()> {
//!     let mut detector = AnomalyDetector::new(DetectorConfig::default())?;
//!     for i in 0..20 {
//!         detector.process(Reading::new(24.0 + f64::from(i % 3), f64::from(i)))?;
//!     }
//!     let outcome = detector.process(Reading::new(95.0, 20.0))?;
//!     assert_eq!(outcome.reason, AnomalyReason::HardLimit);
//!     Ok(())
//! }
//! # example().unwrap();
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_docs_in_private_items)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::float_cmp)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::unnecessary_map_or)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)]

/// Default deployment settings
pub mod config;

/// Core data structures and types
pub mod core;

/// Streaming anomaly detector
pub mod detector;

/// Error types and result definitions
pub mod error;

/// Pipeline from sources to sinks
pub mod monitor;

/// Module for parsing sensor payloads
pub mod parsing;

/// Simulated sensor
pub mod publisher;

/// Reading sources (MQTT, replay)
pub mod sources;

// Re-export commonly used types
pub use error::{ConfigurationError, Error, MalformedReadingError, Result, SourceError};
