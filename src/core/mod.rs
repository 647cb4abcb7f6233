//! Core data structures and types for the Thermowatch detector

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// A single temperature observation.
///
/// Arrival order is the only ordering the detector relies on; `timestamp`
/// (seconds since the UNIX epoch) is carried along for presentation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub value: f64,
    pub timestamp: f64,
}

impl Reading {
    pub fn new(value: f64, timestamp: f64) -> Self {
        Self { value, timestamp }
    }
}

/// Seconds since the UNIX epoch as a float, matching the sensor wire format.
pub fn unix_timestamp() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}
