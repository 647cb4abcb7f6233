//! Decoding of sensor payloads

pub mod payload;

pub use payload::{parse_payload, OfflinePayload, ReadingPayload, SensorMessage};
