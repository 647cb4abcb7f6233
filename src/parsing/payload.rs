//! Sensor wire format
//!
//! Readings travel as JSON objects:
//!
//! ```json
//! {"sensor_id": "sensor-01", "temperature": 24.61, "timestamp": 1718000000.5}
//! ```
//!
//! The broker publishes the sensor's last will on the same topic when the
//! sensor drops off unexpectedly:
//!
//! ```json
//! {"status": "OFFLINE", "error": "Sensor Lost"}
//! ```

use crate::core::Reading;
use crate::error::MalformedReadingError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status value carried by the last-will payload
pub const OFFLINE_STATUS: &str = "OFFLINE";

/// Outgoing reading payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingPayload {
    pub sensor_id: String,
    pub temperature: f64,
    pub timestamp: f64,
}

/// Outgoing last-will payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfflinePayload {
    pub status: String,
    pub error: String,
}

impl OfflinePayload {
    pub fn sensor_lost() -> Self {
        Self {
            status: OFFLINE_STATUS.to_string(),
            error: "Sensor Lost".to_string(),
        }
    }
}

/// A decoded message from the sensor topic.
#[derive(Debug, Clone, PartialEq)]
pub enum SensorMessage {
    Reading {
        sensor_id: Option<String>,
        reading: Reading,
    },
    /// The sensor is gone (last will, or an explicit notice)
    Offline { reason: Option<String> },
}

#[derive(Deserialize)]
struct RawPayload {
    #[serde(default)]
    sensor_id: Option<String>,
    #[serde(default)]
    temperature: Option<Value>,
    #[serde(default)]
    timestamp: Option<f64>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Decode one payload from the sensor topic.
///
/// Readings without a `timestamp` are stamped with `received_at`. Offline
/// notices are recognised before any attempt to read a temperature.
pub fn parse_payload(
    payload: &[u8],
    received_at: f64,
) -> Result<SensorMessage, MalformedReadingError> {
    let raw: RawPayload = serde_json::from_slice(payload)
        .map_err(|e| MalformedReadingError::InvalidPayload(e.to_string()))?;

    if raw.status.as_deref() == Some(OFFLINE_STATUS) {
        return Ok(SensorMessage::Offline { reason: raw.error });
    }

    let value = match raw.temperature {
        None | Some(Value::Null) => return Err(MalformedReadingError::MissingValue),
        Some(Value::Number(n)) => {
            n.as_f64().ok_or_else(|| MalformedReadingError::NonNumericValue(n.to_string()))?
        }
        Some(other) => return Err(MalformedReadingError::NonNumericValue(other.to_string())),
    };

    let timestamp = raw.timestamp.unwrap_or(received_at);

    Ok(SensorMessage::Reading {
        sensor_id: raw.sensor_id,
        reading: Reading::new(value, timestamp),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reading() {
        let payload =
            br#"{"sensor_id": "sensor-01", "temperature": 24.61, "timestamp": 1718000000.5}"#;
        let msg = parse_payload(payload, 0.0).unwrap();
        assert_eq!(
            msg,
            SensorMessage::Reading {
                sensor_id: Some("sensor-01".to_string()),
                reading: Reading::new(24.61, 1718000000.5),
            }
        );
    }

    #[test]
    fn test_integer_temperature_accepted() {
        let msg = parse_payload(br#"{"temperature": 25}"#, 7.0).unwrap();
        assert_eq!(
            msg,
            SensorMessage::Reading {
                sensor_id: None,
                reading: Reading::new(25.0, 7.0),
            }
        );
    }

    #[test]
    fn test_missing_timestamp_uses_receive_time() {
        let msg = parse_payload(br#"{"temperature": 21.5}"#, 42.0).unwrap();
        match msg {
            SensorMessage::Reading { reading, .. } => assert_eq!(reading.timestamp, 42.0),
            other => panic!("expected reading, got {:?}", other),
        }
    }

    #[test]
    fn test_offline_payload() {
        let payload = serde_json::to_vec(&OfflinePayload::sensor_lost()).unwrap();
        let msg = parse_payload(&payload, 0.0).unwrap();
        assert_eq!(
            msg,
            SensorMessage::Offline {
                reason: Some("Sensor Lost".to_string())
            }
        );
    }

    #[test]
    fn test_offline_payload_wins_over_temperature() {
        let msg = parse_payload(br#"{"status": "OFFLINE", "temperature": 99.0}"#, 0.0).unwrap();
        assert_eq!(msg, SensorMessage::Offline { reason: None });
    }

    #[test]
    fn test_other_status_is_not_offline() {
        let msg = parse_payload(br#"{"status": "ONLINE", "temperature": 22.0}"#, 1.0).unwrap();
        assert!(matches!(msg, SensorMessage::Reading { .. }));
    }

    #[test]
    fn test_missing_temperature() {
        assert_eq!(
            parse_payload(br#"{"sensor_id": "sensor-01"}"#, 0.0).unwrap_err(),
            MalformedReadingError::MissingValue
        );
        assert_eq!(
            parse_payload(br#"{"temperature": null}"#, 0.0).unwrap_err(),
            MalformedReadingError::MissingValue
        );
    }

    #[test]
    fn test_non_numeric_temperature() {
        assert_eq!(
            parse_payload(br#"{"temperature": "hot"}"#, 0.0).unwrap_err(),
            MalformedReadingError::NonNumericValue("\"hot\"".to_string())
        );
    }

    #[test]
    fn test_garbage_payload() {
        assert!(matches!(
            parse_payload(b"not json", 0.0).unwrap_err(),
            MalformedReadingError::InvalidPayload(_)
        ));
        assert!(matches!(
            parse_payload(b"[1, 2, 3]", 0.0).unwrap_err(),
            MalformedReadingError::InvalidPayload(_)
        ));
    }
}
