use super::events::DetectorEvent;
use crate::detector::AnomalyReason;
use std::io::Write;
use std::sync::{mpsc::Sender, Mutex, PoisonError};
use tracing::{error, info, warn};

/// Consumer of detector events (console, alerting, tests, ...).
pub trait OutcomeSink: Send + Sync {
    fn emit(&self, event: &DetectorEvent);
}

/// Presents events as structured log lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl OutcomeSink for TracingSink {
    fn emit(&self, event: &DetectorEvent) {
        match event {
            DetectorEvent::Classified(outcome) => match (
                outcome.remaining_calibration,
                outcome.reason,
            ) {
                (Some(remaining), _) => {
                    info!(value = outcome.value, remaining, "Calibrating baseline");
                }
                (None, AnomalyReason::HardLimit) => {
                    error!(
                        value = outcome.value,
                        score = outcome.score,
                        "CRITICAL ANOMALY DETECTED: hard limit reached"
                    );
                }
                (None, AnomalyReason::Statistical) => {
                    warn!(
                        value = outcome.value,
                        score = outcome.score,
                        "Statistical anomaly detected"
                    );
                }
                (None, AnomalyReason::None) => {
                    info!(value = outcome.value, score = outcome.score, "Reading normal");
                }
            },
            DetectorEvent::CalibrationComplete { baseline } => {
                info!(
                    mean = baseline.mean,
                    std_dev = baseline.std_dev,
                    samples = baseline.count,
                    "Baseline established, anomaly detection active"
                );
            }
            DetectorEvent::SourceUnavailable { state, reason } => {
                warn!(
                    reason = reason.as_deref().unwrap_or("unknown"),
                    retained_values = state.retained_values,
                    phase = ?state.phase,
                    "SENSOR LOST CONNECTION (last will received)"
                );
            }
            DetectorEvent::Rejected { error } => {
                error!(%error, "Could not process message");
            }
        }
    }
}

/// Writes one JSON document per event.
pub struct JsonLinesSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send> OutcomeSink for JsonLinesSink<W> {
    fn emit(&self, event: &DetectorEvent) {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let result = serde_json::to_writer(&mut *writer, event)
            .map_err(std::io::Error::from)
            .and_then(|()| writer.write_all(b"\n"))
            .and_then(|()| writer.flush());
        if let Err(e) = result {
            error!("Failed to write event: {}", e);
        }
    }
}

/// Forwards events over a channel.
pub struct ChannelSink {
    sender: Mutex<Sender<DetectorEvent>>,
}

impl ChannelSink {
    pub fn new(sender: Sender<DetectorEvent>) -> Self {
        Self {
            sender: Mutex::new(sender),
        }
    }
}

impl OutcomeSink for ChannelSink {
    fn emit(&self, event: &DetectorEvent) {
        let sender = self.sender.lock().unwrap_or_else(PoisonError::into_inner);
        if sender.send(event.clone()).is_err() {
            warn!("Event receiver dropped, discarding event");
        }
    }
}

impl<S: OutcomeSink + ?Sized> OutcomeSink for Box<S> {
    fn emit(&self, event: &DetectorEvent) {
        (**self).emit(event);
    }
}
