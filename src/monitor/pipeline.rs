use super::events::DetectorEvent;
use super::sink::OutcomeSink;
use crate::core::unix_timestamp;
use crate::detector::{AnomalyReason, ClassificationOutcome, SharedDetector, WindowStats};
use crate::parsing::payload::{parse_payload, SensorMessage};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Counters collected by the pipeline.
#[derive(Debug, Default)]
struct Counters {
    readings_processed: AtomicU64,
    anomalies: AtomicU64,
    hard_limit_hits: AtomicU64,
    statistical_hits: AtomicU64,
    malformed: AtomicU64,
    offline_notices: AtomicU64,
}

/// Snapshot of pipeline metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MonitorMetrics {
    pub readings_processed: u64,
    pub anomalies: u64,
    pub hard_limit_hits: u64,
    pub statistical_hits: u64,
    pub malformed: u64,
    pub offline_notices: u64,
}

impl MonitorMetrics {
    /// Share of processed readings flagged as anomalous, in percent.
    pub fn anomaly_rate(&self) -> f64 {
        if self.readings_processed > 0 {
            (self.anomalies as f64 / self.readings_processed as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// Glue between a transport and the detector: decodes payloads, runs the
/// detector and reports every result to the sink.
pub struct MonitorPipeline<S: OutcomeSink> {
    detector: SharedDetector,
    sink: S,
    counters: Counters,
}

impl<S: OutcomeSink> MonitorPipeline<S> {
    pub fn new(detector: SharedDetector, sink: S) -> Self {
        Self {
            detector,
            sink,
            counters: Counters::default(),
        }
    }

    /// Handles a raw payload received now.
    pub fn handle_payload(&self, payload: &[u8]) {
        self.handle_payload_at(payload, unix_timestamp());
    }

    /// Handles a raw payload, stamping timestamp-less readings with `received_at`.
    pub fn handle_payload_at(&self, payload: &[u8], received_at: f64) {
        match parse_payload(payload, received_at) {
            Ok(message) => self.handle_message(message),
            Err(error) => {
                self.counters.malformed.fetch_add(1, Ordering::Relaxed);
                self.sink.emit(&DetectorEvent::Rejected { error });
            }
        }
    }

    /// Runs one decoded message through the detector.
    ///
    /// Events are emitted while the detector is still locked, so concurrent
    /// callers see them in the order the readings were classified.
    pub fn handle_message(&self, message: SensorMessage) {
        match message {
            SensorMessage::Reading { sensor_id, reading } => {
                debug!(
                    sensor_id = sensor_id.as_deref(),
                    value = reading.value,
                    "Reading received"
                );
                self.detector.with_locked(|detector| match detector.process(reading) {
                    Ok(outcome) => {
                        let baseline = if outcome.completes_calibration() {
                            detector.window().stats()
                        } else {
                            None
                        };
                        self.report(outcome, baseline);
                    }
                    Err(error) => {
                        self.counters.malformed.fetch_add(1, Ordering::Relaxed);
                        self.sink.emit(&DetectorEvent::Rejected { error });
                    }
                });
            }
            SensorMessage::Offline { reason } => {
                self.detector.with_locked(|detector| {
                    self.counters.offline_notices.fetch_add(1, Ordering::Relaxed);
                    let state = detector.notify_source_offline();
                    self.sink.emit(&DetectorEvent::SourceUnavailable { state, reason });
                });
            }
        }
    }

    fn report(&self, outcome: ClassificationOutcome, baseline: Option<WindowStats>) {
        debug!(%outcome, "Classified");
        self.counters.readings_processed.fetch_add(1, Ordering::Relaxed);
        if outcome.is_anomaly {
            self.counters.anomalies.fetch_add(1, Ordering::Relaxed);
        }
        match outcome.reason {
            AnomalyReason::HardLimit => {
                self.counters.hard_limit_hits.fetch_add(1, Ordering::Relaxed);
            }
            AnomalyReason::Statistical => {
                self.counters.statistical_hits.fetch_add(1, Ordering::Relaxed);
            }
            AnomalyReason::None => {}
        }

        self.sink.emit(&DetectorEvent::Classified(outcome));
        if let Some(baseline) = baseline {
            self.sink.emit(&DetectorEvent::CalibrationComplete { baseline });
        }
    }

    pub fn metrics(&self) -> MonitorMetrics {
        MonitorMetrics {
            readings_processed: self.counters.readings_processed.load(Ordering::Relaxed),
            anomalies: self.counters.anomalies.load(Ordering::Relaxed),
            hard_limit_hits: self.counters.hard_limit_hits.load(Ordering::Relaxed),
            statistical_hits: self.counters.statistical_hits.load(Ordering::Relaxed),
            malformed: self.counters.malformed.load(Ordering::Relaxed),
            offline_notices: self.counters.offline_notices.load(Ordering::Relaxed),
        }
    }

    pub fn detector(&self) -> &SharedDetector {
        &self.detector
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Callback suitable for [`ReadingSource::run`](crate::sources::ReadingSource::run).
    pub fn payload_handler(self: &Arc<Self>) -> Arc<dyn Fn(&[u8]) + Send + Sync>
    where
        S: 'static,
    {
        let pipeline = Arc::clone(self);
        Arc::new(move |payload: &[u8]| pipeline.handle_payload(payload))
    }
}
