use super::anomaly_detector::AnomalyDetector;
use super::outcome::{ClassificationOutcome, Phase, SourceUnavailableEvent};
use crate::core::Reading;
use crate::error::MalformedReadingError;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Cloneable handle that serialises access to one detector.
///
/// Transports deliver on their own tasks; every call takes the lock so
/// readings are classified one at a time, in the order they arrive here.
#[derive(Debug, Clone)]
pub struct SharedDetector {
    inner: Arc<Mutex<AnomalyDetector>>,
}

impl SharedDetector {
    pub fn new(detector: AnomalyDetector) -> Self {
        Self {
            inner: Arc::new(Mutex::new(detector)),
        }
    }

    pub fn process(
        &self,
        reading: Reading,
    ) -> Result<ClassificationOutcome, MalformedReadingError> {
        self.lock().process(reading)
    }

    pub fn notify_source_offline(&self) -> SourceUnavailableEvent {
        self.lock().notify_source_offline()
    }

    pub fn phase(&self) -> Phase {
        self.lock().phase()
    }

    /// Runs `f` with the detector locked, for read-only inspection.
    pub fn inspect<R>(&self, f: impl FnOnce(&AnomalyDetector) -> R) -> R {
        f(&*self.lock())
    }

    /// Runs `f` with exclusive access, for multi-step updates that must not
    /// interleave with other readings.
    pub fn with_locked<R>(&self, f: impl FnOnce(&mut AnomalyDetector) -> R) -> R {
        f(&mut *self.lock())
    }

    // Window and phase are only mutated after validation, so a poisoned
    // lock still guards a consistent detector.
    fn lock(&self) -> MutexGuard<'_, AnomalyDetector> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl From<AnomalyDetector> for SharedDetector {
    fn from(detector: AnomalyDetector) -> Self {
        Self::new(detector)
    }
}
