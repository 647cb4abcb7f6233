use crate::detector::{ClassificationOutcome, SourceUnavailableEvent, WindowStats};
use crate::error::MalformedReadingError;
use serde::{Serialize, Serializer};

/// Everything the pipeline reports to an [`OutcomeSink`](super::OutcomeSink).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DetectorEvent {
    /// A reading was processed
    Classified(ClassificationOutcome),
    /// Emitted once, right after the reading that finished calibration
    CalibrationComplete { baseline: WindowStats },
    /// The sensor dropped off; detector state is retained
    SourceUnavailable {
        #[serde(flatten)]
        state: SourceUnavailableEvent,
        reason: Option<String>,
    },
    /// Input that could not be classified
    Rejected {
        #[serde(serialize_with = "serialize_display")]
        error: MalformedReadingError,
    },
}

fn serialize_display<S: Serializer>(
    error: &MalformedReadingError,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}
