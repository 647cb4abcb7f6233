//! Monitoring pipeline
//!
//! Connects reading sources to the detector and fans results out to sinks.

pub mod events;
pub mod pipeline;
pub mod sink;

pub use events::DetectorEvent;
pub use pipeline::{MonitorMetrics, MonitorPipeline};
pub use sink::{ChannelSink, JsonLinesSink, OutcomeSink, TracingSink};
