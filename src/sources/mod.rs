//! Reading sources feeding the monitoring pipeline

pub mod mqtt_adapter;
pub mod replay;
pub mod stream_source;

pub use mqtt_adapter::{MqttConfig, MqttReadingSource};
pub use replay::{ReplayConfig, ReplaySource};
pub use stream_source::{PayloadHandler, ReadingSource};
