//! Simulated sensor publishing readings over MQTT

pub mod mqtt_publisher;
pub mod simulator;

pub use mqtt_publisher::MqttPublisher;
pub use simulator::{SensorSimulator, SimulatedStatus, SimulatorConfig};
