//! Sensor Simulator - publishes synthetic temperature readings to an MQTT broker.
//!
//! Usage:
//!   sensor_simulator --mqtt-host localhost --interval 1.0
//!   sensor_simulator --anomaly-chance 0.25 --seed 42 --count 100

use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use thermowatch::config;
use thermowatch::publisher::{MqttPublisher, SensorSimulator, SimulatorConfig};
use thermowatch::sources::MqttConfig;
use tracing::info;
use tracing_subscriber::prelude::*;

fn parse_probability(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|e| format!("{}", e))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{} is not a probability between 0 and 1", value))
    }
}

fn parse_interval(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|e| format!("{}", e))?;
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(format!("{} is not a positive number of seconds", value))
    }
}

#[derive(Parser, Debug)]
#[command(name = "sensor_simulator")]
#[command(about = "Simulated temperature sensor publishing over MQTT")]
struct Args {
    /// MQTT host
    #[arg(long, default_value = config::BROKER_ADDRESS)]
    mqtt_host: String,

    /// MQTT port
    #[arg(long, default_value_t = config::BROKER_PORT)]
    mqtt_port: u16,

    /// MQTT client id
    #[arg(long, default_value = "Sensor-01")]
    client_id: String,

    /// MQTT keep-alive in seconds
    #[arg(long, default_value_t = config::KEEP_ALIVE_INTERVAL_SECS)]
    keep_alive: u64,

    /// Sensor topic
    #[arg(short, long, default_value = config::TOPIC_NAME)]
    topic: String,

    /// Sensor id written into every payload
    #[arg(long, default_value = config::SENSOR_ID)]
    sensor_id: String,

    /// Seconds between readings
    #[arg(
        short,
        long,
        default_value_t = config::TRANSMISSION_RATE_SECS,
        value_parser = parse_interval
    )]
    interval: f64,

    /// Probability of injecting a critical reading
    #[arg(
        short,
        long,
        default_value_t = config::ANOMALY_CHANCE,
        value_parser = parse_probability
    )]
    anomaly_chance: f64,

    /// Seed for reproducible sequences
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many readings
    #[arg(short, long)]
    count: Option<u64>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let simulator_config = SimulatorConfig {
        sensor_id: args.sensor_id,
        anomaly_chance: args.anomaly_chance,
        ..Default::default()
    };
    let mut simulator = match args.seed {
        Some(seed) => SensorSimulator::with_seed(simulator_config, seed),
        None => SensorSimulator::new(simulator_config),
    };

    let mqtt_config = MqttConfig {
        host: args.mqtt_host,
        port: args.mqtt_port,
        client_id: args.client_id,
        keep_alive_secs: args.keep_alive,
        topic: args.topic,
    };
    info!(
        host = %mqtt_config.host,
        port = mqtt_config.port,
        topic = %mqtt_config.topic,
        "Starting sensor"
    );

    let interval = Duration::from_secs_f64(args.interval);
    let publisher = Arc::new(MqttPublisher::new(mqtt_config, interval));

    let stopper = Arc::clone(&publisher);
    ctrlc::set_handler(move || {
        info!("Sensor stopped manually");
        stopper.stop();
    })?;

    publisher.run(&mut simulator, args.count)?;
    info!(
        sent = publisher.published(),
        errors = publisher.publish_errors(),
        "Sensor shut down"
    );

    Ok(())
}
