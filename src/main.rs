//! Thermowatch - streaming temperature anomaly detector
//!
//! Usage:
//!   thermowatch --source mqtt --mqtt-host localhost --topic factory/machine1/temperature
//!   thermowatch --source replay --input data/readings.jsonl --rate 0
//!   thermowatch --source replay --input data/readings.jsonl --json

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use thermowatch::config;
use thermowatch::detector::{AnomalyDetector, DetectorConfig, SharedDetector};
use thermowatch::monitor::{JsonLinesSink, MonitorPipeline, OutcomeSink, TracingSink};
use thermowatch::sources::{
    MqttConfig, MqttReadingSource, ReadingSource, ReplayConfig, ReplaySource,
};
use tracing::info;
use tracing_subscriber::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SourceKind {
    Mqtt,
    Replay,
}

#[derive(Parser, Debug)]
#[command(name = "thermowatch")]
#[command(about = "Thermowatch - flag anomalous temperature readings in real time")]
struct Args {
    /// Where readings come from
    #[arg(short, long, value_enum, default_value = "mqtt")]
    source: SourceKind,

    /// JSON-lines payload file (replay source)
    #[arg(short, long, required_if_eq("source", "replay"))]
    input: Option<PathBuf>,

    /// Replay rate in payloads per second (0 = unlimited)
    #[arg(short, long, default_value = "0")]
    rate: u64,

    /// Loop the replay file indefinitely
    #[arg(long)]
    loop_file: bool,

    /// MQTT host
    #[arg(long, default_value = config::BROKER_ADDRESS)]
    mqtt_host: String,

    /// MQTT port
    #[arg(long, default_value_t = config::BROKER_PORT)]
    mqtt_port: u16,

    /// MQTT client id
    #[arg(long, default_value = "AI_Model_Subscriber")]
    client_id: String,

    /// MQTT keep-alive in seconds
    #[arg(long, default_value_t = config::KEEP_ALIVE_INTERVAL_SECS)]
    keep_alive: u64,

    /// Sensor topic
    #[arg(short, long, default_value = config::TOPIC_NAME)]
    topic: String,

    /// History window size (W)
    #[arg(long, default_value_t = config::WINDOW_SIZE)]
    window_size: usize,

    /// Readings needed before detection starts (M)
    #[arg(long, default_value_t = config::MIN_DATA_REQUIRED)]
    calibration: usize,

    /// Absolute temperature that always raises an alarm
    #[arg(long, default_value_t = config::ANOMALY_THRESHOLD)]
    hard_limit: f64,

    /// Z-score beyond which a reading is a statistical anomaly
    #[arg(long, default_value_t = config::Z_SCORE_THRESHOLD)]
    z_threshold: f64,

    /// Emit events as JSON lines on stdout instead of log lines
    #[arg(long)]
    json: bool,

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
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let detector_config = DetectorConfig {
        window_capacity: args.window_size,
        calibration_minimum: args.calibration,
        hard_limit_threshold: args.hard_limit,
        z_threshold: args.z_threshold,
    };
    let detector = AnomalyDetector::new(detector_config.clone())?;

    info!(
        window = detector_config.window_capacity,
        calibration = detector_config.calibration_minimum,
        hard_limit = detector_config.hard_limit_threshold,
        z_threshold = detector_config.z_threshold,
        "Detector configured"
    );

    let sink: Box<dyn OutcomeSink> = if args.json {
        Box::new(JsonLinesSink::new(std::io::stdout()))
    } else {
        Box::new(TracingSink)
    };
    let pipeline = Arc::new(MonitorPipeline::new(SharedDetector::new(detector), sink));

    let source: Arc<dyn ReadingSource> = match args.source {
        SourceKind::Mqtt => Arc::new(MqttReadingSource::new(MqttConfig {
            host: args.mqtt_host,
            port: args.mqtt_port,
            client_id: args.client_id,
            keep_alive_secs: args.keep_alive,
            topic: args.topic,
        })),
        SourceKind::Replay => Arc::new(ReplaySource::new(ReplayConfig {
            input_file: args.input.ok_or("--input is required for the replay source")?,
            rate_of_replay: args.rate,
            loop_file: args.loop_file,
        })),
    };

    let stopper = Arc::clone(&source);
    ctrlc::set_handler(move || {
        info!("Received Ctrl+C, stopping...");
        stopper.stop();
    })?;

    info!("Waiting for sensor data...");
    source.run(pipeline.payload_handler())?;

    let metrics = pipeline.metrics();
    info!(
        processed = metrics.readings_processed,
        anomalies = metrics.anomalies,
        hard_limit = metrics.hard_limit_hits,
        statistical = metrics.statistical_hits,
        malformed = metrics.malformed,
        offline_notices = metrics.offline_notices,
        "Detector stopped ({:.1}% anomalous)",
        metrics.anomaly_rate()
    );

    Ok(())
}
