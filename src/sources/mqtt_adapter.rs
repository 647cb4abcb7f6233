//! MQTT subscriber feeding sensor payloads to the monitoring pipeline

use crate::config;
use crate::error::SourceError;
use crate::sources::stream_source::{PayloadHandler, ReadingSource};
use rumqttc::{AsyncClient, Event, LastWill, MqttOptions, Packet, QoS};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tracing::{debug, info, warn};

/// Delay before polling again after a broker connection error
const RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Connection settings shared by the subscriber and the simulator.
#[derive(Debug, Clone, PartialEq)]
pub struct MqttConfig {
    pub host: String,
    pub port: u16,
    pub client_id: String,
    pub keep_alive_secs: u64,
    pub topic: String,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: config::BROKER_ADDRESS.to_string(),
            port: config::BROKER_PORT,
            client_id: "thermowatch_detector".to_string(),
            keep_alive_secs: config::KEEP_ALIVE_INTERVAL_SECS,
            topic: config::TOPIC_NAME.to_string(),
        }
    }
}

impl MqttConfig {
    pub fn options(&self) -> MqttOptions {
        let mut options = MqttOptions::new(&self.client_id, &self.host, self.port);
        options.set_keep_alive(Duration::from_secs(self.keep_alive_secs));
        options
    }

    /// Options with a retained QoS 1 last will on the configured topic.
    pub fn options_with_last_will(&self, will_payload: Vec<u8>) -> MqttOptions {
        let mut options = self.options();
        options.set_last_will(LastWill::new(
            &self.topic,
            will_payload,
            QoS::AtLeastOnce,
            true,
        ));
        options
    }
}

/// Subscribes to the sensor topic and hands every publish to the pipeline.
///
/// Subscriptions are (re)issued on each `ConnAck`, so they survive broker
/// reconnects.
pub struct MqttReadingSource {
    config: MqttConfig,
    should_stop: Arc<AtomicBool>,
    shutdown: Arc<Notify>,
}

impl MqttReadingSource {
    pub fn new(config: MqttConfig) -> Self {
        Self {
            config,
            should_stop: Arc::new(AtomicBool::new(false)),
            shutdown: Arc::new(Notify::new()),
        }
    }

    async fn event_loop(&self, on_payload: PayloadHandler) {
        let (client, mut eventloop) = AsyncClient::new(self.config.options(), 10);
        let topic = self.config.topic.clone();

        info!(
            host = %self.config.host,
            port = self.config.port,
            topic = %topic,
            "Connecting to broker"
        );

        loop {
            if self.should_stop.load(Ordering::Relaxed) {
                break;
            }

            tokio::select! {
                () = self.shutdown.notified() => break,
                notification = eventloop.poll() => match notification {
                    Ok(Event::Incoming(Packet::ConnAck(_))) => {
                        info!(host = %self.config.host, "Connected to broker");
                        subscribe(&client, &topic);
                    }
                    Ok(Event::Incoming(Packet::Publish(publish))) => {
                        debug!(
                            topic = ?publish.topic,
                            bytes = publish.payload.len(),
                            "Message received"
                        );
                        on_payload(publish.payload.as_ref());
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!("MQTT event loop error: {}, retrying", e);
                        tokio::select! {
                            () = self.shutdown.notified() => break,
                            () = tokio::time::sleep(RECONNECT_DELAY) => {}
                        }
                    }
                },
            }
        }

        info!("Stop signal received, shutting down MQTT subscriber");
        if let Err(e) = client.try_disconnect() {
            debug!("Disconnect request failed: {}", e);
        }
    }
}

/// Requests the sensor subscription. A failed request is logged and retried
/// on the next `ConnAck`.
fn subscribe(client: &AsyncClient, topic: &str) -> bool {
    match client.try_subscribe(topic, QoS::AtLeastOnce) {
        Ok(()) => {
            info!(topic = %topic, "Listening for sensor data");
            true
        }
        Err(e) => {
            let error = SourceError::Subscription(e.to_string());
            warn!(%error, "Subscription request failed, waiting for reconnect");
            false
        }
    }
}

impl ReadingSource for MqttReadingSource {
    fn run(&self, on_payload: PayloadHandler) -> Result<(), SourceError> {
        self.should_stop.store(false, Ordering::Relaxed);
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| SourceError::Runtime(e.to_string()))?;
        runtime.block_on(self.event_loop(on_payload));
        Ok(())
    }

    fn stop(&self) {
        self.should_stop.store(true, Ordering::Relaxed);
        self.shutdown.notify_one();
    }
}
