use super::simulator::SensorSimulator;
use crate::error::SourceError;
use crate::parsing::payload::OfflinePayload;
use crate::sources::mqtt_adapter::MqttConfig;
use rumqttc::{AsyncClient, Event, Outgoing, Packet, QoS};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Notify;
use tracing::{debug, error, info, warn};

const RECONNECT_DELAY: Duration = Duration::from_secs(1);
/// How long to wait for the broker to acknowledge a clean disconnect
const DISCONNECT_GRACE: Duration = Duration::from_secs(2);

/// Publishes simulated readings at a fixed interval.
///
/// The connection registers a retained last will carrying the offline
/// payload, so subscribers learn when the sensor vanishes without a clean
/// disconnect. `stop` disconnects cleanly, which does not fire the will.
pub struct MqttPublisher {
    config: MqttConfig,
    interval: Duration,
    should_stop: AtomicBool,
    shutdown: Notify,
    published: AtomicU64,
    publish_errors: AtomicU64,
}

impl MqttPublisher {
    pub fn new(config: MqttConfig, interval: Duration) -> Self {
        Self {
            config,
            interval,
            should_stop: AtomicBool::new(false),
            shutdown: Notify::new(),
            published: AtomicU64::new(0),
            publish_errors: AtomicU64::new(0),
        }
    }

    /// Publishes until stopped, or until `max_readings` have been sent.
    /// Returns the number of readings published.
    pub fn run(
        &self,
        simulator: &mut SensorSimulator,
        max_readings: Option<u64>,
    ) -> Result<u64, SourceError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| SourceError::Runtime(e.to_string()))?;
        runtime.block_on(self.publish_loop(simulator, max_readings))
    }

    pub fn stop(&self) {
        self.should_stop.store(true, Ordering::Relaxed);
        self.shutdown.notify_one();
    }

    pub fn published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }

    pub fn publish_errors(&self) -> u64 {
        self.publish_errors.load(Ordering::Relaxed)
    }

    async fn publish_loop(
        &self,
        simulator: &mut SensorSimulator,
        max_readings: Option<u64>,
    ) -> Result<u64, SourceError> {
        let will = serde_json::to_vec(&OfflinePayload::sensor_lost())
            .map_err(|e| SourceError::Publish(e.to_string()))?;
        let (client, mut eventloop) =
            AsyncClient::new(self.config.options_with_last_will(will), 10);

        let host = self.config.host.clone();
        let mut driver = tokio::spawn(async move {
            loop {
                match eventloop.poll().await {
                    Ok(Event::Incoming(Packet::ConnAck(_))) => {
                        info!(host = %host, "Connected to broker");
                    }
                    Ok(Event::Outgoing(Outgoing::Disconnect)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        warn!("MQTT connection error: {}, retrying", e);
                        tokio::time::sleep(RECONNECT_DELAY).await;
                    }
                }
            }
        });

        let mut ticker = tokio::time::interval(self.interval);
        let mut sent = 0u64;

        while !self.should_stop.load(Ordering::Relaxed)
            && max_readings.map_or(true, |max| sent < max)
        {
            tokio::select! {
                () = self.shutdown.notified() => break,
                _ = ticker.tick() => {}
            }

            let (payload, status) = simulator.next_payload();
            let bytes =
                serde_json::to_vec(&payload).map_err(|e| SourceError::Publish(e.to_string()))?;

            // The request queue stays full while the broker is unreachable.
            let publish = client.publish(&self.config.topic, QoS::AtLeastOnce, false, bytes);
            let result = tokio::select! {
                () = self.shutdown.notified() => break,
                result = publish => result,
            };

            match result {
                Ok(()) => {
                    sent += 1;
                    self.published.fetch_add(1, Ordering::Relaxed);
                    info!(
                        sensor_id = %payload.sensor_id,
                        %status,
                        "Sending: {:.2}°C",
                        payload.temperature
                    );
                }
                Err(e) => {
                    self.publish_errors.fetch_add(1, Ordering::Relaxed);
                    error!("Failed to publish reading: {}", e);
                }
            }
        }

        info!(sent, "Sensor stopped, disconnecting");
        if let Err(e) = client.try_disconnect() {
            debug!("Disconnect request failed: {}", e);
        }
        if tokio::time::timeout(DISCONNECT_GRACE, &mut driver).await.is_err() {
            warn!("Broker did not acknowledge disconnect in time");
            driver.abort();
        }

        Ok(sent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publisher::SimulatorConfig;
    use std::sync::Arc;
    use std::thread;
    use std::time::Instant;

    fn unreachable_broker() -> MqttConfig {
        MqttConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            client_id: "thermowatch-test-publisher".to_string(),
            ..MqttConfig::default()
        }
    }

    #[test]
    fn test_stop_returns_while_broker_is_down() {
        let publisher = Arc::new(MqttPublisher::new(
            unreachable_broker(),
            Duration::from_millis(5),
        ));
        let mut simulator = SensorSimulator::with_seed(SimulatorConfig::default(), 7);

        let stopper = Arc::clone(&publisher);
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(500));
            stopper.stop();
        });

        let started = Instant::now();
        let sent = publisher.run(&mut simulator, None).unwrap();
        handle.join().unwrap();

        assert!(started.elapsed() < DISCONNECT_GRACE + Duration::from_secs(3));
        assert_eq!(sent, publisher.published());
    }

    #[test]
    fn test_count_limit_ends_run() {
        let publisher = MqttPublisher::new(unreachable_broker(), Duration::from_millis(1));
        let mut simulator = SensorSimulator::with_seed(SimulatorConfig::default(), 7);

        // Fewer readings than the request queue holds, so nothing blocks.
        let sent = publisher.run(&mut simulator, Some(3)).unwrap();

        assert_eq!(sent, 3);
        assert_eq!(publisher.published(), 3);
        assert_eq!(publisher.publish_errors(), 0);
    }
}
