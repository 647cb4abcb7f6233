//! Replays recorded sensor payloads from a JSON-lines file.
//!
//! Each non-empty line is delivered as one payload, exactly as it would have
//! arrived from the broker. Useful for reproducing incidents offline.

use crate::error::SourceError;
use crate::sources::stream_source::{PayloadHandler, ReadingSource};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone)]
pub struct ReplayConfig {
    pub input_file: PathBuf,
    /// Payloads per second (0 = unlimited)
    pub rate_of_replay: u64,
    /// Start over at the end of the file until stopped
    pub loop_file: bool,
}

pub struct ReplaySource {
    config: ReplayConfig,
    should_stop: AtomicBool,
}

impl ReplaySource {
    pub fn new(config: ReplayConfig) -> Self {
        Self {
            config,
            should_stop: AtomicBool::new(false),
        }
    }

    fn replay_once(
        &self,
        on_payload: &PayloadHandler,
        delay: Option<Duration>,
    ) -> Result<u64, SourceError> {
        let reader = BufReader::new(File::open(&self.config.input_file)?);
        let mut delivered = 0u64;

        for line in reader.lines() {
            if self.should_stop.load(Ordering::Relaxed) {
                break;
            }

            let line = line?;
            let payload = line.trim();
            if payload.is_empty() {
                continue;
            }

            on_payload(payload.as_bytes());
            delivered += 1;

            if let Some(delay) = delay {
                std::thread::sleep(delay);
            }
        }

        Ok(delivered)
    }
}

impl ReadingSource for ReplaySource {
    fn run(&self, on_payload: PayloadHandler) -> Result<(), SourceError> {
        self.should_stop.store(false, Ordering::Relaxed);

        let delay = (self.config.rate_of_replay > 0)
            .then(|| Duration::from_secs_f64(1.0 / self.config.rate_of_replay as f64));

        info!(
            input = %self.config.input_file.display(),
            rate = self.config.rate_of_replay,
            "Replaying payloads"
        );

        loop {
            let delivered = self.replay_once(&on_payload, delay)?;
            info!(delivered, "Replay pass finished");

            // Nothing delivered: stop rather than loop on an empty file.
            if !self.config.loop_file
                || delivered == 0
                || self.should_stop.load(Ordering::Relaxed)
            {
                break;
            }
        }

        Ok(())
    }

    fn stop(&self) {
        self.should_stop.store(true, Ordering::Relaxed);
    }
}
