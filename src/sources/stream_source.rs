use crate::error::SourceError;
use std::sync::Arc;

/// Callback invoked with each raw payload, in arrival order.
pub type PayloadHandler = Arc<dyn Fn(&[u8]) + Send + Sync>;

pub trait ReadingSource: Send + Sync {
    // Deliver payloads to `on_payload` until stopped or exhausted. Blocks the caller.
    fn run(&self, on_payload: PayloadHandler) -> Result<(), SourceError>;

    // Ask a running source to return from `run`.
    fn stop(&self);
}
