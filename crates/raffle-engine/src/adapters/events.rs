//! Event publisher adapters

use crate::events::RaffleEvent;
use crate::ports::EventPublisher;
use async_trait::async_trait;
use std::sync::Mutex;
use tracing::info;

/// Publishes events as structured JSON log lines
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingEventPublisher;

impl TracingEventPublisher {
    /// Create a new tracing publisher
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EventPublisher for TracingEventPublisher {
    async fn publish(&self, event: RaffleEvent) {
        match serde_json::to_string(&event) {
            Ok(json) => info!("RAFFLE_EVENT_JSON {}", json),
            Err(e) => info!("RAFFLE_EVENT (unserializable: {}) {:?}", e, event),
        }
    }
}

/// Buffers published events for inspection in tests
#[derive(Debug, Default)]
pub struct BufferingEventPublisher {
    buffer: Mutex<Vec<RaffleEvent>>,
}

impl BufferingEventPublisher {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain and return all buffered events in publish order
    pub fn take(&self) -> Vec<RaffleEvent> {
        std::mem::take(&mut self.buffer.lock().unwrap())
    }
}

#[async_trait]
impl EventPublisher for BufferingEventPublisher {
    async fn publish(&self, event: RaffleEvent) {
        self.buffer.lock().unwrap().push(event);
    }
}
