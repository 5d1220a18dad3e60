//! In-process broadcast bus for geofence events.
//!
//! # Guarantees
//!
//! - **At-most-once delivery**: Slow receivers may miss events
//! - **In-memory only**: Events are not persisted
//! - **No replay**: Lagged receivers get `RecvError::Lagged`
//!
//! Listeners subscribe to the whole stream and filter by event name with
//! [`EventEnvelope::is`].

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

use crate::event::{EventName, NormalizedEvent};
use crate::sink::PublishSink;

/// Default channel capacity for the event bus.
pub const DEFAULT_CAPACITY: usize = 1024;

/// An event as seen by bus listeners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventEnvelope {
    pub id: Uuid,
    pub published_at: DateTime<Utc>,
    pub event: NormalizedEvent,
}

impl EventEnvelope {
    pub fn new(event: NormalizedEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            published_at: Utc::now(),
            event,
        }
    }

    pub fn name(&self) -> EventName {
        self.event.name
    }

    /// Whether this envelope carries an event with the given name.
    pub fn is(&self, name: EventName) -> bool {
        self.event.name == name
    }
}

/// Broadcast bus that listeners subscribe to.
///
/// Cloning the bus shares the underlying channel.
///
/// # Example
///
/// ```ignore
/// let bus = EventBus::new();
/// let mut receiver = bus.subscribe();
///
/// bus.emit(NormalizedEvent::new(EventName::EnterRegions));
///
/// let envelope = receiver.recv().await?;
/// assert!(envelope.is(EventName::EnterRegions));
/// ```
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EventEnvelope>,
}

impl EventBus {
    /// Create a new event bus with default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a new event bus with the specified capacity.
    ///
    /// The capacity determines how many events can be buffered before
    /// slow receivers start lagging.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Emit an event to all subscribers (fire-and-forget).
    ///
    /// Returns the number of receivers that received the event.
    pub fn emit(&self, event: NormalizedEvent) -> usize {
        self.emit_envelope(EventEnvelope::new(event))
    }

    /// Emit an already constructed envelope.
    pub fn emit_envelope(&self, envelope: EventEnvelope) -> usize {
        self.sender.send(envelope).unwrap_or(0)
    }

    /// Subscribe to events on this bus.
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

#[async_trait]
impl PublishSink for EventBus {
    async fn publish(&self, event: &NormalizedEvent) -> Result<()> {
        let delivered = self.emit(event.clone());
        if delivered == 0 {
            debug!(event = %event.name, "no listeners for geofence event");
        }
        Ok(())
    }
}
