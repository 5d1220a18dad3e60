//! Test doubles for the dispatcher's collaborators.
//!
//! Available in unit tests and with the `testing` feature:
//!
//! ```toml
//! [dev-dependencies]
//! geofence-bridge = { version = "0.1", features = ["testing"] }
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;

use crate::error::ResolveError;
use crate::event::NormalizedEvent;
use crate::resolver::LabelResolver;
use crate::sink::PublishSink;

/// Resolver with no strings at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct MissingResolver;

impl LabelResolver for MissingResolver {
    fn resolve(&self, key: &str) -> Result<String, ResolveError> {
        Err(ResolveError::not_found(key))
    }
}

/// Sink that keeps every published event in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<NormalizedEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<NormalizedEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl PublishSink for RecordingSink {
    async fn publish(&self, event: &NormalizedEvent) -> Result<()> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

/// Sink that rejects every event and counts the attempts.
#[derive(Debug, Clone, Default)]
pub struct FailingSink {
    attempts: Arc<AtomicUsize>,
}

impl FailingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PublishSink for FailingSink {
    async fn publish(&self, event: &NormalizedEvent) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        bail!("no listener accepted {}", event.name)
    }
}

/// Sink that sleeps before recording, to exercise the publish bound.
#[derive(Debug, Clone)]
pub struct SlowSink {
    delay: Duration,
    inner: RecordingSink,
}

impl SlowSink {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            inner: RecordingSink::new(),
        }
    }

    /// Events whose publish finished before being cut off.
    pub fn events(&self) -> Vec<NormalizedEvent> {
        self.inner.events()
    }
}

#[async_trait]
impl PublishSink for SlowSink {
    async fn publish(&self, event: &NormalizedEvent) -> Result<()> {
        tokio::time::sleep(self.delay).await;
        self.inner.publish(event).await
    }
}

/// Sink that panics on every publish.
#[derive(Debug, Clone, Copy, Default)]
pub struct PanickingSink;

#[async_trait]
impl PublishSink for PanickingSink {
    async fn publish(&self, event: &NormalizedEvent) -> Result<()> {
        panic!("sink exploded on {}", event.name);
    }
}
