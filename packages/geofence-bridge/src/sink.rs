//! Publish sink seam between the dispatcher and whatever delivers events.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::event::NormalizedEvent;

/// Receives normalized events from the dispatcher.
///
/// Publishing is best-effort. Errors are logged by the dispatcher and never
/// affect the handling of the next notification, so sinks should not retry
/// internally.
///
/// # Example
///
/// ```ignore
/// use geofence_bridge::{NormalizedEvent, PublishSink};
///
/// struct StdoutSink;
///
/// #[async_trait]
/// impl PublishSink for StdoutSink {
///     async fn publish(&self, event: &NormalizedEvent) -> Result<()> {
///         println!("{}", serde_json::to_string(event)?);
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait PublishSink: Send + Sync + 'static {
    async fn publish(&self, event: &NormalizedEvent) -> Result<()>;
}

#[async_trait]
impl<S: PublishSink + ?Sized> PublishSink for Arc<S> {
    async fn publish(&self, event: &NormalizedEvent) -> Result<()> {
        (**self).publish(event).await
    }
}
