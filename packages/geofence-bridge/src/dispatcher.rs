//! Dispatcher: classify one notification, log what happened, publish.
//!
//! Every failure stops at this boundary. Provider errors become `"error"`
//! events, lookup failures become warnings, and publish failures (rejection,
//! timeout or panic) are logged and swallowed so the next notification is
//! handled normally.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tracing::{debug, error, info, warn};

use crate::classifier::{Classification, Diagnostic, Severity, TransitionClassifier};
use crate::error::PublishError;
use crate::event::{NormalizedEvent, ATTR_REGIONS};
use crate::notification::TransitionNotification;
use crate::sink::PublishSink;

/// Default upper bound on a single publish call.
pub const DEFAULT_PUBLISH_TIMEOUT: Duration = Duration::from_secs(5);

/// What became of one notification.
#[derive(Debug)]
pub enum DispatchOutcome {
    Published(NormalizedEvent),
    /// The notification did not map to an event.
    Discarded,
    /// An event was built but the sink did not take it.
    Failed(PublishError),
}

impl DispatchOutcome {
    pub fn event(&self) -> Option<&NormalizedEvent> {
        match self {
            DispatchOutcome::Published(event) => Some(event),
            _ => None,
        }
    }

    pub fn is_published(&self) -> bool {
        matches!(self, DispatchOutcome::Published(_))
    }
}

#[derive(Clone)]
pub struct Dispatcher {
    classifier: TransitionClassifier,
    sink: Arc<dyn PublishSink>,
    publish_timeout: Duration,
}

impl Dispatcher {
    pub fn new(classifier: TransitionClassifier, sink: Arc<dyn PublishSink>) -> Self {
        Self {
            classifier,
            sink,
            publish_timeout: DEFAULT_PUBLISH_TIMEOUT,
        }
    }

    pub fn with_publish_timeout(mut self, timeout: Duration) -> Self {
        self.publish_timeout = timeout;
        self
    }

    pub fn classifier(&self) -> &TransitionClassifier {
        &self.classifier
    }

    /// Handle one notification to completion.
    ///
    /// Never fails: the outcome is informational.
    pub async fn handle_notification(
        &self,
        notification: TransitionNotification,
    ) -> DispatchOutcome {
        let classification = self.classifier.classify(&notification);
        log_classification(&notification, &classification);

        let Some(event) = classification.event else {
            return DispatchOutcome::Discarded;
        };

        match self.publish(&event).await {
            Ok(()) => {
                debug!(event = %event.name, "published geofence event");
                DispatchOutcome::Published(event)
            }
            Err(err) => {
                error!(event = %err.event(), error = %err, "Error triggering geofence event");
                DispatchOutcome::Failed(err)
            }
        }
    }

    async fn publish(&self, event: &NormalizedEvent) -> Result<(), PublishError> {
        let attempt = AssertUnwindSafe(self.sink.publish(event)).catch_unwind();

        match tokio::time::timeout(self.publish_timeout, attempt).await {
            Ok(Ok(Ok(()))) => Ok(()),
            Ok(Ok(Err(source))) => Err(PublishError::Rejected {
                event: event.name,
                source,
            }),
            Ok(Err(_panic)) => Err(PublishError::Panicked { event: event.name }),
            Err(_elapsed) => Err(PublishError::TimedOut {
                event: event.name,
                timeout: self.publish_timeout,
            }),
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("classifier", &self.classifier)
            .field("publish_timeout", &self.publish_timeout)
            .finish_non_exhaustive()
    }
}

fn log_classification(notification: &TransitionNotification, classification: &Classification) {
    for failure in &classification.lookup_failures {
        warn!(key = %failure.key(), "Failed to resolve geofence string, using fallback");
    }

    for Diagnostic { level, message } in &classification.diagnostics {
        match level {
            Severity::Error => error!("{message}"),
            Severity::Warn => warn!("{message}"),
        }
    }

    if let (Some(label), Some(event)) = (&classification.transition_label, &classification.event)
    {
        info!(
            transition = %label,
            event = %event.name,
            regions = notification.regions().map_or(0, <[_]>::len),
            payload = event.attribute(ATTR_REGIONS).unwrap_or_default(),
            "geofence transition"
        );
    }
}
