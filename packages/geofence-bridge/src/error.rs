//! Structured error types for the bridge.
//!
//! Nothing here is fatal to the process. The dispatcher converts every
//! failure into a log line at the boundary of a single notification:
//!
//! - [`ResolveError`]: a label or message key is missing from the string table
//! - [`PublishError`]: the sink rejected, stalled on, or panicked during a publish
//! - [`WorkerError`]: the worker task is gone and can no longer accept work
//!
//! Sinks report failures as `anyhow::Error`; no `anyhow::Error` crosses the
//! dispatch boundary, it is wrapped in [`PublishError::Rejected`] first.

use std::time::Duration;

use thiserror::Error;

use crate::event::EventName;

/// A string resource could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("string resource not found: {key}")]
    NotFound { key: String },
}

impl ResolveError {
    pub fn not_found(key: impl Into<String>) -> Self {
        ResolveError::NotFound { key: key.into() }
    }

    pub fn key(&self) -> &str {
        match self {
            ResolveError::NotFound { key } => key,
        }
    }
}

/// A publish attempt did not complete.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("sink rejected {event} event: {source}")]
    Rejected {
        event: EventName,
        #[source]
        source: anyhow::Error,
    },

    #[error("sink did not accept {event} event within {timeout:?}")]
    TimedOut { event: EventName, timeout: Duration },

    #[error("sink panicked while publishing {event} event")]
    Panicked { event: EventName },
}

impl PublishError {
    pub fn event(&self) -> EventName {
        match self {
            PublishError::Rejected { event, .. }
            | PublishError::TimedOut { event, .. }
            | PublishError::Panicked { event } => *event,
        }
    }
}

/// The worker can no longer take notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WorkerError {
    #[error("transition worker has shut down")]
    Closed,

    #[error("transition worker inbox is full")]
    Full,

    #[error("transition worker task failed to join")]
    Join,
}
