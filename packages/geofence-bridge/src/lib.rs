//! # Geofence Bridge
//!
//! Republishes geofence transition notifications from a location provider
//! as named events on an in-process event bus.
//!
//! ## Event Mapping
//!
//! | Notification                 | Event            | Attributes                        |
//! |------------------------------|------------------|-----------------------------------|
//! | `Error { code }`             | `error`          | `error`, `errorcode`, `[regions]` |
//! | `Transition { Enter, .. }`   | `enterregions`   | `regions`                         |
//! | `Transition { Exit, .. }`    | `exitregions`    | `regions`                         |
//! | `Transition { Other(_), .. }`| (none, logged)   |                                   |
//!
//! ## Architecture
//!
//! ```text
//! Notification source
//!     │
//!     ▼ submit()
//! TransitionWorker (one notification at a time)
//!     │
//!     ▼
//! Dispatcher::handle_notification()
//!     ├─► TransitionClassifier::classify() ──► LabelResolver
//!     │
//!     ▼ publish() (bounded, failures logged)
//! PublishSink (EventBus) ──► listeners
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use geofence_bridge::{Config, EventBus, TransitionNotification, TransitionWorker};
//!
//! let config = Config::from_env()?;
//! let bus = EventBus::with_capacity(config.bus_capacity);
//! let mut listener = bus.subscribe();
//!
//! let dispatcher = config.dispatcher(Arc::new(config.string_table()?), Arc::new(bus.clone()));
//! let worker = TransitionWorker::spawn(dispatcher, config.queue_capacity);
//!
//! worker.submit(TransitionNotification::enter(["home"])).await?;
//! let envelope = listener.recv().await?;
//! assert_eq!(envelope.event.attribute("regions"), Some(r#"[{"identifier":"home"}]"#));
//! ```

pub mod bus;
pub mod classifier;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod notification;
pub mod resolver;
pub mod sink;
pub mod source;
pub mod worker;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use bus::{EventBus, EventEnvelope};
pub use classifier::{Classification, Diagnostic, Severity, TransitionClassifier};
pub use config::Config;
pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use error::{PublishError, ResolveError, WorkerError};
pub use event::{EventName, NormalizedEvent, RegionsEncoding};
pub use notification::{RegionId, TransitionKind, TransitionNotification};
pub use resolver::{LabelResolver, StringTable};
pub use sink::PublishSink;
pub use source::{pump_json_lines, SourceStats};
pub use worker::{TransitionWorker, WorkerHandle, WorkerStats};
