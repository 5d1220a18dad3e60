//! Dedicated worker that handles notifications one at a time.
//!
//! The worker owns the dispatcher and drains a bounded inbox in arrival
//! order. A notification is handled to completion before the next one is
//! taken, so handling is strictly sequential and never re-entered.
//!
//! ```text
//! notification source ──submit()──► inbox ──► TransitionWorker::run()
//!                                                  │
//!                                                  ▼
//!                                   Dispatcher::handle_notification()
//!                                                  │
//!                                                  ▼
//!                                             PublishSink
//! ```

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::dispatcher::{DispatchOutcome, Dispatcher};
use crate::error::WorkerError;
use crate::notification::TransitionNotification;

/// Default inbox capacity.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Counters reported when the worker stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub handled: usize,
    pub published: usize,
    pub discarded: usize,
    pub failed: usize,
}

impl WorkerStats {
    fn record(&mut self, outcome: &DispatchOutcome) {
        self.handled += 1;
        match outcome {
            DispatchOutcome::Published(_) => self.published += 1,
            DispatchOutcome::Discarded => self.discarded += 1,
            DispatchOutcome::Failed(_) => self.failed += 1,
        }
    }
}

pub struct TransitionWorker {
    dispatcher: Dispatcher,
    inbox: mpsc::Receiver<TransitionNotification>,
}

impl TransitionWorker {
    /// Spawn the worker on the current tokio runtime.
    pub fn spawn(dispatcher: Dispatcher, capacity: usize) -> WorkerHandle {
        let (sender, inbox) = mpsc::channel(capacity.max(1));
        let worker = Self { dispatcher, inbox };
        let task = tokio::spawn(worker.run());

        WorkerHandle { sender, task }
    }

    /// Process notifications until every sender is dropped.
    async fn run(mut self) -> WorkerStats {
        info!("Creating geofence transition worker");
        let mut stats = WorkerStats::default();

        while let Some(notification) = self.inbox.recv().await {
            let outcome = self.dispatcher.handle_notification(notification).await;
            stats.record(&outcome);
            debug!(handled = stats.handled, "notification handled");
        }

        info!(
            handled = stats.handled,
            published = stats.published,
            discarded = stats.discarded,
            failed = stats.failed,
            "Destroying geofence transition worker"
        );
        stats
    }
}

/// Handle for feeding and stopping a running worker.
pub struct WorkerHandle {
    sender: mpsc::Sender<TransitionNotification>,
    task: JoinHandle<WorkerStats>,
}

impl WorkerHandle {
    /// Queue a notification, waiting for inbox space.
    pub async fn submit(&self, notification: TransitionNotification) -> Result<(), WorkerError> {
        self.sender
            .send(notification)
            .await
            .map_err(|_| WorkerError::Closed)
    }

    /// Queue a notification without waiting.
    pub fn try_submit(&self, notification: TransitionNotification) -> Result<(), WorkerError> {
        self.sender.try_send(notification).map_err(|err| match err {
            mpsc::error::TrySendError::Full(_) => WorkerError::Full,
            mpsc::error::TrySendError::Closed(_) => WorkerError::Closed,
        })
    }

    /// Another sender into the same inbox.
    ///
    /// The worker only stops once every sender, including these, is dropped.
    pub fn sender(&self) -> mpsc::Sender<TransitionNotification> {
        self.sender.clone()
    }

    /// Close the inbox, let the worker drain what is queued, and wait for it.
    pub async fn shutdown(self) -> Result<WorkerStats, WorkerError> {
        drop(self.sender);
        self.task.await.map_err(|_| WorkerError::Join)
    }
}

impl std::fmt::Debug for WorkerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerHandle")
            .field("closed", &self.sender.is_closed())
            .field("capacity", &self.sender.capacity())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::classifier::TransitionClassifier;
    use crate::event::EventName;
    use crate::notification::TransitionKind;
    use crate::resolver::StringTable;
    use crate::sink::PublishSink;
    use crate::testing::{FailingSink, RecordingSink};

    fn dispatcher(sink: Arc<dyn PublishSink>) -> Dispatcher {
        Dispatcher::new(
            TransitionClassifier::new(Arc::new(StringTable::english())),
            sink,
        )
    }

    #[tokio::test]
    async fn test_worker_handles_in_arrival_order() {
        let sink = RecordingSink::new();
        let handle = TransitionWorker::spawn(dispatcher(Arc::new(sink.clone())), 8);

        handle
            .submit(TransitionNotification::enter(["a"]))
            .await
            .unwrap();
        handle
            .submit(TransitionNotification::error(1000))
            .await
            .unwrap();
        handle
            .submit(TransitionNotification::exit(["a"]))
            .await
            .unwrap();

        let stats = handle.shutdown().await.unwrap();
        assert_eq!(stats.handled, 3);
        assert_eq!(stats.published, 3);

        let names: Vec<_> = sink.events().iter().map(|e| e.name).collect();
        assert_eq!(
            names,
            vec![
                EventName::EnterRegions,
                EventName::Error,
                EventName::ExitRegions
            ]
        );
    }

    #[tokio::test]
    async fn test_failing_sink_does_not_stop_worker() {
        let sink = FailingSink::new();
        let handle = TransitionWorker::spawn(dispatcher(Arc::new(sink.clone())), 8);

        for _ in 0..3 {
            handle
                .submit(TransitionNotification::enter(["a"]))
                .await
                .unwrap();
        }
        handle
            .submit(TransitionNotification::transition(
                TransitionKind::Other(4),
                ["a"],
            ))
            .await
            .unwrap();

        let stats = handle.shutdown().await.unwrap();
        assert_eq!(
            stats,
            WorkerStats {
                handled: 4,
                published: 0,
                discarded: 1,
                failed: 3,
            }
        );
        assert_eq!(sink.attempts(), 3);
    }

    #[tokio::test]
    async fn test_try_submit_reports_full_inbox() {
        let (sender, _inbox) = mpsc::channel::<TransitionNotification>(1);
        let handle = WorkerHandle {
            sender,
            task: tokio::spawn(async { WorkerStats::default() }),
        };

        handle
            .try_submit(TransitionNotification::error(1))
            .unwrap();
        assert_eq!(
            handle.try_submit(TransitionNotification::error(2)),
            Err(WorkerError::Full)
        );
    }

    #[tokio::test]
    async fn test_submit_after_worker_gone_is_closed() {
        let (sender, inbox) = mpsc::channel::<TransitionNotification>(1);
        drop(inbox);
        let handle = WorkerHandle {
            sender,
            task: tokio::spawn(async { WorkerStats::default() }),
        };

        assert_eq!(
            handle.submit(TransitionNotification::error(1)).await,
            Err(WorkerError::Closed)
        );
        assert_eq!(
            handle.try_submit(TransitionNotification::error(1)),
            Err(WorkerError::Closed)
        );
    }

    #[tokio::test]
    async fn test_extra_sender_feeds_same_worker() {
        let sink = RecordingSink::new();
        let handle = TransitionWorker::spawn(dispatcher(Arc::new(sink.clone())), 8);

        let sender = handle.sender();
        sender
            .send(TransitionNotification::exit(["side"]))
            .await
            .unwrap();
        drop(sender);

        let stats = handle.shutdown().await.unwrap();
        assert_eq!(stats.published, 1);
        assert_eq!(sink.events()[0].name, EventName::ExitRegions);
    }

    #[tokio::test]
    async fn test_shutdown_drains_queued_notifications() {
        let sink = RecordingSink::new();
        let handle = TransitionWorker::spawn(dispatcher(Arc::new(sink.clone())), 16);

        for i in 0..10 {
            handle
                .try_submit(TransitionNotification::enter([format!("r{i}")]))
                .unwrap();
        }

        let stats = handle.shutdown().await.unwrap();
        assert_eq!(stats.handled, 10);
        assert_eq!(sink.len(), 10);
    }
}
