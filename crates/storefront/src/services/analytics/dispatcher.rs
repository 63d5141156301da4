//! Bounded, non-blocking event queue with a single delivery worker.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::{AnalyticsEvent, TrackingClient};

/// What happened to a dispatched event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Queued for delivery.
    Queued,
    /// Dropped because the queue was full.
    QueueFull,
    /// Dropped because the worker has stopped.
    Closed,
    /// Dropped because tracking is not configured.
    Disabled,
}

/// Sender half of the tracking queue, cheap to clone into handlers.
#[derive(Debug, Clone)]
pub struct AnalyticsDispatcher {
    sender: Option<mpsc::Sender<AnalyticsEvent>>,
    dropped: Arc<AtomicU64>,
}

impl AnalyticsDispatcher {
    /// A dispatcher that drops every event.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            sender: None,
            dropped: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Start the delivery worker and return the dispatcher feeding it.
    ///
    /// The worker exits once every dispatcher clone is dropped and the
    /// queue has drained.
    #[must_use]
    pub fn spawn(client: TrackingClient, capacity: usize) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let worker = tokio::spawn(run_worker(client, receiver));

        (
            Self {
                sender: Some(sender),
                dropped: Arc::new(AtomicU64::new(0)),
            },
            worker,
        )
    }

    /// Queue an event without waiting.
    pub fn dispatch(&self, event: AnalyticsEvent) -> DispatchOutcome {
        let Some(sender) = &self.sender else {
            debug!(event = ?event.event, "Tracking disabled, dropping event");
            return DispatchOutcome::Disabled;
        };

        match sender.try_send(event) {
            Ok(()) => DispatchOutcome::Queued,
            Err(mpsc::error::TrySendError::Full(event)) => {
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                if dropped == 1 || dropped.is_power_of_two() {
                    warn!(
                        event = ?event.event,
                        dropped,
                        "Tracking queue full, dropping event"
                    );
                }
                DispatchOutcome::QueueFull
            }
            Err(mpsc::error::TrySendError::Closed(event)) => {
                warn!(event = ?event.event, "Tracking worker stopped, dropping event");
                DispatchOutcome::Closed
            }
        }
    }

    /// Whether events are delivered anywhere.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.sender.is_some()
    }

    /// Events dropped because the queue was full.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

async fn run_worker(client: TrackingClient, mut receiver: mpsc::Receiver<AnalyticsEvent>) {
    while let Some(event) = receiver.recv().await {
        match client.send(&event).await {
            Ok(()) => debug!(
                event = ?event.event,
                event_id = %event.event_id,
                "Tracking event delivered"
            ),
            Err(e) => warn!(
                event = ?event.event,
                event_id = %event.event_id,
                error = %e,
                "Tracking event failed, dropping"
            ),
        }
    }
    debug!("Tracking worker stopped");
}
