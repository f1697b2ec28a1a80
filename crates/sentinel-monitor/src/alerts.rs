//! Alert delivery: subscriber registry plus broadcast channel.
//!
//! Detection and delivery are decoupled. The monitor computes anomalies
//! inside a per-user critical section, then hands them to the bus after
//! the section is released; subscribers run off the detection path. A
//! panicking subscriber is caught and logged - it cannot take down the
//! other subscribers or surface in the detection result.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;
use tracing::{trace, warn};

use crate::anomaly::Anomaly;
use sentinel_core::UserId;

/// Default capacity of the broadcast channel.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// A detected anomaly paired with the user it belongs to.
#[derive(Debug, Clone)]
pub struct AlertEvent {
    /// The user whose login triggered the anomaly.
    pub user_id: UserId,
    /// The anomaly itself.
    pub anomaly: Anomaly,
}

/// A registered alert consumer.
///
/// Implementations must be cheap or hand off internally: delivery is
/// at-least-once and fire-and-forget, and slow subscribers delay their
/// peers within a dispatch batch (never the detection path itself).
pub trait AlertSubscriber: Send + Sync {
    /// Handle one anomaly for one user.
    fn on_alert(&self, user_id: &UserId, anomaly: &Anomaly);
}

impl<F> AlertSubscriber for F
where
    F: Fn(&UserId, &Anomaly) + Send + Sync,
{
    fn on_alert(&self, user_id: &UserId, anomaly: &Anomaly) {
        self(user_id, anomaly);
    }
}

/// Fan-out point for detected anomalies.
pub struct AlertBus {
    sender: broadcast::Sender<Arc<AlertEvent>>,
    subscribers: Arc<RwLock<Vec<Arc<dyn AlertSubscriber>>>>,
}

impl AlertBus {
    /// Create a bus with the default channel capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a bus with the given channel capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            subscribers: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Register a subscriber invoked for every future anomaly.
    pub fn register(&self, subscriber: Arc<dyn AlertSubscriber>) {
        if let Ok(mut subscribers) = self.subscribers.write() {
            subscribers.push(subscriber);
        }
    }

    /// Register a closure subscriber.
    pub fn on_alert<F>(&self, callback: F)
    where
        F: Fn(&UserId, &Anomaly) + Send + Sync + 'static,
    {
        self.register(Arc::new(callback));
    }

    /// Subscribe to the async alert stream.
    #[must_use]
    pub fn subscribe(&self) -> AlertReceiver {
        AlertReceiver {
            receiver: self.sender.subscribe(),
        }
    }

    /// Number of registered subscribers (sync registry only).
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().map_or(0, |s| s.len())
    }

    /// Deliver anomalies for one user to every consumer.
    ///
    /// When a tokio runtime is present the registry walk happens on a
    /// spawned task, keeping delivery off the caller's path; without a
    /// runtime it runs inline. Broadcast receivers are always fed
    /// directly - sending on a broadcast channel does not block.
    pub fn publish(&self, user_id: &UserId, anomalies: &[Anomaly]) {
        if anomalies.is_empty() {
            return;
        }

        for anomaly in anomalies {
            let event = Arc::new(AlertEvent {
                user_id: user_id.clone(),
                anomaly: anomaly.clone(),
            });
            // No receivers is fine.
            let _ = self.sender.send(Arc::clone(&event));
            trace!(user = %user_id, kind = %anomaly.kind, "alert published");
        }

        let subscribers = Arc::clone(&self.subscribers);
        let user = user_id.clone();
        let batch: Vec<Anomaly> = anomalies.to_vec();

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    notify_registry(&subscribers, &user, &batch);
                });
            },
            Err(_) => notify_registry(&subscribers, &user, &batch),
        }
    }
}

/// Walk the registry, isolating each subscriber call.
fn notify_registry(
    subscribers: &RwLock<Vec<Arc<dyn AlertSubscriber>>>,
    user_id: &UserId,
    anomalies: &[Anomaly],
) {
    let snapshot: Vec<Arc<dyn AlertSubscriber>> = match subscribers.read() {
        Ok(subscribers) => subscribers.clone(),
        Err(_) => return,
    };

    for anomaly in anomalies {
        for subscriber in &snapshot {
            let result = catch_unwind(AssertUnwindSafe(|| {
                subscriber.on_alert(user_id, anomaly);
            }));
            if result.is_err() {
                warn!(user = %user_id, kind = %anomaly.kind, "alert subscriber panicked");
            }
        }
    }
}

impl Default for AlertBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AlertBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertBus")
            .field("subscribers", &self.subscriber_count())
            .finish_non_exhaustive()
    }
}

/// Receiver for the async alert stream.
pub struct AlertReceiver {
    receiver: broadcast::Receiver<Arc<AlertEvent>>,
}

impl AlertReceiver {
    /// Receive the next alert.
    ///
    /// Returns `None` when the bus is gone. Lagged receivers skip the
    /// dropped alerts and keep receiving.
    pub async fn recv(&mut self) -> Option<Arc<AlertEvent>> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    warn!(skipped = count, "alert receiver lagged, alerts dropped");
                },
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Receive without blocking; `None` if nothing is pending.
    pub fn try_recv(&mut self) -> Option<Arc<AlertEvent>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(count)) => {
                    warn!(skipped = count, "alert receiver lagged, alerts dropped");
                },
                Err(
                    broadcast::error::TryRecvError::Empty | broadcast::error::TryRecvError::Closed,
                ) => return None,
            }
        }
    }
}
