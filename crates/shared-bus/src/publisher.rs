//! # Status Publisher
//!
//! Defines the publishing side of the connectivity bus.

use crate::events::{StatusFilter, StatusUpdate};
use crate::subscriber::{StatusStream, StatusSubscription};
use crate::{DEFAULT_PUBLISH_TIMEOUT, DEFAULT_SUBSCRIBER_CAPACITY};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use shared_types::{ConnectivityStatus, EventCategory};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::SendTimeoutError;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Errors from publish operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PublishError {
    /// A subscriber did not accept the update within the publish timeout.
    #[error("Subscriber {subscriber} did not accept update #{sequence} within {timeout:?}")]
    Timeout {
        subscriber: u64,
        sequence: u64,
        timeout: Duration,
    },
}

/// Trait for publishing connectivity status to the bus.
///
/// The status reducer is the only writer; everything else reads.
#[async_trait]
pub trait StatusPublisher: Send + Sync {
    /// Publish a status caused by an event of category `cause`.
    ///
    /// # Returns
    ///
    /// The number of subscribers that received the update.
    async fn publish(
        &self,
        status: ConnectivityStatus,
        cause: EventCategory,
    ) -> Result<usize, PublishError>;

    /// The most recently published status, if any.
    fn latest(&self) -> Option<ConnectivityStatus>;

    /// Get the total number of updates published.
    fn updates_published(&self) -> u64;
}

struct SubscriberSlot {
    id: u64,
    sender: mpsc::Sender<StatusUpdate>,
}

/// In-memory implementation of the connectivity bus.
///
/// Each subscriber gets its own bounded `tokio::sync::mpsc` channel so that
/// a slow subscriber applies back-pressure to the publisher instead of
/// losing transitions.
pub struct ConnectivityBus {
    /// Attached subscribers.
    subscribers: Mutex<Vec<SubscriberSlot>>,

    /// Latest published status.
    latest: RwLock<Option<ConnectivityStatus>>,

    /// Next subscriber id.
    next_subscriber: AtomicU64,

    /// Total updates published; doubles as the sequence counter.
    updates_published: AtomicU64,

    /// Per-subscriber channel capacity.
    capacity: usize,

    /// How long a publish waits for each subscriber.
    publish_timeout: Duration,
}

impl ConnectivityBus {
    /// Create a new bus with default capacity and publish timeout.
    #[must_use]
    pub fn new() -> Self {
        Self::with_settings(DEFAULT_SUBSCRIBER_CAPACITY, DEFAULT_PUBLISH_TIMEOUT)
    }

    /// Create a new bus with the given per-subscriber capacity and timeout.
    ///
    /// A capacity of zero is raised to one.
    #[must_use]
    pub fn with_settings(capacity: usize, publish_timeout: Duration) -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
            latest: RwLock::new(None),
            next_subscriber: AtomicU64::new(1),
            updates_published: AtomicU64::new(0),
            capacity: capacity.max(1),
            publish_timeout,
        }
    }

    /// Subscribe to all updates.
    #[must_use]
    pub fn subscribe(&self) -> StatusSubscription {
        self.subscribe_filtered(StatusFilter::all())
    }

    /// Subscribe to updates matching a filter.
    ///
    /// Filtering happens on receive, so a filtered subscriber still has to
    /// keep draining its channel.
    #[must_use]
    pub fn subscribe_filtered(&self, filter: StatusFilter) -> StatusSubscription {
        let (sender, receiver) = mpsc::channel(self.capacity);
        let id = self.next_subscriber.fetch_add(1, Ordering::Relaxed);

        self.subscribers.lock().push(SubscriberSlot { id, sender });

        debug!(subscriber = id, causes = ?filter.causes, "New subscription created");

        StatusSubscription::new(id, receiver, filter)
    }

    /// Get a stream of updates matching a filter.
    #[must_use]
    pub fn status_stream(&self, filter: StatusFilter) -> StatusStream {
        StatusStream::new(self.subscribe_filtered(filter))
    }

    /// Get the number of attached subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .iter()
            .filter(|slot| !slot.sender.is_closed())
            .count()
    }

    /// Get the per-subscriber capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get the publish timeout.
    #[must_use]
    pub fn publish_timeout(&self) -> Duration {
        self.publish_timeout
    }

    fn prune(&self, closed: &[u64]) {
        if closed.is_empty() {
            return;
        }
        self.subscribers
            .lock()
            .retain(|slot| !closed.contains(&slot.id));
        debug!(pruned = closed.len(), "Dropped subscriptions pruned");
    }
}

impl Default for ConnectivityBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StatusPublisher for ConnectivityBus {
    async fn publish(
        &self,
        status: ConnectivityStatus,
        cause: EventCategory,
    ) -> Result<usize, PublishError> {
        let sequence = self.updates_published.fetch_add(1, Ordering::Relaxed) + 1;
        *self.latest.write() = Some(status);

        let update = StatusUpdate {
            sequence,
            status,
            cause,
        };

        // Senders are cloned out so no lock is held across an await.
        let targets: Vec<(u64, mpsc::Sender<StatusUpdate>)> = self
            .subscribers
            .lock()
            .iter()
            .map(|slot| (slot.id, slot.sender.clone()))
            .collect();

        let mut delivered = 0;
        let mut closed = Vec::new();
        let mut failure = None;

        // One deadline for the whole fan-out, not one per subscriber.
        let deadline = Instant::now() + self.publish_timeout;
        for (id, sender) in targets {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match sender.send_timeout(update, remaining).await {
                Ok(()) => delivered += 1,
                Err(SendTimeoutError::Closed(_)) => closed.push(id),
                Err(SendTimeoutError::Timeout(_)) => {
                    warn!(
                        subscriber = id,
                        sequence,
                        status = %status,
                        "Subscriber did not accept update in time"
                    );
                    failure.get_or_insert(PublishError::Timeout {
                        subscriber: id,
                        sequence,
                        timeout: self.publish_timeout,
                    });
                }
            }
        }

        self.prune(&closed);

        if let Some(err) = failure {
            return Err(err);
        }

        debug!(
            sequence,
            status = %status,
            cause = cause.as_str(),
            receivers = delivered,
            "Status published"
        );
        Ok(delivered)
    }

    fn latest(&self) -> Option<ConnectivityStatus> {
        *self.latest.read()
    }

    fn updates_published(&self) -> u64 {
        self.updates_published.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_no_subscribers() {
        let bus = ConnectivityBus::new();

        let receivers = bus
            .publish(ConnectivityStatus::Connected, EventCategory::Address)
            .await
            .unwrap();
        assert_eq!(receivers, 0);
        assert_eq!(bus.updates_published(), 1);
        assert_eq!(bus.latest(), Some(ConnectivityStatus::Connected));
    }

    #[tokio::test]
    async fn test_publish_with_subscriber() {
        let bus = ConnectivityBus::new();

        // Create subscriber BEFORE publishing
        let _sub = bus.subscribe();

        let receivers = bus
            .publish(ConnectivityStatus::Disconnected, EventCategory::Address)
            .await
            .unwrap();

        assert_eq!(receivers, 1);
        assert_eq!(bus.subscriber_count(), 1);
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let bus = ConnectivityBus::new();

        let _sub1 = bus.subscribe();
        let _sub2 = bus.subscribe();
        let _sub3 = bus.subscribe_filtered(StatusFilter::causes(vec![EventCategory::Link]));

        let receivers = bus
            .publish(ConnectivityStatus::Connected, EventCategory::Address)
            .await
            .unwrap();

        // Filtering happens on receive, all three channels get the update
        assert_eq!(receivers, 3);
        assert_eq!(bus.subscriber_count(), 3);
    }

    #[tokio::test]
    async fn test_full_subscriber_times_out() {
        let bus = ConnectivityBus::with_settings(1, Duration::from_millis(20));
        let _stalled = bus.subscribe();

        bus.publish(ConnectivityStatus::Connected, EventCategory::Address)
            .await
            .unwrap();

        let err = bus
            .publish(ConnectivityStatus::Disconnected, EventCategory::Address)
            .await
            .unwrap_err();
        assert!(matches!(err, PublishError::Timeout { sequence: 2, .. }));

        // The status is still recorded as latest
        assert_eq!(bus.latest(), Some(ConnectivityStatus::Disconnected));
    }

    #[tokio::test]
    async fn test_stalled_subscribers_share_one_timeout() {
        let publish_timeout = Duration::from_millis(100);
        let bus = ConnectivityBus::with_settings(1, publish_timeout);
        let _stalled: Vec<_> = (0..4).map(|_| bus.subscribe()).collect();

        bus.publish(ConnectivityStatus::Connected, EventCategory::Address)
            .await
            .unwrap();

        let started = std::time::Instant::now();
        let result = bus
            .publish(ConnectivityStatus::Disconnected, EventCategory::Address)
            .await;
        let elapsed = started.elapsed();

        assert!(matches!(result, Err(PublishError::Timeout { sequence: 2, .. })));
        assert!(
            elapsed < publish_timeout * 2,
            "publish took {elapsed:?} with a {publish_timeout:?} timeout"
        );
    }

    #[tokio::test]
    async fn test_ready_subscriber_served_after_stalled_one() {
        let bus = ConnectivityBus::with_settings(1, Duration::from_millis(50));
        let _stalled = bus.subscribe();
        bus.publish(ConnectivityStatus::Connected, EventCategory::Address)
            .await
            .unwrap();

        // Subscribed after the first publish, so its channel is empty
        let mut ready = bus.subscribe();
        let result = bus
            .publish(ConnectivityStatus::Disconnected, EventCategory::Link)
            .await;
        assert!(result.is_err());

        let update = ready.try_recv().unwrap().expect("update");
        assert_eq!(update.status, ConnectivityStatus::Disconnected);
    }

    #[tokio::test]
    async fn test_dropped_subscriber_is_pruned() {
        let bus = ConnectivityBus::with_settings(1, Duration::from_millis(20));
        {
            let _sub = bus.subscribe();
        }

        let receivers = bus
            .publish(ConnectivityStatus::Connected, EventCategory::Link)
            .await
            .unwrap();
        assert_eq!(receivers, 0);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_default_bus() {
        let bus = ConnectivityBus::default();
        assert_eq!(bus.capacity(), DEFAULT_SUBSCRIBER_CAPACITY);
        assert_eq!(bus.publish_timeout(), DEFAULT_PUBLISH_TIMEOUT);
        assert_eq!(bus.subscriber_count(), 0);
        assert_eq!(bus.updates_published(), 0);
        assert_eq!(bus.latest(), None);
    }

    #[test]
    fn test_zero_capacity_is_raised() {
        let bus = ConnectivityBus::with_settings(0, DEFAULT_PUBLISH_TIMEOUT);
        assert_eq!(bus.capacity(), 1);
    }
}
