//! # Status Subscriber
//!
//! Defines the subscription side of the connectivity bus.

use crate::events::{StatusFilter, StatusUpdate};
use std::pin::Pin;
use std::task::{Context, Poll};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tokio_stream::Stream;
use tracing::debug;

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The bus was dropped.
    #[error("Connectivity bus closed")]
    Closed,
}

/// A subscription handle for receiving status updates.
///
/// Dropping the handle detaches it; the bus prunes it on the next publish.
pub struct StatusSubscription {
    /// Subscriber id assigned by the bus.
    id: u64,

    /// This subscriber's channel.
    receiver: mpsc::Receiver<StatusUpdate>,

    /// Filter for this subscription.
    filter: StatusFilter,
}

impl StatusSubscription {
    pub(crate) fn new(id: u64, receiver: mpsc::Receiver<StatusUpdate>, filter: StatusFilter) -> Self {
        Self {
            id,
            receiver,
            filter,
        }
    }

    /// Receive the next update that matches the filter.
    ///
    /// # Returns
    ///
    /// - `Some(update)` - The next matching update
    /// - `None` - The bus was dropped
    pub async fn recv(&mut self) -> Option<StatusUpdate> {
        loop {
            let update = self.receiver.recv().await?;
            if self.filter.matches(&update) {
                return Some(update);
            }
        }
    }

    /// Try to receive the next update without blocking.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(update))` - An update was available and matched
    /// - `Ok(None)` - No update available (would block)
    /// - `Err(SubscriptionError::Closed)` - The bus was dropped
    pub fn try_recv(&mut self) -> Result<Option<StatusUpdate>, SubscriptionError> {
        loop {
            let update = match self.receiver.try_recv() {
                Ok(u) => u,
                Err(TryRecvError::Empty) => return Ok(None),
                Err(TryRecvError::Disconnected) => return Err(SubscriptionError::Closed),
            };

            if self.filter.matches(&update) {
                return Ok(Some(update));
            }
        }
    }

    /// Subscriber id assigned by the bus.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Get the filter for this subscription.
    #[must_use]
    pub fn filter(&self) -> &StatusFilter {
        &self.filter
    }

    /// Convert into a `Stream`.
    #[must_use]
    pub fn into_stream(self) -> StatusStream {
        StatusStream::new(self)
    }
}

impl Drop for StatusSubscription {
    fn drop(&mut self) {
        debug!(subscriber = self.id, "Subscription dropped");
    }
}

/// A stream wrapper for subscriptions.
///
/// Implements `tokio_stream::Stream` for use with stream combinators.
pub struct StatusStream {
    subscription: StatusSubscription,
}

impl StatusStream {
    /// Create a new status stream from a subscription.
    #[must_use]
    pub fn new(subscription: StatusSubscription) -> Self {
        Self { subscription }
    }

    /// Get the filter for this stream.
    #[must_use]
    pub fn status_filter(&self) -> &StatusFilter {
        self.subscription.filter()
    }
}

impl Stream for StatusStream {
    type Item = StatusUpdate;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let subscription = &mut self.subscription;
        loop {
            match subscription.receiver.poll_recv(cx) {
                Poll::Ready(Some(update)) => {
                    if subscription.filter.matches(&update) {
                        return Poll::Ready(Some(update));
                    }
                }
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
