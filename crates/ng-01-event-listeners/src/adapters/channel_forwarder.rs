//! Forwards matched events onto a bounded channel.
//!
//! The network stack calls handlers on its own execution context. This
//! adapter hands each event to the status reducer's queue and returns,
//! failing when the queue stays full past the forward timeout.

use crate::error::DeliveryError;
use crate::ports::EventHandler;
use async_trait::async_trait;
use shared_types::{InterfaceEvent, InterfaceId, NetworkEvent};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::SendTimeoutError;
use tracing::trace;

/// Default bound of the event queue feeding the status reducer.
pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 32;

/// Default time a handler waits for room in the queue.
pub const DEFAULT_FORWARD_TIMEOUT: Duration = Duration::from_secs(1);

/// `EventHandler` that enqueues every event it receives.
#[derive(Debug, Clone)]
pub struct ChannelForwarder {
    sender: mpsc::Sender<InterfaceEvent>,
    timeout: Duration,
}

impl ChannelForwarder {
    pub fn new(sender: mpsc::Sender<InterfaceEvent>) -> Self {
        Self::with_timeout(sender, DEFAULT_FORWARD_TIMEOUT)
    }

    pub fn with_timeout(sender: mpsc::Sender<InterfaceEvent>, timeout: Duration) -> Self {
        Self { sender, timeout }
    }
}

#[async_trait]
impl EventHandler for ChannelForwarder {
    async fn handle(&self, interface: &InterfaceId, event: &NetworkEvent) -> Result<(), DeliveryError> {
        let item = InterfaceEvent::new(interface.clone(), event.clone());
        match self.sender.send_timeout(item, self.timeout).await {
            Ok(()) => {
                trace!(interface = %interface, "[ng-01] Event forwarded");
                Ok(())
            }
            Err(SendTimeoutError::Timeout(_)) => Err(DeliveryError::Timeout(self.timeout)),
            Err(SendTimeoutError::Closed(_)) => Err(DeliveryError::Closed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_forwards_event() {
        let (tx, mut rx) = mpsc::channel(DEFAULT_EVENT_CHANNEL_CAPACITY);
        let forwarder = ChannelForwarder::new(tx);

        forwarder
            .handle(&"wlan0".into(), &NetworkEvent::AddressChange { added: true })
            .await
            .unwrap();

        let received = rx.recv().await.expect("event");
        assert_eq!(received.interface.as_str(), "wlan0");
        assert_eq!(received.event, NetworkEvent::AddressChange { added: true });
    }

    #[tokio::test]
    async fn test_full_queue_times_out() {
        let (tx, _rx) = mpsc::channel(1);
        let forwarder = ChannelForwarder::with_timeout(tx, Duration::from_millis(20));
        let wlan = InterfaceId::from("wlan0");

        forwarder.handle(&wlan, &NetworkEvent::link_up()).await.unwrap();
        let err = forwarder
            .handle(&wlan, &NetworkEvent::link_up())
            .await
            .unwrap_err();
        assert_eq!(err, DeliveryError::Timeout(Duration::from_millis(20)));
    }

    #[tokio::test]
    async fn test_closed_queue() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let forwarder = ChannelForwarder::new(tx);

        let err = forwarder
            .handle(&"wlan0".into(), &NetworkEvent::LinkDisconnected)
            .await
            .unwrap_err();
        assert_eq!(err, DeliveryError::Closed);
    }
}
