//! # Simulated Network Stack
//!
//! Host-side stand-in for the platform stack. Connect requests are answered
//! from a spawned task, the way a real stack reports from its own context:
//! a link result first, then an address change when association succeeded.

use crate::ports::NetworkStack;
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use shared_types::{ConnectError, ConnectRequest, EventNotifier, InterfaceId, NetworkEvent};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// How the simulated stack answers connect requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulatedOutcome {
    /// Association succeeds and an address is assigned.
    Associate,
    /// The request is accepted but association fails with this status.
    LinkFailure { status_code: i32 },
    /// The request itself is rejected with this code.
    RejectRequest { code: i32 },
}

pub struct SimulatedNetworkStack {
    interface: Option<InterfaceId>,
    outcome: SimulatedOutcome,
    stored_configuration: bool,
    event_delay: Duration,
    notifier: RwLock<Option<Arc<dyn EventNotifier>>>,
    requests: Mutex<Vec<ConnectRequest>>,
    stored_requests: AtomicUsize,
}

impl SimulatedNetworkStack {
    /// Stack with `interface` as its default interface that associates
    /// successfully and holds a stored configuration.
    pub fn new(interface: Option<InterfaceId>) -> Self {
        Self {
            interface,
            outcome: SimulatedOutcome::Associate,
            stored_configuration: true,
            event_delay: Duration::ZERO,
            notifier: RwLock::new(None),
            requests: Mutex::new(Vec::new()),
            stored_requests: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn with_outcome(mut self, outcome: SimulatedOutcome) -> Self {
        self.outcome = outcome;
        self
    }

    #[must_use]
    pub fn with_stored_configuration(mut self, stored: bool) -> Self {
        self.stored_configuration = stored;
        self
    }

    #[must_use]
    pub fn with_event_delay(mut self, delay: Duration) -> Self {
        self.event_delay = delay;
        self
    }

    /// Explicit connect requests received so far.
    pub fn connect_requests(&self) -> Vec<ConnectRequest> {
        self.requests.lock().clone()
    }

    /// Stored-configuration connect requests received so far.
    pub fn stored_connect_requests(&self) -> usize {
        self.stored_requests.load(Ordering::Relaxed)
    }

    /// Report `event` on `interface` as if the stack raised it.
    ///
    /// Returns the number of listeners that accepted it, 0 when no
    /// notifier is attached.
    pub async fn inject(&self, interface: &InterfaceId, event: NetworkEvent) -> usize {
        let notifier = self.notifier.read().clone();
        match notifier {
            Some(notifier) => notifier.notify(interface, event).await,
            None => {
                warn!(interface = %interface, "[stack] No notifier attached, event dropped");
                0
            }
        }
    }

    fn check_interface(&self, interface: &InterfaceId) -> Result<(), ConnectError> {
        if self.interface.as_ref() == Some(interface) {
            Ok(())
        } else {
            Err(ConnectError::InterfaceUnavailable(interface.clone()))
        }
    }

    /// Answer an accepted request from the stack's own task.
    fn report_outcome(&self, interface: &InterfaceId) -> Result<(), ConnectError> {
        let events = match self.outcome {
            SimulatedOutcome::Associate => vec![
                NetworkEvent::link_up(),
                NetworkEvent::AddressChange { added: true },
            ],
            SimulatedOutcome::LinkFailure { status_code } => {
                vec![NetworkEvent::link_failed(status_code)]
            }
            SimulatedOutcome::RejectRequest { code } => {
                return Err(ConnectError::Rejected { code });
            }
        };

        let Some(notifier) = self.notifier.read().clone() else {
            warn!(interface = %interface, "[stack] No notifier attached, connect outcome not reported");
            return Ok(());
        };

        let interface = interface.clone();
        let delay = self.event_delay;
        tokio::spawn(async move {
            for event in events {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                debug!(interface = %interface, ?event, "[stack] Reporting event");
                notifier.notify(&interface, event).await;
            }
        });
        Ok(())
    }
}

#[async_trait]
impl NetworkStack for SimulatedNetworkStack {
    fn attach_notifier(&self, notifier: Arc<dyn EventNotifier>) {
        *self.notifier.write() = Some(notifier);
    }

    fn default_interface(&self) -> Option<InterfaceId> {
        self.interface.clone()
    }

    async fn request_connect(
        &self,
        interface: &InterfaceId,
        request: ConnectRequest,
    ) -> Result<(), ConnectError> {
        self.check_interface(interface)?;
        info!(
            interface = %interface,
            ssid = %request.ssid,
            band = ?request.band,
            "[stack] Connect requested"
        );
        self.requests.lock().push(request);
        self.report_outcome(interface)
    }

    async fn request_connect_stored(&self, interface: &InterfaceId) -> Result<(), ConnectError> {
        self.check_interface(interface)?;
        self.stored_requests.fetch_add(1, Ordering::Relaxed);
        if !self.stored_configuration {
            return Err(ConnectError::NoStoredConfiguration);
        }
        info!(interface = %interface, "[stack] Stored connect requested");
        self.report_outcome(interface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::CredentialRecord;
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    struct ChannelNotifier(mpsc::UnboundedSender<(InterfaceId, NetworkEvent)>);

    #[async_trait]
    impl EventNotifier for ChannelNotifier {
        async fn notify(&self, interface: &InterfaceId, event: NetworkEvent) -> usize {
            let _ = self.0.send((interface.clone(), event));
            1
        }
    }

    fn attached(
        stack: SimulatedNetworkStack,
    ) -> (SimulatedNetworkStack, mpsc::UnboundedReceiver<(InterfaceId, NetworkEvent)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        stack.attach_notifier(Arc::new(ChannelNotifier(tx)));
        (stack, rx)
    }

    #[tokio::test]
    async fn test_associate_reports_link_then_address() {
        let (stack, mut rx) = attached(SimulatedNetworkStack::new(Some("wlan0".into())));
        let wlan = InterfaceId::from("wlan0");

        stack
            .request_connect(&wlan, ConnectRequest::from_record(&CredentialRecord::open("home")))
            .await
            .unwrap();

        let first = timeout(Duration::from_millis(200), rx.recv()).await.expect("timeout").unwrap();
        let second = timeout(Duration::from_millis(200), rx.recv()).await.expect("timeout").unwrap();
        assert_eq!(first.1, NetworkEvent::link_up());
        assert_eq!(second.1, NetworkEvent::AddressChange { added: true });
        assert_eq!(stack.connect_requests().len(), 1);
    }

    #[tokio::test]
    async fn test_link_failure_reports_status_code() {
        let (stack, mut rx) = attached(
            SimulatedNetworkStack::new(Some("wlan0".into()))
                .with_outcome(SimulatedOutcome::LinkFailure { status_code: 16 }),
        );

        stack.request_connect_stored(&"wlan0".into()).await.unwrap();

        let event = timeout(Duration::from_millis(200), rx.recv()).await.expect("timeout").unwrap();
        assert_eq!(event.1, NetworkEvent::link_failed(16));
        assert_eq!(stack.stored_connect_requests(), 1);
    }

    #[tokio::test]
    async fn test_rejections() {
        let stack = SimulatedNetworkStack::new(Some("wlan0".into()))
            .with_outcome(SimulatedOutcome::RejectRequest { code: -5 });
        assert_eq!(
            stack.request_connect_stored(&"wlan0".into()).await,
            Err(ConnectError::Rejected { code: -5 })
        );

        let stack = SimulatedNetworkStack::new(Some("wlan0".into())).with_stored_configuration(false);
        assert_eq!(
            stack.request_connect_stored(&"wlan0".into()).await,
            Err(ConnectError::NoStoredConfiguration)
        );
        assert_eq!(
            stack.request_connect_stored(&"eth0".into()).await,
            Err(ConnectError::InterfaceUnavailable("eth0".into()))
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_stored_requests_counted_across_tasks() {
        let stack = Arc::new(
            SimulatedNetworkStack::new(Some("wlan0".into())).with_stored_configuration(false),
        );

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let stack = stack.clone();
                tokio::spawn(async move { stack.request_connect_stored(&"wlan0".into()).await })
            })
            .collect();
        for handle in handles {
            assert!(handle.await.unwrap().is_err());
        }

        // Requests for another interface are rejected before they are counted
        let _ = stack.request_connect_stored(&"eth0".into()).await;
        assert_eq!(stack.stored_connect_requests(), 8);
    }

    #[tokio::test]
    async fn test_inject_without_notifier() {
        let stack = SimulatedNetworkStack::new(None);
        assert_eq!(stack.default_interface(), None);
        assert_eq!(stack.inject(&"wlan0".into(), NetworkEvent::LinkDisconnected).await, 0);
    }
}
