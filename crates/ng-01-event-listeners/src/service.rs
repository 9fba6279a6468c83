//! Event Listener Registry Service
//!
//! Holds every registration and fans each raw event out to the matching
//! handlers. Implements the shared `EventNotifier` port, which is how the
//! network stack and the multicast manager deliver events.

use crate::domain::{EventMask, ListenerId, ListenerRegistration};
use crate::error::RegistryError;
use crate::metrics::{RegistryMetrics, RegistryMetricsSnapshot};
use crate::ports::EventHandler;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{EventNotifier, FatalError, FatalErrorSink, InterfaceId, NetworkEvent};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, trace};

/// Registry of event listeners.
pub struct EventListenerRegistry {
    /// All registrations, in registration order.
    listeners: RwLock<Vec<Arc<ListenerRegistration>>>,
    /// Next listener id.
    next_id: AtomicU64,
    /// Where handler failures are raised.
    fatal: Arc<dyn FatalErrorSink>,
    /// Dispatch counters.
    metrics: RegistryMetrics,
}

impl EventListenerRegistry {
    /// Create an empty registry raising delivery failures on `fatal`.
    pub fn new(fatal: Arc<dyn FatalErrorSink>) -> Self {
        Self {
            listeners: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
            fatal,
            metrics: RegistryMetrics::new(),
        }
    }

    /// Attach `handler` to events in `mask` raised on `interface`.
    ///
    /// Registrations may overlap. There is no unregister.
    pub fn register(
        &self,
        interface: InterfaceId,
        mask: EventMask,
        handler: Arc<dyn EventHandler>,
    ) -> Result<ListenerId, RegistryError> {
        if mask.is_empty() {
            return Err(RegistryError::EmptyMask);
        }

        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        info!(
            listener = %id,
            interface = %interface,
            mask = ?mask,
            "[ng-01] Listener registered"
        );

        self.listeners.write().push(Arc::new(ListenerRegistration {
            id,
            interface,
            mask,
            handler,
        }));
        Ok(id)
    }

    /// Deliver `event` to every listener registered for it.
    ///
    /// Runs on the caller's execution context. A failing handler is raised
    /// as fatal and skipped; the remaining listeners still get the event.
    ///
    /// # Returns
    ///
    /// The number of handlers that accepted the event.
    pub async fn dispatch(&self, interface: &InterfaceId, event: NetworkEvent) -> usize {
        let category = event.category();

        // Snapshot so no lock is held while handlers run.
        let targets: Vec<Arc<ListenerRegistration>> = self
            .listeners
            .read()
            .iter()
            .filter(|listener| listener.matches(interface, category))
            .cloned()
            .collect();

        if targets.is_empty() {
            trace!(
                interface = %interface,
                category = category.as_str(),
                "[ng-01] Event matched no listener"
            );
        }

        let mut delivered = 0;
        let mut failed = 0;
        for listener in targets {
            match listener.handler.handle(interface, &event).await {
                Ok(()) => delivered += 1,
                Err(e) => {
                    failed += 1;
                    error!(
                        listener = %listener.id,
                        interface = %interface,
                        error = %e,
                        "[ng-01] Event delivery failed"
                    );
                    self.fatal.raise(FatalError::EventDeliveryFailed {
                        listener: listener.id.0,
                        reason: e.to_string(),
                    });
                }
            }
        }

        self.metrics.record_dispatch(category, delivered, failed);
        debug!(
            interface = %interface,
            category = category.as_str(),
            delivered,
            "[ng-01] Event dispatched"
        );
        delivered
    }

    /// Number of registrations.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }

    /// Registrations covering `interface`.
    #[must_use]
    pub fn listeners_for(&self, interface: &InterfaceId) -> Vec<ListenerId> {
        self.listeners
            .read()
            .iter()
            .filter(|listener| listener.interface == *interface)
            .map(|listener| listener.id)
            .collect()
    }

    /// Dispatch counters.
    #[must_use]
    pub fn metrics(&self) -> RegistryMetricsSnapshot {
        self.metrics.snapshot()
    }
}

#[async_trait]
impl EventNotifier for EventListenerRegistry {
    async fn notify(&self, interface: &InterfaceId, event: NetworkEvent) -> usize {
        self.dispatch(interface, event).await
    }
}
