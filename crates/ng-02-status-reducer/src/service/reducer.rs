//! Status Reducer Service
//!
//! Sole writer of connectivity status. Consumes the events the listener
//! registry forwards, reduces each one and publishes the result.

use super::ConnectivityContext;
use crate::domain::reduce;
use crate::error::ReducerError;
use crate::metrics::{ReducerMetrics, ReducerMetricsSnapshot};
use shared_bus::StatusPublisher;
use shared_types::{ConnectivityStatus, InterfaceEvent, NetworkEvent};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Applies reductions and publishes the outcome.
pub struct StatusReducer {
    context: ConnectivityContext,
    metrics: ReducerMetrics,
}

impl StatusReducer {
    pub fn new(context: ConnectivityContext) -> Self {
        Self {
            context,
            metrics: ReducerMetrics::new(),
        }
    }

    /// Reduce one event, signal the gate if asked, publish any status.
    ///
    /// # Returns
    ///
    /// The status published, if any.
    ///
    /// # Errors
    ///
    /// `ReducerError::Publish` when a subscriber did not take the update
    /// within the bus publish timeout.
    pub async fn apply(
        &self,
        item: &InterfaceEvent,
    ) -> Result<Option<ConnectivityStatus>, ReducerError> {
        self.metrics.record_event();
        let interface = &item.interface;

        match &item.event {
            NetworkEvent::LinkResult {
                success: false,
                status_code,
            } => {
                self.metrics.record_link_failure();
                warn!(
                    interface = %interface,
                    status_code,
                    "[ng-02] Link connect failed"
                );
            }
            NetworkEvent::LinkResult { success: true, .. } => {
                info!(interface = %interface, "[ng-02] Link up, waiting for IP address");
            }
            _ => {}
        }

        let reduction = reduce(&item.event);

        if reduction.signal_gate && self.context.gate.signal() {
            self.metrics.record_gate_opened();
            netgate_telemetry::record_gate_signal();
            info!(interface = %interface, "[ng-02] IPv4 address acquired, bootstrap gate opened");
        }

        let Some(status) = reduction.status else {
            return Ok(None);
        };

        let cause = item.event.category();
        match self.context.bus.publish(status, cause).await {
            Ok(receivers) => {
                self.metrics.record_published(status);
                debug!(
                    interface = %interface,
                    status = %status,
                    cause = cause.as_str(),
                    receivers,
                    "[ng-02] Connectivity status published"
                );
                Ok(Some(status))
            }
            Err(e) => {
                self.metrics.record_publish_failure();
                error!(interface = %interface, status = %status, error = %e, "[ng-02] Publish failed");
                Err(e.into())
            }
        }
    }

    /// Reducer task loop.
    ///
    /// Runs until the event channel closes or a publish fails; the first
    /// failure ends the loop and is returned.
    pub async fn run(&self, mut events: mpsc::Receiver<InterfaceEvent>) -> Result<(), ReducerError> {
        info!("[ng-02] Status reducer started");
        while let Some(item) = events.recv().await {
            self.apply(&item).await?;
        }
        info!("[ng-02] Event channel closed, status reducer stopped");
        Ok(())
    }

    #[must_use]
    pub fn context(&self) -> &ConnectivityContext {
        &self.context
    }

    #[must_use]
    pub fn metrics(&self) -> ReducerMetricsSnapshot {
        self.metrics.snapshot()
    }
}
