//! Listener that feeds raw event counts into the Prometheus registry.

use async_trait::async_trait;
use netgate_telemetry::record_event;
use ng_01_event_listeners::{DeliveryError, EventHandler};
use shared_types::{InterfaceId, NetworkEvent};

#[derive(Debug, Default, Clone, Copy)]
pub struct MetricsRecorder;

#[async_trait]
impl EventHandler for MetricsRecorder {
    async fn handle(&self, _interface: &InterfaceId, event: &NetworkEvent) -> Result<(), DeliveryError> {
        record_event(event.category());
        Ok(())
    }
}
