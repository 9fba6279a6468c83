//! Ports Layer
//!
//! Defines the handler interface the registry drives. Event sources reach
//! the registry through the shared `EventNotifier` port.

use crate::error::DeliveryError;
use async_trait::async_trait;
use shared_types::{InterfaceId, NetworkEvent};

/// A callback invoked once per matching event (Driven Port).
///
/// Runs on whatever execution context delivered the event, which is not
/// assumed to be the task that registered it.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Handle one event raised on `interface`.
    async fn handle(&self, interface: &InterfaceId, event: &NetworkEvent)
        -> Result<(), DeliveryError>;
}
