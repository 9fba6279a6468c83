//! Shared connectivity context.

use crate::domain::Gate;
use shared_bus::ConnectivityBus;
use std::sync::Arc;

/// Bus and gate shared by the reducer and the bootstrap sequencer.
///
/// Created once by the runtime and handed to both by clone.
#[derive(Clone)]
pub struct ConnectivityContext {
    pub bus: Arc<ConnectivityBus>,
    pub gate: Arc<Gate>,
}

impl ConnectivityContext {
    pub fn new(bus: Arc<ConnectivityBus>) -> Self {
        Self {
            bus,
            gate: Arc::new(Gate::new()),
        }
    }
}

impl Default for ConnectivityContext {
    fn default() -> Self {
        Self::new(Arc::new(ConnectivityBus::new()))
    }
}
