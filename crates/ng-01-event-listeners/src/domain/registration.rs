//! Listener registrations.

use crate::domain::EventMask;
use crate::ports::EventHandler;
use shared_types::{EventCategory, InterfaceId};
use std::fmt;
use std::sync::Arc;

/// Identifier handed out by the registry for each registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// Associates an event mask and a handler with an interface.
///
/// Created once at startup and kept for the process lifetime.
pub struct ListenerRegistration {
    pub id: ListenerId,
    pub interface: InterfaceId,
    pub mask: EventMask,
    pub handler: Arc<dyn EventHandler>,
}

impl ListenerRegistration {
    /// Whether an event of `category` on `interface` goes to this listener.
    #[must_use]
    pub fn matches(&self, interface: &InterfaceId, category: EventCategory) -> bool {
        self.interface == *interface && self.mask.includes(category)
    }
}

impl fmt::Debug for ListenerRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistration")
            .field("id", &self.id)
            .field("interface", &self.interface)
            .field("mask", &self.mask)
            .finish_non_exhaustive()
    }
}
