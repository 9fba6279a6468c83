//! In-memory multicast backend with a fixed number of group slots per
//! interface.

use crate::domain::GroupHandle;
use crate::error::MulticastError;
use crate::ports::MulticastBackend;
use parking_lot::Mutex;
use shared_types::InterfaceId;
use std::collections::{HashMap, HashSet};
use std::net::Ipv4Addr;
use tracing::trace;

/// Group slots per interface unless configured otherwise.
pub const DEFAULT_GROUP_SLOTS: usize = 4;

#[derive(Default)]
struct BackendState {
    next_handle: u64,
    attached: HashMap<InterfaceId, HashSet<GroupHandle>>,
    monitored: HashSet<InterfaceId>,
}

pub struct InMemoryMulticastBackend {
    slots_per_interface: usize,
    state: Mutex<BackendState>,
}

impl InMemoryMulticastBackend {
    pub fn new() -> Self {
        Self::with_slots(DEFAULT_GROUP_SLOTS)
    }

    pub fn with_slots(slots_per_interface: usize) -> Self {
        Self {
            slots_per_interface,
            state: Mutex::new(BackendState::default()),
        }
    }

    /// Slots in use on `interface`.
    pub fn attached(&self, interface: &InterfaceId) -> usize {
        self.state
            .lock()
            .attached
            .get(interface)
            .map_or(0, HashSet::len)
    }

    pub fn is_monitored(&self, interface: &InterfaceId) -> bool {
        self.state.lock().monitored.contains(interface)
    }
}

impl Default for InMemoryMulticastBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MulticastBackend for InMemoryMulticastBackend {
    fn attach(&self, interface: &InterfaceId, group: Ipv4Addr) -> Result<GroupHandle, MulticastError> {
        let mut state = self.state.lock();
        state.next_handle += 1;
        let handle = GroupHandle(state.next_handle);

        let slots = state.attached.entry(interface.clone()).or_default();
        if slots.len() >= self.slots_per_interface {
            return Err(MulticastError::OutOfResources {
                interface: interface.clone(),
                group,
            });
        }
        slots.insert(handle);
        trace!(interface = %interface, %group, handle = handle.0, "Group slot attached");
        Ok(handle)
    }

    fn release(&self, interface: &InterfaceId, group: Ipv4Addr, handle: GroupHandle) -> Result<(), MulticastError> {
        let mut state = self.state.lock();
        let removed = state
            .attached
            .get_mut(interface)
            .is_some_and(|slots| slots.remove(&handle));
        if !removed {
            return Err(MulticastError::ReleaseFailed {
                interface: interface.clone(),
                group,
            });
        }
        Ok(())
    }

    fn set_monitor(&self, interface: &InterfaceId, enabled: bool) {
        let mut state = self.state.lock();
        if enabled {
            state.monitored.insert(interface.clone());
        } else {
            state.monitored.remove(interface);
        }
    }
}
