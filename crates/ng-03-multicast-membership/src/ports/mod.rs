//! Ports for multicast membership.

use crate::domain::GroupHandle;
use crate::error::MulticastError;
use shared_types::InterfaceId;
use std::net::Ipv4Addr;

/// Stack-side group resources and the multicast monitor.
///
/// Called with the manager's lock held; implementations must not block.
pub trait MulticastBackend: Send + Sync {
    /// Reserve a group slot on `interface`.
    ///
    /// # Errors
    ///
    /// `OutOfResources` when no slot is left.
    fn attach(&self, interface: &InterfaceId, group: Ipv4Addr) -> Result<GroupHandle, MulticastError>;

    /// Give a slot back.
    ///
    /// # Errors
    ///
    /// `ReleaseFailed` when the backend does not know the handle.
    fn release(&self, interface: &InterfaceId, group: Ipv4Addr, handle: GroupHandle) -> Result<(), MulticastError>;

    /// Turn membership reporting for `interface` on or off.
    fn set_monitor(&self, interface: &InterfaceId, enabled: bool);
}
