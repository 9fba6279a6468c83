//! Membership domain types.

use shared_types::InterfaceId;
use std::fmt;
use std::net::Ipv4Addr;

/// SSDP discovery group, joined by default when multicast is enabled.
pub const SSDP_GROUP: Ipv4Addr = Ipv4Addr::new(239, 255, 255, 250);

/// Membership is tracked per interface and group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MembershipKey {
    pub interface: InterfaceId,
    pub group: Ipv4Addr,
}

impl MembershipKey {
    pub fn new(interface: InterfaceId, group: Ipv4Addr) -> Self {
        Self { interface, group }
    }
}

impl fmt::Display for MembershipKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.group, self.interface)
    }
}

/// Backend resource held while a group is joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipState {
    NotMember,
    Member(GroupHandle),
}

impl MembershipState {
    #[must_use]
    pub fn is_member(&self) -> bool {
        matches!(self, Self::Member(_))
    }
}
