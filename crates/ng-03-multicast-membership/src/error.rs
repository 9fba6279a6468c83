//! Error types for multicast membership

use shared_types::InterfaceId;
use std::net::Ipv4Addr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MulticastError {
    #[error("{interface} is already a member of {group}")]
    AlreadyJoined { interface: InterfaceId, group: Ipv4Addr },

    #[error("{interface} is not a member of {group}")]
    NotFound { interface: InterfaceId, group: Ipv4Addr },

    #[error("No multicast group slot left on {interface} for {group}")]
    OutOfResources { interface: InterfaceId, group: Ipv4Addr },

    #[error("Backend refused to release {group} on {interface}")]
    ReleaseFailed { interface: InterfaceId, group: Ipv4Addr },

    #[error("{0} is not an IPv4 multicast address")]
    InvalidGroup(Ipv4Addr),
}

impl MulticastError {
    /// Whether the caller cannot continue past this error.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::OutOfResources { .. })
    }
}
