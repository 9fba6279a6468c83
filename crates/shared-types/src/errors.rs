//! # Error Types
//!
//! Defines error types used across subsystems.

use crate::entities::InterfaceId;
use std::net::Ipv4Addr;
use thiserror::Error;

/// Errors returned by the network stack for connect requests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    /// The stack rejected the request with a status code.
    #[error("Connect request rejected: status {code}")]
    Rejected { code: i32 },

    /// The interface is not up or not known to the stack.
    #[error("Interface unavailable: {0}")]
    InterfaceUnavailable(InterfaceId),

    /// The stack has no stored configuration to connect with.
    #[error("No stored configuration")]
    NoStoredConfiguration,
}

/// Conditions the process cannot make progress past.
///
/// Raised through a single `FatalErrorSink`; recovery is left to a
/// supervisor outside this process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FatalError {
    /// The stack reported no default interface.
    #[error("No default network interface")]
    MissingInterface,

    /// Connecting with build-time credentials failed.
    #[error("Connecting with static credentials failed: {0}")]
    StaticConnectFailed(ConnectError),

    /// A status update could not be published within the timeout.
    #[error("Status publish failed: {0}")]
    PublishFailed(String),

    /// A listener could not accept an event within the timeout.
    #[error("Event delivery to listener {listener} failed: {reason}")]
    EventDeliveryFailed { listener: u64, reason: String },

    /// The multicast backend ran out of group slots.
    #[error("Out of multicast resources joining {group} on {interface}")]
    MulticastOutOfResources { interface: InterfaceId, group: Ipv4Addr },

    /// The configured workload was never registered.
    #[error("Workload unavailable: {0}")]
    WorkloadUnavailable(String),

    /// A listener could not be registered at startup.
    #[error("Listener registration failed: {0}")]
    ListenerRegistration(String),

    /// The status reducer stopped consuming events.
    #[error("Status reducer stopped: {0}")]
    ReducerStopped(String),
}

impl FatalError {
    /// Short machine-readable label used in logs and metrics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingInterface => "missing_interface",
            Self::StaticConnectFailed(_) => "static_connect_failed",
            Self::PublishFailed(_) => "publish_failed",
            Self::EventDeliveryFailed { .. } => "event_delivery_failed",
            Self::MulticastOutOfResources { .. } => "multicast_out_of_resources",
            Self::WorkloadUnavailable(_) => "workload_unavailable",
            Self::ListenerRegistration(_) => "listener_registration",
            Self::ReducerStopped(_) => "reducer_stopped",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_error_messages() {
        let err = FatalError::StaticConnectFailed(ConnectError::Rejected { code: -5 });
        assert_eq!(
            err.to_string(),
            "Connecting with static credentials failed: Connect request rejected: status -5"
        );
        assert_eq!(err.kind(), "static_connect_failed");
    }

    #[test]
    fn test_multicast_fatal_message() {
        let err = FatalError::MulticastOutOfResources {
            interface: InterfaceId::from("eth0"),
            group: Ipv4Addr::new(239, 255, 255, 250),
        };
        assert!(err.to_string().contains("239.255.255.250"));
        assert!(err.to_string().contains("eth0"));
    }
}
