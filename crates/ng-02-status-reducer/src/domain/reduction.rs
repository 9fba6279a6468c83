//! The pure event-to-status reduction.

use shared_types::{ConnectivityStatus, NetworkEvent};

/// Outcome of reducing one raw event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Reduction {
    /// Status to publish, if the event changes connectivity.
    pub status: Option<ConnectivityStatus>,
    /// Whether the bootstrap gate should be signalled.
    pub signal_gate: bool,
}

impl Reduction {
    const NONE: Self = Self {
        status: None,
        signal_gate: false,
    };

    const fn emit(status: ConnectivityStatus) -> Self {
        Self {
            status: Some(status),
            signal_gate: false,
        }
    }
}

/// Map a raw event to the status it implies.
///
/// Link results never publish on their own; connectivity is only claimed
/// once an address arrives.
#[must_use]
pub fn reduce(event: &NetworkEvent) -> Reduction {
    match event {
        NetworkEvent::LinkResult { .. } => Reduction::NONE,
        NetworkEvent::LinkDisconnected => Reduction::emit(ConnectivityStatus::Disconnected),
        NetworkEvent::AddressChange { added: true } => Reduction {
            status: Some(ConnectivityStatus::Connected),
            signal_gate: true,
        },
        NetworkEvent::AddressChange { added: false } => {
            Reduction::emit(ConnectivityStatus::Disconnected)
        }
        NetworkEvent::MulticastChange { joined, .. } => Reduction::emit(if *joined {
            ConnectivityStatus::Connected
        } else {
            ConnectivityStatus::Disconnected
        }),
    }
}
