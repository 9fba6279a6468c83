//! # Core Domain Entities
//!
//! Defines the connectivity entities shared by every subsystem.
//!
//! ## Clusters
//!
//! - **Interfaces**: `InterfaceId`
//! - **Raw events**: `NetworkEvent`, `EventCategory`, `InterfaceEvent`
//! - **Reduced signal**: `ConnectivityStatus`

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;

// =============================================================================
// CLUSTER A: INTERFACES
// =============================================================================

/// Identifier of a network interface (e.g. `wlan0`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InterfaceId(String);

impl InterfaceId {
    /// Create an interface identifier from its name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The interface name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InterfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InterfaceId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

// =============================================================================
// CLUSTER B: RAW NETWORK EVENTS
// =============================================================================

/// Category of a raw network event.
///
/// Listener registrations select categories through an `EventMask`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    /// Link-layer association results.
    Link,
    /// IPv4 address assignment and loss.
    Address,
    /// Multicast group membership changes.
    Multicast,
}

impl EventCategory {
    /// All categories, in registration order.
    pub const ALL: [EventCategory; 3] = [Self::Link, Self::Address, Self::Multicast];

    /// Short label used in logs and metrics.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Link => "link",
            Self::Address => "address",
            Self::Multicast => "multicast",
        }
    }
}

/// A raw event produced by the network stack.
///
/// Consumed exactly once by the status reducer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetworkEvent {
    /// Result of a link-layer connect attempt.
    LinkResult {
        /// Whether the association succeeded.
        success: bool,
        /// Stack status code; 0 on success.
        status_code: i32,
    },

    /// The link was disconnected.
    LinkDisconnected,

    /// An IPv4 address was added to or removed from the interface.
    AddressChange {
        /// `true` when an address was acquired.
        added: bool,
    },

    /// A multicast group was joined or left.
    MulticastChange {
        /// `true` on join.
        joined: bool,
        /// The group the change refers to.
        group: Ipv4Addr,
    },
}

impl NetworkEvent {
    /// Successful link association.
    #[must_use]
    pub fn link_up() -> Self {
        Self::LinkResult {
            success: true,
            status_code: 0,
        }
    }

    /// Failed link association with the stack's status code.
    #[must_use]
    pub fn link_failed(status_code: i32) -> Self {
        Self::LinkResult {
            success: false,
            status_code,
        }
    }

    /// The category this event is delivered under.
    #[must_use]
    pub fn category(&self) -> EventCategory {
        match self {
            Self::LinkResult { .. } | Self::LinkDisconnected => EventCategory::Link,
            Self::AddressChange { .. } => EventCategory::Address,
            Self::MulticastChange { .. } => EventCategory::Multicast,
        }
    }
}

/// A network event together with the interface it happened on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceEvent {
    /// The interface the event was raised on.
    pub interface: InterfaceId,
    /// The raw event.
    pub event: NetworkEvent,
}

impl InterfaceEvent {
    pub fn new(interface: InterfaceId, event: NetworkEvent) -> Self {
        Self { interface, event }
    }
}

// =============================================================================
// CLUSTER C: REDUCED SIGNAL
// =============================================================================

/// The simplified connectivity signal derived from raw events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectivityStatus {
    Connected,
    Disconnected,
}

impl ConnectivityStatus {
    #[must_use]
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
        }
    }
}

impl fmt::Display for ConnectivityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
