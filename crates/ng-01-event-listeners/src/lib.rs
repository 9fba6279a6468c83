//! # NG-01 Event Listeners
//!
//! Registry that attaches handlers to categories of raw network events on a
//! given interface and delivers each matching event to them.
//!
//! ## Architecture
//!
//! This crate follows Hexagonal Architecture (Ports & Adapters):
//!
//! - **Domain Layer** (`domain/`): `EventMask`, `ListenerId`, `ListenerRegistration`
//! - **Ports Layer** (`ports/`): `EventHandler` (driven by the registry)
//! - **Service Layer** (`service`): `EventListenerRegistry`, which also
//!   implements the shared `EventNotifier` port the network stack calls
//! - **Adapters Layer** (`adapters/`): `ChannelForwarder`, which moves
//!   events off the stack's execution context onto a bounded channel
//!
//! ## Delivery Rules
//!
//! - A handler sees an event when the interface matches and the event's
//!   category is in the registration mask.
//! - Order across listeners for the same event is unspecified.
//! - A handler failure is fatal and raised through the `FatalErrorSink`;
//!   remaining listeners still receive the event.
//! - There is no unregister; registrations live for the process lifetime.
//!
//! ## Wiring
//!
//! ```ignore
//! use ng_01_event_listeners::{ChannelForwarder, EventListenerRegistry, EventMask};
//! use std::sync::Arc;
//!
//! let registry = Arc::new(EventListenerRegistry::new(fatal_sink));
//! let (tx, rx) = tokio::sync::mpsc::channel(32);
//! registry.register(
//!     "wlan0".into(),
//!     EventMask::LINK | EventMask::ADDRESS,
//!     Arc::new(ChannelForwarder::new(tx)),
//! )?;
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;

// Re-exports for convenience
pub use adapters::{ChannelForwarder, DEFAULT_EVENT_CHANNEL_CAPACITY, DEFAULT_FORWARD_TIMEOUT};
pub use domain::{EventMask, ListenerId, ListenerRegistration};
pub use error::{DeliveryError, RegistryError};
pub use metrics::{RegistryMetrics, RegistryMetricsSnapshot};
pub use ports::EventHandler;
pub use service::EventListenerRegistry;
