//! # Shared Ports
//!
//! Traits that more than one subsystem depends on. Implementations live in
//! the subsystem crates and in `node-runtime`.
//!
//! ## Example Implementation
//!
//! ```rust,ignore
//! use shared_types::{FatalError, FatalErrorSink};
//!
//! struct LogOnly;
//!
//! impl FatalErrorSink for LogOnly {
//!     fn raise(&self, error: FatalError) {
//!         tracing::error!(%error, "fatal");
//!     }
//! }
//! ```

use crate::entities::{InterfaceId, NetworkEvent};
use crate::errors::FatalError;
use async_trait::async_trait;

/// Delivers raw network events to whoever listens for them.
///
/// The network stack and the multicast manager both emit events through
/// this port; the listener registry implements it.
#[async_trait]
pub trait EventNotifier: Send + Sync {
    /// Deliver an event raised on `interface`.
    ///
    /// Returns the number of listeners that accepted it.
    async fn notify(&self, interface: &InterfaceId, event: NetworkEvent) -> usize;
}

/// The single uniform fatal error signal.
///
/// Raising is fire-and-forget; the sink decides how the process ends.
pub trait FatalErrorSink: Send + Sync {
    fn raise(&self, error: FatalError);
}
